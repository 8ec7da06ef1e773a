use crate::JobResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub name: String,
    pub type_annotation: Option<String>,
}

impl HeaderCell {
    /// Header text with the column type alongside, e.g. `age (INTEGER)`.
    pub fn label(&self) -> String {
        match &self.type_annotation {
            Some(kind) => format!("{} ({})", self.name, kind),
            None => self.name.clone(),
        }
    }
}

/// Preview table built from a successful job result.
///
/// Holds exactly the rows the server returned; the server already limits the
/// sample, so nothing is sliced here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultTable {
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<Vec<String>>,
}

impl ResultTable {
    pub fn from_result(result: &JobResult) -> Self {
        let headers = result
            .header_row
            .iter()
            .enumerate()
            .map(|(idx, name)| HeaderCell {
                name: name.clone(),
                type_annotation: result
                    .column_types
                    .get(idx)
                    .cloned()
                    .flatten()
                    .filter(|kind| !kind.trim().is_empty()),
            })
            .collect();
        let rows = result
            .data_rows
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect();
        Self { headers, rows }
    }

    pub fn partial_sample_note(&self) -> String {
        match self.rows.len() {
            0 => "No rows were returned. The import may still contain data.".to_string(),
            1 => "Showing 1 sample row. The full dataset may contain more.".to_string(),
            n => format!("Showing {n} sample rows. The full dataset may contain more."),
        }
    }
}
