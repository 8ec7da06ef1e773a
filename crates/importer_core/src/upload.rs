use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::JobId;

/// A file upload as submitted from the upload form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    pub file_path: PathBuf,
    /// Additional text fields (delimiter, database and table name, ...).
    pub fields: Vec<(String, String)>,
    /// Anti-forgery token, sent both as a form field and as a header.
    pub csrf_token: Option<String>,
}

/// What the upload endpoint handed back on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Background job started; poll it by id.
    Job(JobId),
    /// Server redirected to its results page and tracks the job in the session.
    Redirect(String),
    /// Server wants the columns categorized before importing.
    Headers(Vec<String>),
}

/// Validation errors returned by the upload form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormErrors {
    /// Errors not tied to a particular field.
    pub non_field: Vec<String>,
    pub fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.non_field.is_empty() && self.fields.values().all(Vec::is_empty)
    }

    /// One line per field, messages joined with `, `.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.non_field.is_empty() {
            lines.push(self.non_field.join(", "));
        }
        for (field, messages) in &self.fields {
            if !messages.is_empty() {
                lines.push(format!("{field}: {}", messages.join(", ")));
            }
        }
        lines
    }
}
