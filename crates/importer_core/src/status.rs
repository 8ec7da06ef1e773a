use std::fmt;

/// Opaque server-side job identifier (a task id for the background queue).
pub type JobId = String;

/// Which job a poll session observes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobRef {
    /// Status endpoint keyed by job id.
    Id(JobId),
    /// Server tracks the single active job through the client's cookie session.
    Session,
}

impl fmt::Display for JobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobRef::Id(id) => write!(f, "{id}"),
            JobRef::Session => write!(f, "<session>"),
        }
    }
}

/// Decoded status of a background job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Pending,
    Progress {
        current: u64,
        total: u64,
        message: Option<String>,
    },
    /// Transport-level success. The payload may still carry a domain error.
    Success(JobResult),
    Failure {
        detail: String,
    },
}

impl JobStatus {
    /// Short label for logs.
    pub fn tag(&self) -> &'static str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Progress { .. } => "PROGRESS",
            JobStatus::Success(_) => "SUCCESS",
            JobStatus::Failure { .. } => "FAILURE",
        }
    }
}

/// Result payload carried by a `SUCCESS` status.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobResult {
    pub header_row: Vec<String>,
    /// Optional per-column type annotation, aligned with `header_row`.
    pub column_types: Vec<Option<String>>,
    /// Sample of the imported rows. The server only ever sends a prefix.
    pub data_rows: Vec<Vec<CellValue>>,
    pub warnings: Vec<String>,
    pub error: Option<String>,
    pub error_message: Option<String>,
}

impl JobResult {
    /// True when the job failed despite the transport reporting success.
    pub fn has_domain_error(&self) -> bool {
        self.error.is_some()
    }
}

/// A single cell of the preview table, kept in the type the server sent.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(text) => f.write_str(text),
            CellValue::Integer(value) => write!(f, "{value}"),
            CellValue::Float(value) => write!(f, "{value}"),
            CellValue::Bool(value) => write!(f, "{value}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

/// What the poll loop should do after a status has been rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDirective {
    Continue,
    Stop,
}

/// Progress percentage: `round(100 * current / total)` clamped to `[0, 100]`.
///
/// Rounds half up in integer arithmetic. `total == 0` yields 0.
pub fn progress_percent(current: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let current = u128::from(current);
    let total = u128::from(total);
    let rounded = (200 * current + total) / (2 * total);
    rounded.min(100) as u8
}
