use std::fmt;

use crate::ResultTable;

/// Visible job state label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateLabel {
    #[default]
    Pending,
    Progress,
    Success,
    SuccessWithWarnings,
    Failure,
}

impl StateLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            StateLabel::Pending => "PENDING",
            StateLabel::Progress => "PROGRESS",
            StateLabel::Success => "SUCCESS",
            StateLabel::SuccessWithWarnings => "SUCCESS WITH WARNINGS",
            StateLabel::Failure => "FAILURE",
        }
    }

    pub fn is_failure(self) -> bool {
        self == StateLabel::Failure
    }
}

/// Alert panel shown above the details area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePanel {
    Success,
    /// The job finished but reported an application-level error.
    DomainError { message: String },
    /// The client gave up: transport, decode or timeout.
    ClientError { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Details {
    #[default]
    Empty,
    Table(ResultTable),
    /// Opaque failure detail exactly as the server sent it.
    RawDetail(String),
}

/// Failures detected on the client side rather than reported by the job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Transport(String),
    Decode(String),
    TimedOut { attempts: u32 },
    /// The client cannot even build a status request, e.g. the endpoint
    /// template wants a job id the session does not have.
    Config(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Transport(message) => {
                write!(f, "Could not reach the status endpoint: {message}")
            }
            FailureReason::Decode(message) => {
                write!(f, "The server sent an unrecognized status: {message}")
            }
            FailureReason::TimedOut { attempts } => write!(
                f,
                "Gave up waiting for the import after {attempts} status checks"
            ),
            FailureReason::Config(message) => {
                write!(f, "The status endpoint is misconfigured: {message}")
            }
        }
    }
}

/// The single UI surface. Only the renderer mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub state_label: StateLabel,
    pub progress_percent: u8,
    /// Animated progress bar; switched off on any terminal state.
    pub progress_active: bool,
    pub progress_message: Option<String>,
    pub panel: Option<MessagePanel>,
    pub details: Details,
    pub warnings: Vec<String>,
    pub continue_enabled: bool,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            state_label: StateLabel::Pending,
            progress_percent: 0,
            progress_active: true,
            progress_message: None,
            panel: None,
            details: Details::Empty,
            warnings: Vec::new(),
            continue_enabled: false,
        }
    }
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> Option<&ResultTable> {
        match &self.details {
            Details::Table(table) => Some(table),
            _ => None,
        }
    }
}
