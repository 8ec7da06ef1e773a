//! Importer engine: HTTP client, status decoding, job poller and effect execution.
mod client;
mod decode;
mod engine;
mod fetch;
mod poller;
mod report;
mod schedule;
mod types;
mod upload;

pub use client::{FetchSettings, ImportClient};
pub use decode::{decode_form_errors, decode_status, decode_upload_response, DecodeError};
pub use engine::{EngineConfig, EngineHandle};
pub use fetch::{resolve_status_url, StatusFetcher};
pub use poller::{JobPoller, PollConfig, PollOutcome, PollSession, StatusHandler};
pub use report::{build_report_document, PersistError, ReportWriter};
pub use schedule::{Scheduler, TokioScheduler};
pub use types::{EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput};
pub use upload::UploadError;
