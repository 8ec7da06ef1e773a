//! Importer core: job status model, status renderer and the pure app state machine.
mod effect;
mod html;
mod msg;
mod page;
mod render;
mod state;
mod status;
mod table;
mod update;
mod upload;

pub use effect::Effect;
pub use html::{escape_html, render_html, DetailPolicy, RenderOptions};
pub use msg::{Msg, PollEnd};
pub use page::{Details, FailureReason, MessagePanel, Page, StateLabel};
pub use render::{apply_failure, render};
pub use state::{AppState, AppViewModel, SessionState};
pub use status::{progress_percent, CellValue, JobId, JobRef, JobResult, JobStatus, PollDirective};
pub use table::{HeaderCell, ResultTable};
pub use update::update;
pub use upload::{FormErrors, UploadForm, UploadOutcome};
