#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted the upload form.
    UploadSubmitted(crate::UploadForm),
    /// User asked to watch an already running job.
    WatchRequested(crate::JobRef),
    /// Upload endpoint accepted the file.
    UploadAccepted(crate::UploadOutcome),
    /// Upload endpoint rejected the form.
    UploadRejected(crate::FormErrors),
    /// Upload request never got a usable answer.
    UploadFailed(String),
    /// Renderer produced a new page after a status check.
    PageRendered(crate::Page),
    /// Poll session ended; carries the final page.
    PollFinished {
        page: crate::Page,
        end: PollEnd,
    },
    /// User asked to stop watching.
    CancelRequested,
    /// Periodic wakeup so the app can check its deadline.
    Tick,
}

/// How a poll session ended, as far as the app is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollEnd {
    /// Job reached a terminal status.
    Completed,
    /// Client gave up (transport, decode or attempt limit).
    Failed,
    Cancelled,
}
