#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitUpload(crate::UploadForm),
    StartPolling(crate::JobRef),
    CancelPolling,
    /// Persist the final page.
    WriteReport,
}
