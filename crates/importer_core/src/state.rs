use crate::{FormErrors, JobRef, Page, PollEnd};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Uploading,
    Polling,
    /// Upload accepted; the server wants the columns categorized next.
    AwaitingCategorize,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    session: SessionState,
    job: Option<JobRef>,
    page: Page,
    form_errors: Option<FormErrors>,
    upload_error: Option<String>,
    categorize_headers: Vec<String>,
    poll_end: Option<PollEnd>,
    dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub job: Option<JobRef>,
    pub page: Page,
    pub form_errors: Option<FormErrors>,
    pub upload_error: Option<String>,
    pub categorize_headers: Vec<String>,
    pub poll_end: Option<PollEnd>,
    pub dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            session: self.session,
            job: self.job.clone(),
            page: self.page.clone(),
            form_errors: self.form_errors.clone(),
            upload_error: self.upload_error.clone(),
            categorize_headers: self.categorize_headers.clone(),
            poll_end: self.poll_end,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn begin_upload(&mut self) {
        self.session = SessionState::Uploading;
        self.form_errors = None;
        self.upload_error = None;
        self.dirty = true;
    }

    pub(crate) fn begin_polling(&mut self, job: JobRef) {
        self.session = SessionState::Polling;
        self.job = Some(job);
        self.page = Page::new();
        self.poll_end = None;
        self.dirty = true;
    }

    pub(crate) fn reject_upload(&mut self, errors: FormErrors) {
        self.session = SessionState::Idle;
        self.form_errors = Some(errors);
        self.dirty = true;
    }

    pub(crate) fn fail_upload(&mut self, message: String) {
        self.session = SessionState::Idle;
        self.upload_error = Some(message);
        self.dirty = true;
    }

    pub(crate) fn await_categorize(&mut self, headers: Vec<String>) {
        self.session = SessionState::AwaitingCategorize;
        self.categorize_headers = headers;
        self.dirty = true;
    }

    pub(crate) fn set_page(&mut self, page: Page) {
        if self.page != page {
            self.page = page;
            self.dirty = true;
        }
    }

    pub(crate) fn finish_polling(&mut self, page: Page, end: PollEnd) {
        self.session = SessionState::Finished;
        self.page = page;
        self.poll_end = Some(end);
        self.dirty = true;
    }
}
