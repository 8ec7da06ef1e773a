use crate::{
    progress_percent, Details, FailureReason, JobResult, JobStatus, MessagePanel, Page,
    PollDirective, ResultTable, StateLabel,
};

/// Status renderer: applies one decoded status to the page.
///
/// Terminal statuses replace the panel, details and warnings wholesale, so
/// rendering the same status twice leaves the page unchanged.
pub fn render(page: &mut Page, status: &JobStatus) -> PollDirective {
    match status {
        JobStatus::Pending => PollDirective::Continue,
        JobStatus::Progress {
            current,
            total,
            message,
        } => {
            page.state_label = StateLabel::Progress;
            page.progress_percent = progress_percent(*current, *total);
            if let Some(message) = message.as_ref().filter(|m| !m.is_empty()) {
                page.progress_message = Some(message.clone());
            }
            PollDirective::Continue
        }
        JobStatus::Success(result) if result.has_domain_error() => {
            render_domain_failure(page, result);
            PollDirective::Stop
        }
        JobStatus::Success(result) => {
            render_success(page, result);
            PollDirective::Stop
        }
        JobStatus::Failure { detail } => {
            finish(page, StateLabel::Failure);
            page.panel = None;
            page.details = Details::RawDetail(detail.clone());
            PollDirective::Stop
        }
    }
}

/// Marks the page failed for a reason detected by the client itself.
pub fn apply_failure(page: &mut Page, reason: &FailureReason) {
    finish(page, StateLabel::Failure);
    page.progress_message = Some("Error".to_string());
    page.panel = Some(MessagePanel::ClientError {
        message: reason.to_string(),
    });
    page.details = Details::Empty;
}

fn render_domain_failure(page: &mut Page, result: &JobResult) {
    finish(page, StateLabel::Failure);
    page.progress_message = Some("Error".to_string());
    let message = result
        .error_message
        .clone()
        .or_else(|| result.error.clone())
        .unwrap_or_default();
    page.panel = Some(MessagePanel::DomainError { message });
    page.details = Details::Empty;
}

fn render_success(page: &mut Page, result: &JobResult) {
    let label = if result.warnings.is_empty() {
        StateLabel::Success
    } else {
        StateLabel::SuccessWithWarnings
    };
    finish(page, label);
    page.progress_percent = 100;
    page.progress_message = Some("Finished".to_string());
    page.panel = Some(MessagePanel::Success);
    page.details = Details::Table(ResultTable::from_result(result));
    page.warnings = result.warnings.clone();
    page.continue_enabled = true;
}

fn finish(page: &mut Page, label: StateLabel) {
    page.state_label = label;
    page.progress_active = false;
    page.warnings.clear();
    page.continue_enabled = false;
}
