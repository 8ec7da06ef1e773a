use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use importer_core::{
    AppViewModel, Details, HeaderCell, MessagePanel, Page, PollEnd, ResultTable, SessionState,
};

const BAR_WIDTH: usize = 20;

/// Terminal lines for the current view.
pub fn render(view: &AppViewModel) -> Vec<String> {
    match view.session {
        SessionState::Idle => idle_lines(view),
        SessionState::Uploading => vec!["Uploading...".to_string()],
        SessionState::Polling => vec![status_line(&view.page)],
        SessionState::AwaitingCategorize => {
            let mut lines = vec!["Upload accepted. Columns to categorize:".to_string()];
            lines.extend(view.categorize_headers.iter().map(|name| format!("  - {name}")));
            lines
        }
        SessionState::Finished => finished_lines(view),
    }
}

fn idle_lines(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(errors) = &view.form_errors {
        lines.push("Upload rejected:".to_string());
        lines.extend(errors.lines().into_iter().map(|line| format!("  {line}")));
    }
    if let Some(message) = &view.upload_error {
        lines.push(format!("Upload failed: {message}"));
    }
    lines
}

/// One-line summary: label, bar, percent and message.
pub fn status_line(page: &Page) -> String {
    let filled = usize::from(page.progress_percent.min(100)) * BAR_WIDTH / 100;
    let mut line = format!(
        "[{}] [{}{}] {:>3}%",
        page.state_label.as_str(),
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        page.progress_percent
    );
    if let Some(message) = &page.progress_message {
        line.push(' ');
        line.push_str(message);
    }
    line
}

fn finished_lines(view: &AppViewModel) -> Vec<String> {
    let page = &view.page;
    let mut lines = vec![status_line(page)];
    if view.poll_end == Some(PollEnd::Cancelled) {
        lines.push("Stopped watching; the job may still be running.".to_string());
    }

    match &page.panel {
        Some(MessagePanel::Success) => lines.push("Import finished.".to_string()),
        Some(MessagePanel::DomainError { message }) => {
            lines.push(format!("Import reported an error: {message}"))
        }
        Some(MessagePanel::ClientError { message }) => lines.push(format!("Error: {message}")),
        None => {}
    }

    if !page.warnings.is_empty() {
        lines.push("Warnings:".to_string());
        lines.extend(page.warnings.iter().map(|warning| format!("  - {warning}")));
    }

    match &page.details {
        Details::Empty => {}
        Details::Table(table) => {
            lines.push(String::new());
            lines.extend(table_lines(table));
            lines.push(table.partial_sample_note());
        }
        Details::RawDetail(detail) => {
            lines.push("Failure detail:".to_string());
            lines.extend(detail.lines().map(|line| format!("  {line}")));
        }
    }
    lines
}

/// Preview table drawn with box characters, headers carrying their column type.
fn table_lines(result: &ResultTable) -> Vec<String> {
    if result.headers.is_empty() && result.rows.is_empty() {
        return Vec::new();
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        result
            .headers
            .iter()
            .map(|header| Cell::new(HeaderCell::label(header)).fg(Color::Cyan)),
    );
    for row in &result.rows {
        table.add_row(row);
    }
    table.lines().collect()
}
