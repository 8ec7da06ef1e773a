use std::sync::Once;

use importer_core::{
    apply_failure, render, render_html, CellValue, Details, FailureReason, JobResult, JobStatus,
    MessagePanel, Page, PollDirective, RenderOptions, StateLabel,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(importer_logging::initialize_for_tests);
}

fn progress(current: u64, total: u64) -> JobStatus {
    JobStatus::Progress {
        current,
        total,
        message: None,
    }
}

fn success(header: &[&str], rows: &[&[&str]], warnings: &[&str]) -> JobStatus {
    JobStatus::Success(JobResult {
        header_row: header.iter().map(|h| h.to_string()).collect(),
        data_rows: rows
            .iter()
            .map(|row| row.iter().map(|cell| CellValue::from(*cell)).collect())
            .collect(),
        warnings: warnings.iter().map(|w| w.to_string()).collect(),
        ..JobResult::default()
    })
}

#[test]
fn progress_sequence_then_success_shows_table() {
    init_logging();
    let mut page = Page::new();

    assert_eq!(render(&mut page, &progress(1, 4)), PollDirective::Continue);
    assert_eq!(page.progress_percent, 25);
    assert_eq!(page.state_label, StateLabel::Progress);

    assert_eq!(render(&mut page, &progress(2, 4)), PollDirective::Continue);
    assert_eq!(page.progress_percent, 50);

    let directive = render(&mut page, &success(&["a"], &[&["1"]], &[]));
    assert_eq!(directive, PollDirective::Stop);
    assert_eq!(page.progress_percent, 100);
    assert_eq!(page.state_label, StateLabel::Success);
    assert!(!page.progress_active);
    assert!(page.warnings.is_empty());

    let table = page.table().expect("table rendered");
    assert_eq!(table.headers.len(), 1);
    assert_eq!(table.headers[0].name, "a");
    assert_eq!(table.rows, vec![vec!["1".to_string()]]);
    assert_eq!(page.panel, Some(MessagePanel::Success));
    assert!(page.continue_enabled);
}

#[test]
fn domain_error_in_success_envelope_is_a_failure() {
    init_logging();
    let mut page = Page::new();
    let status = JobStatus::Success(JobResult {
        header_row: vec!["a".into()],
        data_rows: vec![vec![CellValue::from("1")]],
        error: Some("x".into()),
        error_message: Some("db write failed".into()),
        ..JobResult::default()
    });

    assert_eq!(render(&mut page, &status), PollDirective::Stop);
    assert_eq!(page.state_label, StateLabel::Failure);
    assert_eq!(page.details, Details::Empty);
    assert!(page.table().is_none());
    assert_eq!(
        page.panel,
        Some(MessagePanel::DomainError {
            message: "db write failed".into()
        })
    );

    let html = render_html(&page, &RenderOptions::default());
    assert_eq!(html.matches("db write failed").count(), 1);
    assert!(!html.contains("<table"));
}

#[test]
fn domain_error_without_message_falls_back_to_error_text() {
    let mut page = Page::new();
    let status = JobStatus::Success(JobResult {
        error: Some("duplicate table".into()),
        ..JobResult::default()
    });
    render(&mut page, &status);
    assert_eq!(
        page.panel,
        Some(MessagePanel::DomainError {
            message: "duplicate table".into()
        })
    );
}

#[test]
fn failure_status_renders_raw_detail() {
    init_logging();
    let mut page = Page::new();
    let status = JobStatus::Failure {
        detail: "boom".into(),
    };

    assert_eq!(render(&mut page, &status), PollDirective::Stop);
    assert_eq!(page.state_label, StateLabel::Failure);
    assert_eq!(page.details, Details::RawDetail("boom".into()));
}

#[test]
fn warnings_downgrade_label_and_keep_order() {
    let mut page = Page::new();
    render(
        &mut page,
        &success(&["a"], &[&["1"]], &["column b truncated", "3 rows skipped"]),
    );

    assert_eq!(page.state_label, StateLabel::SuccessWithWarnings);
    assert_eq!(
        page.warnings,
        vec!["column b truncated".to_string(), "3 rows skipped".to_string()]
    );
    let html = render_html(&page, &RenderOptions::default());
    let first = html.find("column b truncated").unwrap();
    let second = html.find("3 rows skipped").unwrap();
    assert!(first < second);
}

#[test]
fn rerendering_success_replaces_instead_of_appending() {
    let mut page = Page::new();
    let status = success(&["a", "b"], &[&["1", "2"], &["3", "4"]], &["w"]);

    render(&mut page, &status);
    let first = page.clone();
    render(&mut page, &status);

    assert_eq!(page, first);
    assert_eq!(page.table().unwrap().rows.len(), 2);
    assert_eq!(page.warnings.len(), 1);
}

#[test]
fn pending_holds_last_known_progress() {
    let mut page = Page::new();
    render(&mut page, &progress(3, 4));
    assert_eq!(render(&mut page, &JobStatus::Pending), PollDirective::Continue);
    assert_eq!(page.progress_percent, 75);
    assert_eq!(page.state_label, StateLabel::Progress);
}

#[test]
fn progress_message_is_displayed_and_zero_total_is_zero_percent() {
    let mut page = Page::new();
    render(
        &mut page,
        &JobStatus::Progress {
            current: 5,
            total: 0,
            message: Some("Creating table".into()),
        },
    );
    assert_eq!(page.progress_percent, 0);
    assert_eq!(page.progress_message.as_deref(), Some("Creating table"));
}

#[test]
fn progress_percentage_is_clamped() {
    let mut page = Page::new();
    render(&mut page, &progress(12, 10));
    assert_eq!(page.progress_percent, 100);
}

#[test]
fn later_failure_clears_an_earlier_table() {
    let mut page = Page::new();
    render(&mut page, &success(&["a"], &[&["1"]], &["w"]));
    render(
        &mut page,
        &JobStatus::Failure {
            detail: "revoked".into(),
        },
    );
    assert!(page.table().is_none());
    assert!(page.warnings.is_empty());
    assert!(!page.continue_enabled);
}

#[test]
fn client_failure_marks_page_failed() {
    let mut page = Page::new();
    render(&mut page, &progress(1, 2));
    apply_failure(&mut page, &FailureReason::TimedOut { attempts: 50 });

    assert_eq!(page.state_label, StateLabel::Failure);
    assert!(!page.progress_active);
    assert_eq!(page.progress_percent, 50);
    match page.panel {
        Some(MessagePanel::ClientError { ref message }) => assert!(message.contains("50")),
        ref other => panic!("unexpected panel {other:?}"),
    }
}
