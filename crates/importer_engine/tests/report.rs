use std::fs;

use importer_core::{render, render_html, JobStatus, Page, RenderOptions};
use importer_engine::{build_report_document, ReportWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_report_dir() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("out").join("report.html");
    let written = ReportWriter::new(target.clone()).write("<p>x</p>").unwrap();
    assert_eq!(written, target);
    assert_eq!(fs::read_to_string(&target).unwrap(), "<p>x</p>");
}

#[test]
fn rewriting_replaces_previous_report() {
    let temp = TempDir::new().unwrap();
    let writer = ReportWriter::new(temp.path().join("report.html"));

    let mut page = Page::new();
    render(
        &mut page,
        &JobStatus::Failure {
            detail: "first".into(),
        },
    );
    let fragment = render_html(&page, &RenderOptions::default());
    let first = writer
        .write(&build_report_document("Import", &fragment, "t0"))
        .unwrap();

    render(
        &mut page,
        &JobStatus::Failure {
            detail: "second".into(),
        },
    );
    let fragment = render_html(&page, &RenderOptions::default());
    let second = writer
        .write(&build_report_document("Import", &fragment, "t1"))
        .unwrap();

    assert_eq!(first, second);
    let content = fs::read_to_string(&second).unwrap();
    assert!(content.contains("second"));
    assert!(!content.contains("first"));
}

#[test]
fn parent_that_is_a_file_is_an_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = ReportWriter::new(file_path.join("report.html"));
    assert!(writer.write("data").is_err());
    assert_eq!(fs::read_to_string(&file_path).unwrap(), "x");
}
