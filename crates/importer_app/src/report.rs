use std::path::PathBuf;

use chrono::Utc;
use importer_core::{render_html, Page, RenderOptions};
use importer_engine::{build_report_document, PersistError, ReportWriter};
use importer_logging::importer_info;

const REPORT_TITLE: &str = "Import results";

/// Writes the final page as a standalone HTML document.
pub(crate) fn save_report(
    path: PathBuf,
    page: &Page,
    options: &RenderOptions,
) -> Result<PathBuf, PersistError> {
    let fragment = render_html(page, options);
    let document = build_report_document(REPORT_TITLE, &fragment, &Utc::now().to_rfc3339());
    let written = ReportWriter::new(path).write(&document)?;
    importer_info!("Wrote report to {:?}", written);
    Ok(written)
}
