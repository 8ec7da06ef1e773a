use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use importer_core::escape_html;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("report directory missing or not writable: {0}")]
    ReportDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Wraps a rendered page fragment into a standalone HTML document.
pub fn build_report_document(title: &str, fragment: &str, generated_utc: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n\
         <h1>{title}</h1>\n{fragment}<footer>Generated {generated}</footer>\n</body>\n</html>\n",
        title = escape_html(title),
        generated = escape_html(generated_utc),
    )
}

/// Writes the report atomically: temp file in the same directory, then rename.
pub struct ReportWriter {
    path: PathBuf,
}

impl ReportWriter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn write(&self, content: &str) -> Result<PathBuf, PersistError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        ensure_report_dir(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&self.path).map_err(|e| PersistError::Io(e.error))?;
        Ok(self.path.clone())
    }
}

fn ensure_report_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::ReportDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::ReportDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::ReportDir(e.to_string()))?;
    }
    Ok(())
}
