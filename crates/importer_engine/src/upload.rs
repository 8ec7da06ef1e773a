use importer_core::{FormErrors, UploadForm, UploadOutcome};
use importer_logging::{importer_info, importer_warn};
use reqwest::header::LOCATION;
use reqwest::multipart::{Form, Part};

use crate::client::map_reqwest_error;
use crate::{decode_form_errors, decode_upload_response, DecodeError, FailureKind, FetchError, ImportClient};

const FILE_FIELD: &str = "data_file";
const CSRF_FIELD: &str = "csrfmiddlewaretoken";
const CSRF_HEADER: &str = "X-CSRFToken";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UploadError {
    #[error("could not read {path}: {message}")]
    File { path: String, message: String },
    #[error("upload request failed: {0}")]
    Transport(#[from] FetchError),
    #[error("upload rejected: {}", .0.lines().join("; "))]
    Rejected(FormErrors),
    #[error("unexpected upload response: {0}")]
    Decode(#[from] DecodeError),
}

impl ImportClient {
    /// Posts the file as multipart form data to the upload endpoint.
    pub async fn upload(&self, form: &UploadForm) -> Result<UploadOutcome, UploadError> {
        let path = form.file_path.display().to_string();
        let bytes = tokio::fs::read(&form.file_path)
            .await
            .map_err(|err| UploadError::File {
                path: path.clone(),
                message: err.to_string(),
            })?;
        let file_name = form
            .file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());
        let byte_len = bytes.len();

        let mut multipart = Form::new();
        for (name, value) in &form.fields {
            multipart = multipart.text(name.clone(), value.clone());
        }
        if let Some(token) = &form.csrf_token {
            multipart = multipart.text(CSRF_FIELD, token.clone());
        }
        multipart = multipart.part(FILE_FIELD, Part::bytes(bytes).file_name(file_name));

        let url = self.join(&self.settings.upload_endpoint)?;
        importer_info!("POST {} file={} bytes={}", url, path, byte_len);
        let mut request = self.http.post(url).multipart(multipart);
        if let Some(token) = &form.csrf_token {
            request = request.header(CSRF_HEADER, token.as_str());
        }
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if status.is_redirection() {
            let target = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            return match target {
                Some(target) => Ok(UploadOutcome::Redirect(target)),
                None => Err(FetchError::new(
                    FailureKind::HttpStatus(status.as_u16()),
                    "redirect without a location",
                )
                .into()),
            };
        }

        let output = self.read_body(response).await?;
        if status.is_success() {
            return Ok(decode_upload_response(&output.bytes)?);
        }

        match decode_form_errors(&output.bytes) {
            Ok(errors) if !errors.is_empty() => {
                importer_warn!("Upload rejected: {}", errors.lines().join("; "));
                Err(UploadError::Rejected(errors))
            }
            _ => Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            )
            .into()),
        }
    }
}
