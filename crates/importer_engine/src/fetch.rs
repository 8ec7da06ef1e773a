use importer_core::JobRef;
use importer_logging::importer_debug;
use url::Url;

use crate::client::map_reqwest_error;
use crate::{FailureKind, FetchError, FetchOutput, ImportClient};

const JOB_ID_PLACEHOLDER: &str = "{job_id}";

/// Issues one status request for a job.
#[async_trait::async_trait]
pub trait StatusFetcher: Send + Sync {
    async fn fetch_status(&self, job: &JobRef) -> Result<FetchOutput, FetchError>;
}

/// Builds the status URL from the endpoint template.
///
/// `{job_id}` is replaced by the percent-encoded id. A template without the
/// placeholder is used as-is; the server then identifies the job through the
/// session.
pub fn resolve_status_url(base: &Url, template: &str, job: &JobRef) -> Result<Url, FetchError> {
    let path = if template.contains(JOB_ID_PLACEHOLDER) {
        match job {
            JobRef::Id(id) => {
                let encoded: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
                template.replace(JOB_ID_PLACEHOLDER, &encoded)
            }
            JobRef::Session => {
                return Err(FetchError::new(
                    FailureKind::InvalidUrl,
                    format!("endpoint template {template} needs a job id"),
                ));
            }
        }
    } else {
        template.to_string()
    };
    base.join(&path)
        .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
}

#[async_trait::async_trait]
impl StatusFetcher for ImportClient {
    async fn fetch_status(&self, job: &JobRef) -> Result<FetchOutput, FetchError> {
        let url = resolve_status_url(&self.base_url, &self.settings.endpoint_template, job)?;
        importer_debug!("GET {} job={}", url, job);

        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        self.read_body(response).await
    }
}

#[cfg(test)]
mod tests {
    use importer_core::JobRef;
    use url::Url;

    use super::resolve_status_url;
    use crate::FailureKind;

    fn base() -> Url {
        Url::parse("http://localhost:8000/app/").unwrap()
    }

    #[test]
    fn substitutes_encoded_job_id() {
        let url = resolve_status_url(
            &base(),
            "/upload/status/{job_id}/",
            &JobRef::Id("a b/c".into()),
        )
        .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/upload/status/a+b%2Fc/");
    }

    #[test]
    fn session_template_is_used_verbatim() {
        let url = resolve_status_url(&base(), "/check-task-status/", &JobRef::Session).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/check-task-status/");

        let url = resolve_status_url(&base(), "check-status/", &JobRef::Id("7".into())).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/app/check-status/");
    }

    #[test]
    fn placeholder_without_job_id_is_rejected() {
        let err = resolve_status_url(&base(), "/status/{job_id}/", &JobRef::Session).unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }
}
