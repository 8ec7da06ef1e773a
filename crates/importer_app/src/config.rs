use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use importer_core::{DetailPolicy, RenderOptions};
use importer_engine::{EngineConfig, FetchSettings, PollConfig};
use importer_logging::importer_info;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const JOB_ID_PLACEHOLDER: &str = "{job_id}";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How the raw detail of an opaque failure goes into HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DetailMode {
    #[default]
    Escape,
    Trusted,
}

impl From<DetailMode> for DetailPolicy {
    fn from(mode: DetailMode) -> Self {
        match mode {
            DetailMode::Escape => DetailPolicy::Escape,
            DetailMode::Trusted => DetailPolicy::Trusted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub base_url: String,
    pub endpoint_template: String,
    pub upload_endpoint: String,
    pub interval_ms: u64,
    pub max_attempts: u32,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub max_body_bytes: u64,
    pub detail_policy: DetailMode,
    pub back_href: String,
    /// Where the final HTML page is written. `None` skips the report.
    pub report_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        let poll = PollConfig::default();
        Self {
            base_url: fetch.base_url,
            endpoint_template: fetch.endpoint_template,
            upload_endpoint: fetch.upload_endpoint,
            interval_ms: duration_ms(poll.interval),
            max_attempts: poll.max_attempts,
            connect_timeout_ms: duration_ms(fetch.connect_timeout),
            request_timeout_ms: duration_ms(fetch.request_timeout),
            max_body_bytes: fetch.max_body_bytes,
            detail_policy: DetailMode::default(),
            back_href: RenderOptions::default().back_href,
            report_path: Some(PathBuf::from("import-report.html")),
        }
    }
}

impl AppConfig {
    /// Reads `path` when given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        importer_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        ron::from_str(content).map_err(|err| err.to_string())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_attempts must be at least 1".into(),
            ));
        }
        if self.interval_ms == 0 {
            return Err(ConfigError::Invalid("interval_ms must be positive".into()));
        }
        match Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::Invalid(format!(
                    "base_url must be http or https, got {}",
                    url.scheme()
                )))
            }
            Err(err) => {
                return Err(ConfigError::Invalid(format!(
                    "base_url {:?} is not a URL: {err}",
                    self.base_url
                )))
            }
        }
        Ok(())
    }

    /// True when the status path is per job (`{job_id}` in the template).
    pub fn needs_job_id(&self) -> bool {
        self.endpoint_template.contains(JOB_ID_PLACEHOLDER)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            fetch: FetchSettings {
                base_url: self.base_url.clone(),
                endpoint_template: self.endpoint_template.clone(),
                upload_endpoint: self.upload_endpoint.clone(),
                connect_timeout: Duration::from_millis(self.connect_timeout_ms),
                request_timeout: Duration::from_millis(self.request_timeout_ms),
                max_body_bytes: self.max_body_bytes,
            },
            poll: PollConfig {
                interval: Duration::from_millis(self.interval_ms),
                max_attempts: self.max_attempts,
            },
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            detail_policy: self.detail_policy.into(),
            back_href: self.back_href.clone(),
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
