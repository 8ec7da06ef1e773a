use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use importer_core::{JobRef, Msg, UploadForm};
use importer_logging::LogDestination;

use crate::config::{AppConfig, ConfigError, DetailMode};

#[derive(Debug, Parser)]
#[command(name = "importer")]
#[command(about = "Upload a data file for import and watch the background job", version)]
pub struct Cli {
    /// RON config file; flags below override it
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Server base URL, e.g. http://127.0.0.1:8000/
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Status path; `{job_id}` is replaced with the job id
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    #[arg(long, global = true)]
    pub interval_ms: Option<u64>,

    #[arg(long, global = true)]
    pub max_attempts: Option<u32>,

    /// Write the final HTML page here
    #[arg(long, short = 'o', global = true)]
    pub report: Option<PathBuf>,

    /// Put failure details into the report without escaping
    #[arg(long, global = true)]
    pub trust_detail: bool,

    /// Stop watching after this many seconds
    #[arg(long, global = true)]
    pub deadline_secs: Option<u64>,

    #[arg(long, value_enum, default_value_t = LogTarget::Terminal, global = true)]
    pub log: LogTarget,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload a file, then follow the import job it starts
    Upload {
        /// File sent as the `data_file` part
        file: PathBuf,

        /// Extra form field as key=value (repeatable)
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,

        #[arg(long)]
        csrf_token: Option<String>,
    },

    /// Follow an import job that is already running
    Watch {
        /// Job id; without it the session-keyed status endpoint is used
        #[arg(long)]
        job_id: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

impl Cli {
    /// Overrides file settings with whatever was given on the command line.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint_template = endpoint.clone();
        }
        if let Some(interval_ms) = self.interval_ms {
            config.interval_ms = interval_ms;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.max_attempts = max_attempts;
        }
        if let Some(report) = &self.report {
            config.report_path = Some(report.clone());
        }
        if self.trust_detail {
            config.detail_policy = DetailMode::Trusted;
        }
    }

    /// Rejects command and config combinations that could never poll.
    pub fn check(&self, config: &AppConfig) -> Result<(), ConfigError> {
        match &self.command {
            Command::Watch { job_id: None } if config.needs_job_id() => {
                Err(ConfigError::Invalid(format!(
                    "endpoint {} is per job; pass --job-id or use a session-keyed endpoint",
                    config.endpoint_template
                )))
            }
            _ => Ok(()),
        }
    }

    /// First message fed into the state machine.
    pub fn initial_msg(&self) -> Msg {
        match &self.command {
            Command::Upload {
                file,
                fields,
                csrf_token,
            } => Msg::UploadSubmitted(UploadForm {
                file_path: file.clone(),
                fields: fields.clone(),
                csrf_token: csrf_token.clone(),
            }),
            Command::Watch { job_id } => Msg::WatchRequested(match job_id {
                Some(id) => JobRef::Id(id.clone()),
                None => JobRef::Session,
            }),
        }
    }
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got {raw:?}")),
    }
}
