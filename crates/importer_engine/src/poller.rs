use std::sync::Arc;
use std::time::Duration;

use importer_core::{
    apply_failure, render, FailureReason, JobRef, JobStatus, Page, PollDirective, PollEnd,
};
use importer_logging::{importer_debug, importer_info, importer_warn};
use tokio_util::sync::CancellationToken;

use crate::{decode_status, DecodeError, FailureKind, FetchError, Scheduler, StatusFetcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            max_attempts: 50,
        }
    }
}

/// State of one polling loop. Owned by that loop and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSession {
    job: JobRef,
    attempts_made: u32,
    max_attempts: u32,
    interval: Duration,
}

impl PollSession {
    pub fn new(job: JobRef, config: &PollConfig) -> Self {
        Self {
            job,
            attempts_made: 0,
            max_attempts: config.max_attempts,
            interval: config.interval,
        }
    }

    pub fn attempts_made(&self) -> u32 {
        self.attempts_made
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts_made >= self.max_attempts
    }
}

/// Receives every decoded status and client-side failure of a session.
pub trait StatusHandler: Send {
    fn on_status(&mut self, status: &JobStatus) -> PollDirective;
    fn on_failure(&mut self, reason: &FailureReason);
}

impl StatusHandler for Page {
    fn on_status(&mut self, status: &JobStatus) -> PollDirective {
        render(self, status)
    }

    fn on_failure(&mut self, reason: &FailureReason) {
        apply_failure(self, reason);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Job reached a terminal status.
    Completed { attempts: u32 },
    /// Attempt limit reached while the job was still running.
    Exhausted { attempts: u32 },
    Cancelled { attempts: u32 },
    TransportFailed { attempts: u32, error: FetchError },
    /// No request could be built from the settings; nothing was sent.
    Misconfigured { attempts: u32, error: FetchError },
    DecodeFailed { attempts: u32, error: DecodeError },
}

impl PollOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Completed { attempts }
            | PollOutcome::Exhausted { attempts }
            | PollOutcome::Cancelled { attempts }
            | PollOutcome::TransportFailed { attempts, .. }
            | PollOutcome::Misconfigured { attempts, .. }
            | PollOutcome::DecodeFailed { attempts, .. } => *attempts,
        }
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            PollOutcome::Completed { .. } | PollOutcome::Cancelled { .. } => None,
            PollOutcome::Exhausted { attempts } => Some(FailureReason::TimedOut {
                attempts: *attempts,
            }),
            PollOutcome::TransportFailed { error, .. } => {
                Some(FailureReason::Transport(error.to_string()))
            }
            PollOutcome::Misconfigured { error, .. } => {
                Some(FailureReason::Config(error.message.clone()))
            }
            PollOutcome::DecodeFailed { error, .. } => {
                Some(FailureReason::Decode(error.to_string()))
            }
        }
    }

    pub fn poll_end(&self) -> PollEnd {
        match self {
            PollOutcome::Completed { .. } => PollEnd::Completed,
            PollOutcome::Cancelled { .. } => PollEnd::Cancelled,
            _ => PollEnd::Failed,
        }
    }
}

/// Job poller: one fetch at a time, a fixed delay between attempts.
#[derive(Clone)]
pub struct JobPoller {
    fetcher: Arc<dyn StatusFetcher>,
    scheduler: Arc<dyn Scheduler>,
}

impl JobPoller {
    pub fn new(fetcher: Arc<dyn StatusFetcher>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self { fetcher, scheduler }
    }

    /// Polls until the job is terminal, the client gives up or `cancel` fires.
    ///
    /// The next request is only scheduled after the previous response has
    /// been rendered. Transport and decode failures stop the session without
    /// retrying; only `Pending`/`Progress` lead to another attempt.
    pub async fn poll(
        &self,
        session: &mut PollSession,
        handler: &mut dyn StatusHandler,
        cancel: &CancellationToken,
    ) -> PollOutcome {
        loop {
            if cancel.is_cancelled() {
                return cancelled(session);
            }

            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => return cancelled(session),
                fetched = self.fetcher.fetch_status(&session.job) => fetched,
            };
            let output = match fetched {
                Ok(output) => output,
                Err(error) => {
                    importer_warn!(
                        "Status request for job {} failed after {} attempts: {}",
                        session.job,
                        session.attempts_made,
                        error
                    );
                    let attempts = session.attempts_made;
                    let outcome = if error.kind == FailureKind::InvalidUrl {
                        PollOutcome::Misconfigured { attempts, error }
                    } else {
                        PollOutcome::TransportFailed { attempts, error }
                    };
                    report_failure(handler, &outcome);
                    return outcome;
                }
            };
            session.attempts_made += 1;

            let status = match decode_status(&output.bytes) {
                Ok(status) => status,
                Err(error) => {
                    let metadata = &output.metadata;
                    importer_warn!(
                        "Undecodable status for job {} from {} (HTTP {}, {}, {} bytes): {}",
                        session.job,
                        metadata.url,
                        metadata.status,
                        metadata.content_type.as_deref().unwrap_or("no content type"),
                        metadata.byte_len,
                        error
                    );
                    let outcome = PollOutcome::DecodeFailed {
                        attempts: session.attempts_made,
                        error,
                    };
                    report_failure(handler, &outcome);
                    return outcome;
                }
            };
            importer_debug!(
                "Job {} attempt {}/{}: {}",
                session.job,
                session.attempts_made,
                session.max_attempts,
                status.tag()
            );

            match handler.on_status(&status) {
                PollDirective::Stop => {
                    importer_info!(
                        "Job {} finished with {} after {} attempts",
                        session.job,
                        status.tag(),
                        session.attempts_made
                    );
                    return PollOutcome::Completed {
                        attempts: session.attempts_made,
                    };
                }
                PollDirective::Continue if session.is_exhausted() => {
                    importer_warn!(
                        "Job {} still {} after {}/{} attempts; giving up",
                        session.job,
                        status.tag(),
                        session.attempts_made,
                        session.max_attempts
                    );
                    let outcome = PollOutcome::Exhausted {
                        attempts: session.attempts_made,
                    };
                    report_failure(handler, &outcome);
                    return outcome;
                }
                PollDirective::Continue => {}
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return cancelled(session),
                _ = self.scheduler.wait(session.interval) => {}
            }
        }
    }
}

fn cancelled(session: &PollSession) -> PollOutcome {
    importer_info!(
        "Polling for job {} cancelled after {} attempts",
        session.job,
        session.attempts_made
    );
    PollOutcome::Cancelled {
        attempts: session.attempts_made,
    }
}

fn report_failure(handler: &mut dyn StatusHandler, outcome: &PollOutcome) {
    if let Some(reason) = outcome.failure_reason() {
        handler.on_failure(&reason);
    }
}
