use std::sync::{mpsc, Arc};
use std::thread;

use importer_core::{Effect, Msg};
use importer_engine::{EngineConfig, EngineEvent, EngineHandle, FetchError, PollOutcome, UploadError};
use importer_logging::{importer_info, importer_warn};

/// Runs engine-bound effects and feeds engine events back as messages.
pub struct EffectRunner {
    engine: Arc<EngineHandle>,
}

impl EffectRunner {
    pub fn new(config: EngineConfig, msg_tx: mpsc::Sender<Msg>) -> Result<Self, FetchError> {
        let engine = Arc::new(EngineHandle::new(config)?);
        let runner = Self { engine };
        runner.spawn_event_loop(msg_tx);
        Ok(runner)
    }

    /// Hands engine effects to the engine. `WriteReport` stays with the caller,
    /// which owns the page; it is returned untouched.
    pub fn enqueue(&self, effects: Vec<Effect>) -> Vec<Effect> {
        let mut remaining = Vec::new();
        for effect in effects {
            match effect {
                Effect::SubmitUpload(form) => {
                    importer_info!(
                        "SubmitUpload file={:?} fields={}",
                        form.file_path,
                        form.fields.len()
                    );
                    self.engine.upload(form);
                }
                Effect::StartPolling(job) => {
                    importer_info!("StartPolling job={}", job);
                    self.engine.start_polling(job);
                }
                Effect::CancelPolling => {
                    importer_info!("CancelPolling");
                    self.engine.cancel();
                }
                Effect::WriteReport => remaining.push(effect),
            }
        }
        remaining
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = Arc::clone(&self.engine);
        thread::spawn(move || {
            while let Some(event) = engine.recv() {
                if msg_tx.send(map_event(event)).is_err() {
                    break;
                }
            }
        });
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::UploadFinished(Ok(outcome)) => Msg::UploadAccepted(outcome),
        EngineEvent::UploadFinished(Err(UploadError::Rejected(errors))) => {
            importer_warn!("Upload rejected with {} error(s)", errors.lines().len());
            Msg::UploadRejected(errors)
        }
        EngineEvent::UploadFinished(Err(err)) => {
            importer_warn!("Upload failed: {}", err);
            Msg::UploadFailed(err.to_string())
        }
        EngineEvent::PageRendered(page) => Msg::PageRendered(page),
        EngineEvent::PollFinished { outcome, page } => {
            log_outcome(&outcome);
            Msg::PollFinished {
                page,
                end: outcome.poll_end(),
            }
        }
    }
}

fn log_outcome(outcome: &PollOutcome) {
    match outcome.failure_reason() {
        Some(reason) => importer_warn!(
            "Polling stopped after {} attempt(s): {}",
            outcome.attempts(),
            reason
        ),
        None => importer_info!(
            "Polling ended after {} attempt(s): {:?}",
            outcome.attempts(),
            outcome.poll_end()
        ),
    }
}
