use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use importer_core::{
    apply_failure, render, FailureReason, JobRef, JobStatus, Page, PollDirective, UploadForm,
};
use importer_logging::importer_error;
use tokio_util::sync::CancellationToken;

use crate::{
    EngineEvent, FetchError, FetchSettings, ImportClient, JobPoller, PollConfig, PollSession,
    StatusHandler, TokioScheduler,
};

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub fetch: FetchSettings,
    pub poll: PollConfig,
}

enum EngineCommand {
    Upload(UploadForm),
    Poll {
        job: JobRef,
        cancel: CancellationToken,
    },
}

/// Runs uploads and poll sessions on a background thread.
///
/// Commands are executed strictly one after another on a single-threaded
/// runtime, so there is never more than one session or outstanding status
/// request.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Mutex<mpsc::Receiver<EngineEvent>>,
    active: Mutex<Option<CancellationToken>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, FetchError> {
        let client = Arc::new(ImportClient::new(config.fetch)?);
        let poller = JobPoller::new(client.clone(), Arc::new(TokioScheduler));
        let poll_config = config.poll;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    importer_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                runtime.block_on(handle_command(
                    client.as_ref(),
                    &poller,
                    poll_config,
                    command,
                    &event_tx,
                ));
            }
        });

        Ok(Self {
            cmd_tx,
            event_rx: Mutex::new(event_rx),
            active: Mutex::new(None),
        })
    }

    pub fn upload(&self, form: UploadForm) {
        let _ = self.cmd_tx.send(EngineCommand::Upload(form));
    }

    /// Queues a poll session for `job`, replacing the cancel token of any previous one.
    pub fn start_polling(&self, job: JobRef) {
        let cancel = CancellationToken::new();
        if let Ok(mut active) = self.active.lock() {
            if let Some(previous) = active.replace(cancel.clone()) {
                previous.cancel();
            }
        }
        let _ = self.cmd_tx.send(EngineCommand::Poll { job, cancel });
    }

    /// Cancels the active poll session, if any. Stops the pending wait immediately.
    pub fn cancel(&self) {
        if let Ok(mut active) = self.active.lock() {
            if let Some(token) = active.take() {
                token.cancel();
            }
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    /// Blocks for the next event. `None` once the engine thread is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv().ok()
    }
}

/// Renders into its own page and forwards a snapshot after every status.
struct ForwardingHandler<'a> {
    page: Page,
    event_tx: &'a mpsc::Sender<EngineEvent>,
}

impl StatusHandler for ForwardingHandler<'_> {
    fn on_status(&mut self, status: &JobStatus) -> PollDirective {
        let directive = render(&mut self.page, status);
        if directive == PollDirective::Continue {
            let _ = self.event_tx.send(EngineEvent::PageRendered(self.page.clone()));
        }
        directive
    }

    fn on_failure(&mut self, reason: &FailureReason) {
        apply_failure(&mut self.page, reason);
    }
}

async fn handle_command(
    client: &ImportClient,
    poller: &JobPoller,
    poll_config: PollConfig,
    command: EngineCommand,
    event_tx: &mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Upload(form) => {
            let result = client.upload(&form).await;
            let _ = event_tx.send(EngineEvent::UploadFinished(result));
        }
        EngineCommand::Poll { job, cancel } => {
            let mut session = PollSession::new(job, &poll_config);
            let mut handler = ForwardingHandler {
                page: Page::new(),
                event_tx,
            };
            let outcome = poller.poll(&mut session, &mut handler, &cancel).await;
            let _ = event_tx.send(EngineEvent::PollFinished {
                outcome,
                page: handler.page,
            });
        }
    }
}
