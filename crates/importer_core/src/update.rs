use crate::{AppState, Effect, JobRef, Msg, SessionState, UploadOutcome};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::UploadSubmitted(form) => {
            if state.session() != SessionState::Idle {
                return (state, Vec::new());
            }
            state.begin_upload();
            vec![Effect::SubmitUpload(form)]
        }
        Msg::WatchRequested(job) => {
            if state.session() != SessionState::Idle {
                return (state, Vec::new());
            }
            state.begin_polling(job.clone());
            vec![Effect::StartPolling(job)]
        }
        Msg::UploadAccepted(outcome) => {
            if state.session() != SessionState::Uploading {
                return (state, Vec::new());
            }
            match outcome {
                UploadOutcome::Job(id) => {
                    let job = JobRef::Id(id);
                    state.begin_polling(job.clone());
                    vec![Effect::StartPolling(job)]
                }
                // The results page polls the session-keyed status endpoint.
                UploadOutcome::Redirect(_) => {
                    state.begin_polling(JobRef::Session);
                    vec![Effect::StartPolling(JobRef::Session)]
                }
                UploadOutcome::Headers(headers) => {
                    state.await_categorize(headers);
                    Vec::new()
                }
            }
        }
        Msg::UploadRejected(errors) => {
            if state.session() == SessionState::Uploading {
                state.reject_upload(errors);
            }
            Vec::new()
        }
        Msg::UploadFailed(message) => {
            if state.session() == SessionState::Uploading {
                state.fail_upload(message);
            }
            Vec::new()
        }
        Msg::PageRendered(page) => {
            if state.session() == SessionState::Polling {
                state.set_page(page);
            }
            Vec::new()
        }
        Msg::PollFinished { page, end } => {
            if state.session() != SessionState::Polling {
                return (state, Vec::new());
            }
            state.finish_polling(page, end);
            vec![Effect::WriteReport]
        }
        Msg::CancelRequested => {
            if state.session() == SessionState::Polling {
                vec![Effect::CancelPolling]
            } else {
                Vec::new()
            }
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}
