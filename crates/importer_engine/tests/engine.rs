use std::time::{Duration, Instant};

use importer_core::{JobRef, StateLabel};
use importer_engine::{
    EngineConfig, EngineEvent, EngineHandle, FetchSettings, PollConfig, PollOutcome,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn engine(server: &MockServer, max_attempts: u32) -> EngineHandle {
    EngineHandle::new(EngineConfig {
        fetch: FetchSettings {
            base_url: server.uri(),
            endpoint_template: "/status/{job_id}/".into(),
            ..FetchSettings::default()
        },
        poll: PollConfig {
            interval: Duration::from_millis(5),
            max_attempts,
        },
    })
    .expect("engine")
}

async fn collect_until_finished(engine: &EngineHandle) -> Vec<EngineEvent> {
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut events = Vec::new();
    while Instant::now() < deadline {
        match engine.try_recv() {
            Some(event) => {
                let done = matches!(event, EngineEvent::PollFinished { .. });
                events.push(event);
                if done {
                    return events;
                }
            }
            None => tokio::time::sleep(Duration::from_millis(5)).await,
        }
    }
    panic!("engine did not finish; got {events:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn engine_polls_until_success_and_forwards_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/42/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "PROGRESS",
            "result": {"current": 1, "total": 2}
        })))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status/42/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "SUCCESS",
            "result": {"headerRow": ["a"], "dataRows": [["1"]]}
        })))
        .mount(&server)
        .await;

    let engine = engine(&server, 10);
    engine.start_polling(JobRef::Id("42".into()));
    let events = collect_until_finished(&engine).await;

    let rendered = events
        .iter()
        .filter(|event| matches!(event, EngineEvent::PageRendered(_)))
        .count();
    assert_eq!(rendered, 2);
    match events.last() {
        Some(EngineEvent::PollFinished { outcome, page }) => {
            assert_eq!(*outcome, PollOutcome::Completed { attempts: 3 });
            assert_eq!(page.state_label, StateLabel::Success);
            assert_eq!(page.progress_percent, 100);
        }
        other => panic!("unexpected last event {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn engine_cancel_stops_an_endless_job() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/7/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "PENDING", "result": null})),
        )
        .mount(&server)
        .await;

    let engine = engine(&server, u32::MAX);
    engine.start_polling(JobRef::Id("7".into()));
    tokio::time::sleep(Duration::from_millis(50)).await;
    engine.cancel();
    let events = collect_until_finished(&engine).await;

    match events.last() {
        Some(EngineEvent::PollFinished { outcome, page }) => {
            assert!(matches!(outcome, PollOutcome::Cancelled { .. }));
            assert_eq!(page.state_label, StateLabel::Pending);
        }
        other => panic!("unexpected last event {other:?}"),
    }
}
