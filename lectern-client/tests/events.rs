use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use lectern_client::events::{CompositeEventSink, Event, EventSink};
use lectern_client::readiness::{PollerState, ReadinessPoller, ReadinessStatus, StatusSource};
use lectern_client::retry::DelaySource;
use lectern_client::ApiError;

#[derive(Clone, Default)]
struct JsonRecorder {
    seen: Arc<Mutex<Vec<Value>>>,
}

#[async_trait]
impl EventSink for JsonRecorder {
    async fn emit(&self, event: Event) {
        self.seen.lock().unwrap().push(event.to_json());
    }
}

struct AlwaysReady;

#[async_trait]
impl StatusSource for AlwaysReady {
    async fn fetch_status(&self) -> Result<ReadinessStatus, ApiError> {
        Ok(ReadinessStatus {
            transformers_available: true,
            summarizer_ready: true,
            generator_ready: true,
        })
    }
}

#[test]
fn retry_scheduled_serializes_delay_and_source() {
    let id = Uuid::new_v4();
    let v = Event::RetryScheduled {
        request_id: id,
        endpoint: "/summarize".to_string(),
        retry: 2,
        delay_ms: 2000,
        source: DelaySource::ServerHint,
    }
    .to_json();

    assert_eq!(v["type"], "retry.scheduled");
    assert_eq!(v["request_id"], id.to_string());
    assert_eq!(v["retry"], 2);
    assert_eq!(v["delay_ms"], 2000);
    assert_eq!(v["source"], DelaySource::ServerHint.as_str());
}

#[tokio::test(start_paused = true)]
async fn composite_sink_fans_out_poller_events() {
    let first = JsonRecorder::default();
    let second = JsonRecorder::default();
    let mut composite = CompositeEventSink::new();
    composite.add(Box::new(first.clone()));
    composite.add(Box::new(second.clone()));

    let poller = ReadinessPoller::new(Arc::new(AlwaysReady)).with_event_sink(Arc::new(composite));
    let sub = poller.subscribe(|_| {}, Duration::from_secs(1));
    let mut state = sub.watch_state();

    assert_eq!(sub.wait().await, PollerState::Settled);
    assert_eq!(*state.borrow_and_update(), PollerState::Settled);
    tokio::time::sleep(Duration::from_millis(10)).await;

    let events = first.seen.lock().unwrap().clone();
    assert_eq!(events, *second.seen.lock().unwrap());
    let kinds: Vec<_> = events.iter().map(|e| e["type"].as_str().unwrap().to_string()).collect();
    assert_eq!(kinds, vec!["status.polled", "subscription.stopped"]);
    assert_eq!(events[0]["ready"], true);
    assert_eq!(events[0]["subscription_id"], sub.id().to_string());
    assert_eq!(events[1]["state"], "settled");
}
