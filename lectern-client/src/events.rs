use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::readiness::{PollerState, ReadinessStatus};
use crate::retry::DelaySource;

#[derive(Debug, Clone)]
pub enum Event {
    RequestStarted {
        request_id: Uuid,
        method: String,
        endpoint: String,
    },
    AttemptStarted {
        request_id: Uuid,
        endpoint: String,
        attempt_no: u32,
    },
    AttemptFinished {
        request_id: Uuid,
        endpoint: String,
        attempt_no: u32,
        status: Option<u16>,
        result: &'static str,
    },
    RetryScheduled {
        request_id: Uuid,
        endpoint: String,
        retry: u32,
        delay_ms: u64,
        source: DelaySource,
    },
    RequestFinished {
        request_id: Uuid,
        endpoint: String,
        outcome: &'static str,
        retries: u32,
    },
    StatusPolled {
        subscription_id: Uuid,
        status: ReadinessStatus,
    },
    StatusPollFailed {
        subscription_id: Uuid,
        error: String,
    },
    SubscriptionStopped {
        subscription_id: Uuid,
        state: PollerState,
    },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::RequestStarted { .. } => "request.started",
            Event::AttemptStarted { .. } => "attempt.started",
            Event::AttemptFinished { .. } => "attempt.finished",
            Event::RetryScheduled { .. } => "retry.scheduled",
            Event::RequestFinished { .. } => "request.finished",
            Event::StatusPolled { .. } => "status.polled",
            Event::StatusPollFailed { .. } => "status.poll_failed",
            Event::SubscriptionStopped { .. } => "subscription.stopped",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let kind = self.kind();
        match self {
            Event::RequestStarted { request_id, method, endpoint } => {
                json!({ "type": kind, "request_id": request_id.to_string(), "method": method, "endpoint": endpoint })
            }
            Event::AttemptStarted { request_id, endpoint, attempt_no } => {
                json!({ "type": kind, "request_id": request_id.to_string(), "endpoint": endpoint, "attempt_no": attempt_no })
            }
            Event::AttemptFinished { request_id, endpoint, attempt_no, status, result } => {
                json!({ "type": kind, "request_id": request_id.to_string(), "endpoint": endpoint, "attempt_no": attempt_no, "status": status, "result": result })
            }
            Event::RetryScheduled { request_id, endpoint, retry, delay_ms, source } => {
                json!({ "type": kind, "request_id": request_id.to_string(), "endpoint": endpoint, "retry": retry, "delay_ms": delay_ms, "source": source.as_str() })
            }
            Event::RequestFinished { request_id, endpoint, outcome, retries } => {
                json!({ "type": kind, "request_id": request_id.to_string(), "endpoint": endpoint, "outcome": outcome, "retries": retries })
            }
            Event::StatusPolled { subscription_id, status } => {
                json!({
                    "type": kind,
                    "subscription_id": subscription_id.to_string(),
                    "transformers_available": status.transformers_available,
                    "summarizer_ready": status.summarizer_ready,
                    "generator_ready": status.generator_ready,
                    "ready": status.is_ready()
                })
            }
            Event::StatusPollFailed { subscription_id, error } => {
                json!({ "type": kind, "subscription_id": subscription_id.to_string(), "error": error })
            }
            Event::SubscriptionStopped { subscription_id, state } => {
                json!({ "type": kind, "subscription_id": subscription_id.to_string(), "state": state.as_str() })
            }
        }
    }
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: Event);
}

pub struct CompositeEventSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl Default for CompositeEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeEventSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }
}

#[async_trait]
impl EventSink for CompositeEventSink {
    async fn emit(&self, event: Event) {
        for sink in &self.sinks {
            sink.emit(event.clone()).await;
        }
    }
}

/// One JSON object per line on stderr, keeping stdout free for command output.
pub struct StderrEventSink;

#[async_trait]
impl EventSink for StderrEventSink {
    async fn emit(&self, event: Event) {
        eprintln!("{}", serde_json::to_string(&event.to_json()).unwrap_or_default());
    }
}

pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: Event) {
    }
}
