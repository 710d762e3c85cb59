use std::sync::Arc;
use std::time::SystemTime;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::client::config::ClientConfig;
use crate::client::options::{RetryState, SubmitOptions};
use crate::client::outcome::Outcome;
use crate::client::request::ApiRequest;
use crate::events::{Event, EventSink, NoOpEventSink};
use crate::http::{HttpClient, HttpRequestParts};
use crate::retry::{Classification, classify, retry_delay};

/// Sends logical requests, re-polling while the backend answers "accepted, pending".
pub struct RetryingClient {
    http: Arc<dyn HttpClient>,
    config: ClientConfig,
    events: Arc<dyn EventSink>,
}

impl RetryingClient {
    pub fn new(http: Arc<dyn HttpClient>, config: ClientConfig) -> Self {
        Self {
            http,
            config,
            events: Arc::new(NoOpEventSink),
        }
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn event_sink(&self) -> Arc<dyn EventSink> {
        self.events.clone()
    }

    /// Run one logical request to a terminal [`Outcome`].
    ///
    /// Only the pending status is retried, and always with the same request.
    /// Cancellation is honoured while an attempt is in flight and while waiting
    /// between attempts. Published retry progress is reset before returning.
    pub async fn submit(&self, request: &ApiRequest, options: SubmitOptions) -> Outcome {
        let request_id = Uuid::new_v4();
        let endpoint = request.endpoint().to_string();
        let cancel = options.token();
        options.reset();

        self.events
            .emit(Event::RequestStarted {
                request_id,
                method: request.method().as_str().to_string(),
                endpoint: endpoint.clone(),
            })
            .await;

        let (outcome, retries) =
            match request.to_parts(&self.config.base_url, &self.config.default_headers) {
                Ok(parts) => self.run(request_id, &endpoint, parts, &options, &cancel).await,
                Err(e) => (Outcome::Failed(e), 0),
            };

        options.reset();
        self.events
            .emit(Event::RequestFinished {
                request_id,
                endpoint,
                outcome: outcome.as_str(),
                retries,
            })
            .await;
        outcome
    }

    async fn run(
        &self,
        request_id: Uuid,
        endpoint: &str,
        parts: HttpRequestParts,
        options: &SubmitOptions,
        cancel: &CancellationToken,
    ) -> (Outcome, u32) {
        let retry_cfg = &self.config.retry;
        let mut retries: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return (Outcome::Cancelled, retries);
            }

            let attempt_no = retries + 1;
            self.events
                .emit(Event::AttemptStarted {
                    request_id,
                    endpoint: endpoint.to_string(),
                    attempt_no,
                })
                .await;

            let sent = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                r = self.http.send(
                    parts.clone(),
                    self.config.attempt_timeout,
                    self.config.max_response_bytes,
                ) => Some(r),
            };

            let (status, classification) = match sent {
                None => {
                    self.attempt_finished(request_id, endpoint, attempt_no, None, "cancelled")
                        .await;
                    return (Outcome::Cancelled, retries);
                }
                Some(Ok(resp)) => (
                    Some(resp.status),
                    classify(&resp, retry_cfg, SystemTime::now()),
                ),
                Some(Err(e)) => (None, Classification::Failed(e.into())),
            };

            let hint = match classification {
                Classification::Completed(body) => {
                    self.attempt_finished(request_id, endpoint, attempt_no, status, "completed")
                        .await;
                    return (Outcome::Completed(body), retries);
                }
                Classification::Failed(e) => {
                    self.attempt_finished(request_id, endpoint, attempt_no, status, "failed")
                        .await;
                    return (Outcome::Failed(e), retries);
                }
                Classification::Retry { hint } => {
                    self.attempt_finished(request_id, endpoint, attempt_no, status, "pending")
                        .await;
                    hint
                }
            };

            if cancel.is_cancelled() {
                return (Outcome::Cancelled, retries);
            }
            if retries >= retry_cfg.max_attempts {
                return (Outcome::TimedOut { attempts: retries }, retries);
            }
            retries += 1;

            let (delay, source) = retry_delay(retry_cfg, retries, hint, || fastrand::u64(..));
            options.report_retry(RetryState {
                attempt: retries,
                delay,
            });
            self.events
                .emit(Event::RetryScheduled {
                    request_id,
                    endpoint: endpoint.to_string(),
                    retry: retries,
                    delay_ms: delay.as_millis() as u64,
                    source,
                })
                .await;

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return (Outcome::Cancelled, retries),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    async fn attempt_finished(
        &self,
        request_id: Uuid,
        endpoint: &str,
        attempt_no: u32,
        status: Option<u16>,
        result: &'static str,
    ) {
        self.events
            .emit(Event::AttemptFinished {
                request_id,
                endpoint: endpoint.to_string(),
                attempt_no,
                status,
                result,
            })
            .await;
    }
}
