use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, json};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use lectern_client::events::{Event, EventSink};
use lectern_client::http::{HttpClient, HttpError, HttpRequestParts, HttpResponseParts};
use lectern_client::retry::RetryConfig;
use lectern_client::{
    ApiRequest, ClientConfig, ClientError, Outcome, RetryState, RetryingClient, SubmitOptions,
};

type Reply = Result<HttpResponseParts, HttpError>;

struct ScriptedHttpClient {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<HttpRequestParts>>,
    latency: Duration,
}

impl ScriptedHttpClient {
    fn new(replies: Vec<Reply>) -> Arc<Self> {
        Self::with_latency(replies, Duration::ZERO)
    }

    fn with_latency(replies: Vec<Reply>, latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            latency,
        })
    }

    fn sent(&self) -> Vec<HttpRequestParts> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for ScriptedHttpClient {
    async fn send(
        &self,
        req: HttpRequestParts,
        _timeout: Duration,
        _max_response_bytes: usize,
    ) -> Result<HttpResponseParts, HttpError> {
        self.requests.lock().unwrap().push(req);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(HttpError::Other("script exhausted".to_string())))
    }
}

struct RecordingSink {
    kinds: Mutex<Vec<&'static str>>,
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn emit(&self, event: Event) {
        self.kinds.lock().unwrap().push(event.kind());
    }
}

fn reply(status: u16, body: serde_json::Value) -> Reply {
    Ok(HttpResponseParts {
        status,
        headers: BTreeMap::new(),
        body: serde_json::to_vec(&body).unwrap(),
    })
}

fn pending() -> Reply {
    Ok(HttpResponseParts {
        status: 202,
        headers: BTreeMap::new(),
        body: Vec::new(),
    })
}

fn pending_with_retry_after(secs: u64) -> Reply {
    Ok(HttpResponseParts {
        status: 202,
        headers: BTreeMap::from([("retry-after".to_string(), secs.to_string())]),
        body: br#"{"status":"accepted"}"#.to_vec(),
    })
}

fn client(http: Arc<ScriptedHttpClient>, retry: RetryConfig) -> RetryingClient {
    let mut cfg = ClientConfig::new(url::Url::parse("http://localhost:5000").unwrap());
    cfg.retry = retry;
    RetryingClient::new(http, cfg)
}

fn summarize_request(text: &str) -> ApiRequest {
    let mut body = Map::new();
    body.insert("text".to_string(), json!(text));
    ApiRequest::post("/summarize", body)
}

type Calls = Arc<Mutex<Vec<(u32, Duration)>>>;

fn recording_options() -> (SubmitOptions, Calls) {
    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let sink = calls.clone();
    let opts = SubmitOptions::new().on_retry(move |attempt, delay| {
        sink.lock().unwrap().push((attempt, delay));
    });
    (opts, calls)
}

#[tokio::test(start_paused = true)]
async fn first_attempt_success_has_no_retry_callbacks() {
    let http = ScriptedHttpClient::new(vec![reply(200, json!({"summary": "done"}))]);
    let c = client(http.clone(), RetryConfig::default());
    let (opts, calls) = recording_options();

    let outcome = c.submit(&summarize_request("hello"), opts).await;

    assert_eq!(outcome, Outcome::Completed(json!({"summary": "done"})));
    assert!(calls.lock().unwrap().is_empty());
    assert_eq!(http.sent().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn pending_k_times_then_success_reports_each_retry_in_order() {
    let http = ScriptedHttpClient::new(vec![
        pending(),
        pending(),
        pending(),
        reply(200, json!({"questions": []})),
    ]);
    let c = client(http.clone(), RetryConfig::default());
    let (opts, calls) = recording_options();

    let outcome = c.submit(&summarize_request("hello"), opts).await;

    assert!(outcome.is_completed());
    let attempts: Vec<u32> = calls.lock().unwrap().iter().map(|(a, _)| *a).collect();
    assert_eq!(attempts, vec![1, 2, 3]);

    let sent = http.sent();
    assert_eq!(sent.len(), 4);
    assert!(sent.iter().all(|r| r.body == sent[0].body && r.url == sent[0].url));
}

#[tokio::test(start_paused = true)]
async fn pending_without_hint_uses_exponential_backoff() {
    let http = ScriptedHttpClient::new(vec![
        pending(),
        pending(),
        pending(),
        reply(200, json!({})),
    ]);
    let retry = RetryConfig {
        base_delay: Duration::from_millis(400),
        factor: 2.0,
        max_delay: Duration::from_millis(1000),
        ..Default::default()
    };
    let c = client(http, retry);
    let (opts, calls) = recording_options();

    let started = tokio::time::Instant::now();
    c.submit(&summarize_request("hello"), opts).await;

    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            (1, Duration::from_millis(400)),
            (2, Duration::from_millis(800)),
            (3, Duration::from_millis(1000)),
        ]
    );
    assert!(started.elapsed() >= Duration::from_millis(2200));
}

#[tokio::test(start_paused = true)]
async fn pending_past_max_attempts_times_out() {
    let http = ScriptedHttpClient::new((0..20).map(|_| pending()).collect());
    let retry = RetryConfig {
        max_attempts: 4,
        base_delay: Duration::from_millis(10),
        ..Default::default()
    };
    let c = client(http.clone(), retry);
    let (opts, calls) = recording_options();

    let outcome = c.submit(&summarize_request("hello"), opts).await;

    assert_eq!(outcome, Outcome::TimedOut { attempts: 4 });
    assert_eq!(calls.lock().unwrap().len(), 4);
    assert_eq!(http.sent().len(), 5);
    assert_eq!(
        outcome.into_result(),
        Err(ClientError::PendingRetryExhausted { attempts: 4 })
    );
}

/// Answers pending, cancelling `token` while serving the `cancel_on`-th send.
struct CancellingHttpClient {
    token: CancellationToken,
    cancel_on: usize,
    sends: Mutex<usize>,
}

#[async_trait]
impl HttpClient for CancellingHttpClient {
    async fn send(
        &self,
        _req: HttpRequestParts,
        _timeout: Duration,
        _max_response_bytes: usize,
    ) -> Result<HttpResponseParts, HttpError> {
        let mut sends = self.sends.lock().unwrap();
        *sends += 1;
        if *sends == self.cancel_on {
            self.token.cancel();
        }
        pending()
    }
}

#[tokio::test(start_paused = true)]
async fn cancel_during_last_pending_attempt_reports_cancelled() {
    let token = CancellationToken::new();
    let http = Arc::new(CancellingHttpClient {
        token: token.clone(),
        cancel_on: 3,
        sends: Mutex::new(0),
    });
    let mut cfg = ClientConfig::new(url::Url::parse("http://localhost:5000").unwrap());
    cfg.retry = RetryConfig {
        max_attempts: 2,
        base_delay: Duration::from_millis(10),
        ..Default::default()
    };
    let c = RetryingClient::new(http.clone(), cfg);
    let (opts, calls) = recording_options();

    let outcome = c
        .submit(&summarize_request("hello"), opts.cancel_token(token))
        .await;

    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(calls.lock().unwrap().len(), 2);
    assert_eq!(*http.sends.lock().unwrap(), 3);
}

#[tokio::test(start_paused = true)]
async fn cancel_while_waiting_prevents_next_attempt() {
    let http = ScriptedHttpClient::new(vec![
        pending_with_retry_after(2),
        reply(200, json!({"summary": "late"})),
    ]);
    let c = client(http.clone(), RetryConfig::default());
    let token = CancellationToken::new();
    let (opts, calls) = recording_options();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        canceller.cancel();
    });

    let outcome = c
        .submit(&summarize_request("hello"), opts.cancel_token(token))
        .await;

    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(http.sent().len(), 1);
    assert_eq!(calls.lock().unwrap().len(), 1);

    // Nothing else goes out once the request has been cancelled.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(http.sent().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_while_in_flight_stops_immediately() {
    let http = ScriptedHttpClient::with_latency(
        vec![pending(), reply(200, json!({}))],
        Duration::from_secs(5),
    );
    let c = client(http.clone(), RetryConfig::default());
    let token = CancellationToken::new();
    let (opts, calls) = recording_options();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.cancel();
    });

    let started = tokio::time::Instant::now();
    let outcome = c
        .submit(&summarize_request("hello"), opts.cancel_token(token))
        .await;

    assert_eq!(outcome, Outcome::Cancelled);
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(calls.lock().unwrap().is_empty());
    assert_eq!(http.sent().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn already_cancelled_request_sends_nothing() {
    let http = ScriptedHttpClient::new(vec![reply(200, json!({}))]);
    let c = client(http.clone(), RetryConfig::default());
    let token = CancellationToken::new();
    token.cancel();

    let outcome = c
        .submit(&summarize_request("hello"), SubmitOptions::new().cancel_token(token))
        .await;

    assert_eq!(outcome, Outcome::Cancelled);
    assert!(http.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn retry_state_resets_after_every_outcome() {
    let cases: Vec<Vec<Reply>> = vec![
        vec![pending(), pending(), reply(200, json!({}))],
        vec![pending(), reply(500, json!({"error": "boom"}))],
        vec![pending(), Err(HttpError::Network("refused".to_string()))],
    ];

    for replies in cases {
        let http = ScriptedHttpClient::new(replies);
        let c = client(http, RetryConfig::default());
        let (tx, rx) = watch::channel(RetryState::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_cb = seen.clone();
        let rx_cb = rx.clone();
        let opts = SubmitOptions::new()
            .progress(tx)
            .on_retry(move |_, _| seen_cb.lock().unwrap().push(*rx_cb.borrow()));

        c.submit(&summarize_request("hello"), opts).await;

        assert_eq!(*rx.borrow(), RetryState::default());
        // The published state matched the callback while retrying.
        let seen = seen.lock().unwrap();
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|s| s.attempt > 0));
    }
}

#[tokio::test(start_paused = true)]
async fn transport_failure_is_not_retried() {
    let http = ScriptedHttpClient::new(vec![
        Err(HttpError::Network("connection refused".to_string())),
        reply(200, json!({})),
    ]);
    let c = client(http.clone(), RetryConfig::default());
    let (opts, calls) = recording_options();

    let outcome = c.submit(&summarize_request("hello"), opts).await;

    match outcome {
        Outcome::Failed(ClientError::Transport(msg)) => assert!(msg.contains("connection refused")),
        other => panic!("expected transport failure, got {other:?}"),
    }
    assert_eq!(http.sent().len(), 1);
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn remote_error_is_not_retried_and_keeps_message() {
    let http = ScriptedHttpClient::new(vec![
        pending(),
        reply(503, json!({"error": "Summarization failed"})),
        reply(200, json!({})),
    ]);
    let c = client(http.clone(), RetryConfig::default());

    let outcome = c
        .submit(&summarize_request("hello"), SubmitOptions::new())
        .await;

    assert_eq!(
        outcome,
        Outcome::Failed(ClientError::Remote {
            status: 503,
            message: "Summarization failed".to_string()
        })
    );
    assert_eq!(http.sent().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn summarize_with_two_second_hint() {
    let http = ScriptedHttpClient::new(vec![
        pending_with_retry_after(2),
        reply(200, json!({"summary": "Hi."})),
    ]);
    let c = client(http, RetryConfig::default());
    let (opts, calls) = recording_options();

    let outcome = c.submit(&summarize_request("hello"), opts).await;

    assert_eq!(*calls.lock().unwrap(), vec![(1, Duration::from_millis(2000))]);
    assert_eq!(outcome, Outcome::Completed(json!({"summary": "Hi."})));
}

#[tokio::test(start_paused = true)]
async fn server_hint_is_capped_at_ceiling() {
    let http = ScriptedHttpClient::new(vec![
        pending_with_retry_after(600),
        reply(200, json!({})),
    ]);
    let retry = RetryConfig {
        max_delay: Duration::from_secs(5),
        ..Default::default()
    };
    let c = client(http, retry);
    let (opts, calls) = recording_options();

    c.submit(&summarize_request("hello"), opts).await;

    assert_eq!(*calls.lock().unwrap(), vec![(1, Duration::from_secs(5))]);
}

#[tokio::test(start_paused = true)]
async fn invalid_endpoint_fails_without_sending() {
    let http = ScriptedHttpClient::new(vec![reply(200, json!({}))]);
    let c = client(http.clone(), RetryConfig::default());

    let outcome = c
        .submit(&ApiRequest::get("http://[::1"), SubmitOptions::new())
        .await;

    assert!(matches!(outcome, Outcome::Failed(ClientError::Transport(_))));
    assert!(http.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn events_follow_request_lifecycle() {
    let http = ScriptedHttpClient::new(vec![pending(), reply(200, json!({}))]);
    let sink = Arc::new(RecordingSink {
        kinds: Mutex::new(Vec::new()),
    });
    let c = client(http, RetryConfig::default()).with_event_sink(sink.clone());

    c.submit(&summarize_request("hello"), SubmitOptions::new())
        .await;

    assert_eq!(
        *sink.kinds.lock().unwrap(),
        vec![
            "request.started",
            "attempt.started",
            "attempt.finished",
            "retry.scheduled",
            "attempt.started",
            "attempt.finished",
            "request.finished",
        ]
    );
}
