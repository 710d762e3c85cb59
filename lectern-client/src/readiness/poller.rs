use std::cell::Cell;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::ApiError;
use crate::events::{Event, EventSink, NoOpEventSink};
use crate::readiness::status::ReadinessStatus;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

thread_local! {
    // Set while this thread runs an `on_update` callback.
    static IN_UPDATE: Cell<bool> = const { Cell::new(false) };
}

struct UpdateScope;

impl UpdateScope {
    fn enter() -> Self {
        IN_UPDATE.with(|f| f.set(true));
        UpdateScope
    }
}

impl Drop for UpdateScope {
    fn drop(&mut self) {
        IN_UPDATE.with(|f| f.set(false));
    }
}

/// Where the poller reads readiness from.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self) -> Result<ReadinessStatus, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling,
    /// Readiness reached; no further queries.
    Settled,
    /// Detached; no further callbacks.
    Stopped,
}

impl PollerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollerState::Idle => "idle",
            PollerState::Polling => "polling",
            PollerState::Settled => "settled",
            PollerState::Stopped => "stopped",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PollerState::Settled | PollerState::Stopped)
    }
}

pub struct ReadinessPoller {
    source: Arc<dyn StatusSource>,
    events: Arc<dyn EventSink>,
}

impl ReadinessPoller {
    pub fn new(source: Arc<dyn StatusSource>) -> Self {
        Self {
            source,
            events: Arc::new(NoOpEventSink),
        }
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Start polling on the current tokio runtime.
    ///
    /// The first query is issued immediately. Failed queries are retried after
    /// `interval` forever; only readiness or [`Subscription::detach`] ends polling.
    pub fn subscribe<F>(&self, on_update: F, interval: Duration) -> Subscription
    where
        F: Fn(ReadinessStatus) + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        let alive = CancellationToken::new();
        let (tx, _rx) = watch::channel(PollerState::Idle);
        let state = Arc::new(tx);
        let gate = Arc::new(Mutex::new(()));

        let task = PollTask {
            id,
            source: self.source.clone(),
            events: self.events.clone(),
            on_update: Box::new(on_update),
            interval,
            alive: alive.clone(),
            state: state.clone(),
            gate: gate.clone(),
        };
        tokio::spawn(task.run());

        Subscription {
            id,
            alive,
            state,
            gate,
        }
    }
}

struct PollTask {
    id: Uuid,
    source: Arc<dyn StatusSource>,
    events: Arc<dyn EventSink>,
    on_update: Box<dyn Fn(ReadinessStatus) + Send + Sync>,
    interval: Duration,
    alive: CancellationToken,
    state: Arc<watch::Sender<PollerState>>,
    /// Held by the task across the liveness check and `on_update`, and by `detach`.
    gate: Arc<Mutex<()>>,
}

impl PollTask {
    async fn run(self) {
        let final_state = self.poll_until_settled().await;
        transition(&self.state, final_state);
        self.events
            .emit(Event::SubscriptionStopped {
                subscription_id: self.id,
                state: final_state,
            })
            .await;
    }

    async fn poll_until_settled(&self) -> PollerState {
        loop {
            if self.alive.is_cancelled() {
                return PollerState::Stopped;
            }
            transition(&self.state, PollerState::Polling);

            let result = tokio::select! {
                biased;
                _ = self.alive.cancelled() => return PollerState::Stopped,
                r = self.source.fetch_status() => r,
            };

            match result {
                Ok(status) => {
                    self.events
                        .emit(Event::StatusPolled {
                            subscription_id: self.id,
                            status,
                        })
                        .await;
                    if !self.deliver(status) {
                        return PollerState::Stopped;
                    }
                    if status.is_ready() {
                        return PollerState::Settled;
                    }
                }
                Err(e) => {
                    self.events
                        .emit(Event::StatusPollFailed {
                            subscription_id: self.id,
                            error: e.to_string(),
                        })
                        .await;
                }
            }

            tokio::select! {
                biased;
                _ = self.alive.cancelled() => return PollerState::Stopped,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    /// Hand `status` to the callback unless detached. Detach may have raced
    /// with the query, so liveness is checked under the gate.
    fn deliver(&self, status: ReadinessStatus) -> bool {
        let _gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        if self.alive.is_cancelled() {
            return false;
        }
        let _scope = UpdateScope::enter();
        (self.on_update)(status);
        true
    }
}

/// Move to `next` unless the subscription was already stopped.
fn transition(state: &watch::Sender<PollerState>, next: PollerState) {
    state.send_if_modified(|cur| {
        if *cur == PollerState::Stopped || *cur == next {
            return false;
        }
        *cur = next;
        true
    });
}

/// Interest in readiness updates. Dropping it detaches.
pub struct Subscription {
    id: Uuid,
    alive: CancellationToken,
    state: Arc<watch::Sender<PollerState>>,
    gate: Arc<Mutex<()>>,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> PollerState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<PollerState> {
        self.state.subscribe()
    }

    pub fn is_alive(&self) -> bool {
        !self.alive.is_cancelled()
    }

    /// Stop polling. No `on_update` fires after this returns.
    ///
    /// Waits for a callback running on another thread to finish. Called from
    /// inside `on_update` it only flags the stop.
    pub fn detach(&self) {
        if IN_UPDATE.with(Cell::get) {
            self.alive.cancel();
        } else {
            let _gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
            self.alive.cancel();
        }
        self.state.send_replace(PollerState::Stopped);
    }

    /// Resolve once the subscription is settled or stopped.
    pub async fn wait(&self) -> PollerState {
        let mut rx = self.state.subscribe();
        let state = match rx.wait_for(|s| s.is_terminal()).await {
            Ok(s) => *s,
            Err(_) => self.state(),
        };
        state
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish()
    }
}
