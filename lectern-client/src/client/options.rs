use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Retry progress of one logical request, `{0, 0}` while idle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryState {
    pub attempt: u32,
    pub delay: Duration,
}

pub type RetryCallback = Box<dyn Fn(u32, Duration) + Send + Sync>;

/// Per-call knobs for [`RetryingClient::submit`](crate::client::RetryingClient::submit).
#[derive(Default)]
pub struct SubmitOptions {
    on_retry: Option<RetryCallback>,
    cancel: Option<CancellationToken>,
    progress: Option<watch::Sender<RetryState>>,
}

impl SubmitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with `(attempt, delay)` before each wait, attempts strictly increasing from 1.
    pub fn on_retry(mut self, f: impl Fn(u32, Duration) + Send + Sync + 'static) -> Self {
        self.on_retry = Some(Box::new(f));
        self
    }

    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Publish [`RetryState`] on a watch channel; it reads `{0, 0}` once the request settles.
    pub fn progress(mut self, tx: watch::Sender<RetryState>) -> Self {
        self.progress = Some(tx);
        self
    }

    pub(crate) fn token(&self) -> CancellationToken {
        self.cancel.clone().unwrap_or_default()
    }

    pub(crate) fn report_retry(&self, state: RetryState) {
        self.publish(state);
        if let Some(cb) = &self.on_retry {
            cb(state.attempt, state.delay);
        }
    }

    pub(crate) fn reset(&self) {
        self.publish(RetryState::default());
    }

    fn publish(&self, state: RetryState) {
        if let Some(tx) = &self.progress {
            tx.send_replace(state);
        }
    }
}

impl std::fmt::Debug for SubmitOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmitOptions")
            .field("on_retry", &self.on_retry.is_some())
            .field("cancel", &self.cancel)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}
