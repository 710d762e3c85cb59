use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use lectern_client::SubmitOptions;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::OutputArgs;
use crate::output::OutputFormat;

/// Prints "Retrying (attempt N)..." while a request waits out pending answers.
#[derive(Clone)]
pub struct RetryIndicator {
    visible: bool,
    retries: Arc<AtomicU32>,
}

impl RetryIndicator {
    pub fn new(output: &OutputArgs) -> Self {
        Self {
            visible: output.format == OutputFormat::Text && !output.quiet,
            retries: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn retries(&self) -> u32 {
        self.retries.load(Ordering::Relaxed)
    }

    fn on_retry(&self, attempt: u32, delay: Duration) {
        self.retries.store(attempt, Ordering::Relaxed);
        if self.visible {
            eprintln!(
                "Retrying (attempt {attempt})... next try in {:.1}s",
                delay.as_secs_f64()
            );
        }
    }

    /// Submit options wired to this indicator and cancelled by Ctrl-C.
    ///
    /// Keep the returned listener alive until the request settles.
    pub fn submit_options(&self) -> (SubmitOptions, CtrlCListener) {
        let indicator = self.clone();
        let listener = CtrlCListener::spawn();
        let options = SubmitOptions::new()
            .on_retry(move |attempt, delay| indicator.on_retry(attempt, delay))
            .cancel_token(listener.token());
        (options, listener)
    }
}

/// Cancels its token on Ctrl-C. Dropping it stops listening.
pub struct CtrlCListener {
    token: CancellationToken,
    stop: CancellationToken,
    task: JoinHandle<()>,
}

impl CtrlCListener {
    pub fn spawn() -> Self {
        let token = CancellationToken::new();
        let stop = CancellationToken::new();
        let (fire, done) = (token.clone(), stop.clone());
        let task = tokio::spawn(async move {
            tokio::select! {
                _ = done.cancelled() => {}
                res = tokio::signal::ctrl_c() => {
                    if res.is_ok() {
                        fire.cancel();
                    }
                }
            }
        });
        Self { token, stop, task }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Drop for CtrlCListener {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dropping_the_listener_ends_its_task() {
        let listener = CtrlCListener::spawn();
        let token = listener.token();
        let task = listener.task.abort_handle();

        drop(listener);
        for _ in 0..10 {
            if task.is_finished() {
                break;
            }
            tokio::task::yield_now().await;
        }

        assert!(task.is_finished());
        assert!(!token.is_cancelled());
    }
}
