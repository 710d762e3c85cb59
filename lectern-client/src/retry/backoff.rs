use std::time::Duration;

use crate::retry::config::{JitterMode, RetryConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelaySource {
    ServerHint,
    Backoff,
}

impl DelaySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DelaySource::ServerHint => "server_hint",
            DelaySource::Backoff => "backoff",
        }
    }
}

/// Delay before retry number `attempt` (1-based).
///
/// A server hint wins over computed backoff; both are capped at `max_delay`.
pub fn retry_delay(
    cfg: &RetryConfig,
    attempt: u32,
    hint: Option<Duration>,
    rand_u64: impl Fn() -> u64,
) -> (Duration, DelaySource) {
    match hint {
        Some(d) => (clamp(d, cfg.max_delay), DelaySource::ServerHint),
        None => (backoff_delay(cfg, attempt, rand_u64), DelaySource::Backoff),
    }
}

/// Exponential backoff: `base * factor^(attempt-1)`, capped, then jittered.
pub fn backoff_delay(cfg: &RetryConfig, attempt: u32, rand_u64: impl Fn() -> u64) -> Duration {
    let exp = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
    let raw = (cfg.base_delay.as_millis() as f64) * cfg.factor.max(1.0).powi(exp);
    let raw_ms = raw.min(cfg.max_delay.as_millis() as f64).max(0.0) as u64;

    let ms = match cfg.jitter {
        JitterMode::None => raw_ms,
        JitterMode::Full if raw_ms == 0 => 0,
        JitterMode::Full => rand_u64() % (raw_ms + 1),
    };
    Duration::from_millis(ms)
}

fn clamp(delay: Duration, max: Duration) -> Duration {
    if delay > max { max } else { delay }
}
