use std::time::{Duration, SystemTime};

use serde_json::Value as JsonValue;

use crate::error::ClientError;
use crate::http::HttpResponseParts;
use crate::retry::config::RetryConfig;
use crate::retry::headers::parse_delay_hint;

/// What one physical attempt means for the logical request.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Completed(JsonValue),
    Retry { hint: Option<Duration> },
    Failed(ClientError),
}

pub fn classify(resp: &HttpResponseParts, cfg: &RetryConfig, now: SystemTime) -> Classification {
    if resp.status == cfg.pending_status {
        let body = resp.json();
        return Classification::Retry {
            hint: parse_delay_hint(&resp.headers, body.as_ref(), &cfg.hints, now),
        };
    }

    if resp.is_success() {
        return match resp.json() {
            Some(body) => Classification::Completed(body),
            None => Classification::Failed(ClientError::Transport(format!(
                "malformed response body (status {})",
                resp.status
            ))),
        };
    }

    Classification::Failed(ClientError::Remote {
        status: resp.status,
        message: error_message(resp.json().as_ref())
            .unwrap_or_else(|| format!("request failed with status {}", resp.status)),
    })
}

/// Human-readable error from a response body: `error` first, then `message`.
pub fn error_message(body: Option<&JsonValue>) -> Option<String> {
    let obj = body?.as_object()?;
    ["error", "message"].iter().find_map(|k| match obj.get(*k)? {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.clone()),
        JsonValue::Null | JsonValue::String(_) => None,
        other => Some(other.to_string()),
    })
}
