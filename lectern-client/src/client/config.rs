use std::collections::BTreeMap;
use std::time::Duration;

use crate::retry::RetryConfig;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: url::Url,
    /// Upper bound for a single physical attempt.
    pub attempt_timeout: Duration,
    pub max_response_bytes: usize,
    pub default_headers: BTreeMap<String, String>,
    pub retry: RetryConfig,
}

impl ClientConfig {
    pub fn new(base_url: url::Url) -> Self {
        Self {
            base_url,
            attempt_timeout: Duration::from_secs(30),
            max_response_bytes: 4 * 1024 * 1024,
            default_headers: BTreeMap::from([(
                "Accept".to_string(),
                "application/json".to_string(),
            )]),
            retry: RetryConfig::default(),
        }
    }
}
