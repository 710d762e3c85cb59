use std::time::Duration;

/// Status the backend answers with when it has accepted a job that is not finished yet.
pub const ACCEPTED_PENDING: u16 = 202;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub pending_status: u16,
    /// Delay before the first retry when the server gives no hint.
    pub base_delay: Duration,
    pub factor: f64,
    /// Ceiling for both computed backoff and server hints.
    pub max_delay: Duration,
    pub jitter: JitterMode,
    /// Maximum number of retries performed for one logical request.
    pub max_attempts: u32,
    pub hints: DelayHintConfig,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            pending_status: ACCEPTED_PENDING,
            base_delay: Duration::from_millis(1000),
            factor: 2.0,
            max_delay: Duration::from_secs(30),
            jitter: JitterMode::None,
            max_attempts: 10,
            hints: DelayHintConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JitterMode {
    #[default]
    None,
    /// Uniform delay in `[0, backoff]`. Never applied to server hints.
    Full,
}

#[derive(Debug, Clone)]
pub struct DelayHintConfig {
    /// Vendor-specific retry-after headers, consulted after `Retry-After`.
    pub vendor_headers: Vec<RetryVendorHeader>,
    /// Body fields consulted after all headers, in order.
    pub body_fields: Vec<BodyDelayField>,
}

impl Default for DelayHintConfig {
    fn default() -> Self {
        Self {
            vendor_headers: Vec::new(),
            body_fields: vec![
                BodyDelayField {
                    name: "retry_after".to_string(),
                    unit: DelayUnit::Seconds,
                },
                BodyDelayField {
                    name: "retry_after_ms".to_string(),
                    unit: DelayUnit::Milliseconds,
                },
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryVendorHeader {
    pub name: String,
    pub kind: VendorHeaderKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorHeaderKind {
    /// delta seconds
    DeltaSeconds,
    /// delta milliseconds
    DeltaMillis,
    /// unix epoch seconds
    UnixSeconds,
    /// HTTP-date
    HttpDate,
}

#[derive(Debug, Clone)]
pub struct BodyDelayField {
    pub name: String,
    pub unit: DelayUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayUnit {
    Seconds,
    Milliseconds,
}
