mod backoff;
mod classify;
mod config;
mod headers;

pub use backoff::{DelaySource, backoff_delay, retry_delay};
pub use classify::{Classification, classify, error_message};
pub use config::{
    ACCEPTED_PENDING, BodyDelayField, DelayHintConfig, DelayUnit, JitterMode, RetryConfig,
    RetryVendorHeader, VendorHeaderKind,
};
pub use headers::{parse_body_hint, parse_delay_hint, parse_retry_after};
