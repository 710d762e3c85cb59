#![forbid(unsafe_code)]

//! Client for the Lectern learning backend.
//!
//! [`client::RetryingClient`] turns a backend that may answer "accepted, not
//! ready yet" into a single awaitable call; [`readiness::ReadinessPoller`]
//! watches `/models/status` until the models have loaded. [`api::ApiClient`]
//! layers typed endpoint wrappers on top of both.

pub mod api;
pub mod client;
pub mod error;
pub mod events;
pub mod http;
pub mod readiness;
pub mod retry;

pub use crate::api::ApiClient;
pub use crate::client::{ApiRequest, ClientConfig, Outcome, RetryState, RetryingClient, SubmitOptions};
pub use crate::error::{ApiError, ClientError};
pub use crate::readiness::{ReadinessPoller, ReadinessStatus, Subscription};
