mod config;
mod options;
mod outcome;
mod request;
mod retrying;

pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use options::{RetryCallback, RetryState, SubmitOptions};
pub use outcome::Outcome;
pub use request::{ApiRequest, Method, join_endpoint};
pub use retrying::RetryingClient;
