mod poller;
mod status;

pub use poller::{DEFAULT_POLL_INTERVAL, PollerState, ReadinessPoller, StatusSource, Subscription};
pub use status::{ModelsState, ReadinessStatus};
