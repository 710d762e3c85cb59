use serde_json::Value as JsonValue;

use crate::error::ClientError;

/// Terminal result of one logical request. Exactly one is produced per `submit`.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed(JsonValue),
    Failed(ClientError),
    /// The backend kept answering "pending" past the retry limit.
    TimedOut { attempts: u32 },
    Cancelled,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Completed(_) => "completed",
            Outcome::Failed(_) => "failed",
            Outcome::TimedOut { .. } => "timed_out",
            Outcome::Cancelled => "cancelled",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    pub fn into_result(self) -> Result<JsonValue, ClientError> {
        match self {
            Outcome::Completed(body) => Ok(body),
            Outcome::Failed(e) => Err(e),
            Outcome::TimedOut { attempts } => Err(ClientError::PendingRetryExhausted { attempts }),
            Outcome::Cancelled => Err(ClientError::Cancelled),
        }
    }
}
