use crate::http::HttpError;

/// Terminal failure of one logical request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Network or parse failure. Never retried.
    #[error("transport error: {0}")]
    Transport(String),
    /// Non-success, non-pending status. The message comes from the response body when present.
    #[error("{message}")]
    Remote { status: u16, message: String },
    #[error("operation still pending after {attempts} retries")]
    PendingRetryExhausted { attempts: u32 },
    #[error("request cancelled")]
    Cancelled,
}

impl ClientError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<HttpError> for ClientError {
    fn from(e: HttpError) -> Self {
        ClientError::Transport(e.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
    #[error("invalid base URL {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },
    #[error("invalid endpoint {endpoint}: {message}")]
    InvalidEndpoint { endpoint: String, message: String },
}

impl ApiError {
    pub fn decode(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn as_client(&self) -> Option<&ClientError> {
        match self {
            ApiError::Client(e) => Some(e),
            _ => None,
        }
    }
}
