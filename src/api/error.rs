use thiserror::Error;

use crate::util::poll::ProbeError;

/// Failures talking to the Claudebin service.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },
    #[error("Invalid response: {0}")]
    Decode(String),
    #[error("Unrecognized status: {0}")]
    UnknownStatus(String),
}

impl ApiError {
    /// Whether a poll loop may treat this error as noise and keep going.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::UnknownStatus(_))
    }
}

impl ProbeError for ApiError {
    fn is_transient(&self) -> bool {
        ApiError::is_transient(self)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}
