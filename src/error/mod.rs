//! Error types for Claudebin operations.

use thiserror::Error;

use crate::api::ApiError;
use crate::auth::AuthError;

/// Broad error category, matching how callers should react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The service could not be reached; nothing was retried.
    Connection,
    /// The service reported a terminal state (expired, failed).
    RemoteTerminal,
    /// No terminal state was observed before the deadline.
    Timeout,
    /// Rejected locally before any network call.
    LocalValidation,
    /// Reading or writing local files failed.
    Storage,
    Configuration,
}

/// Primary error type for all Claudebin operations.
#[derive(Error, Debug)]
pub enum ClaudebinError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(
        "Session too large: {:.1}MB exceeds {}MB limit",
        mebibytes(.size_bytes),
        mebibytes(.limit_bytes)
    )]
    PayloadTooLarge { size_bytes: usize, limit_bytes: usize },

    #[error("{message}")]
    ProcessingFailed {
        submission_id: String,
        message: String,
    },

    #[error("{message}")]
    ProcessingTimedOut {
        submission_id: String,
        message: String,
    },

    #[error("{0}")]
    SessionNotFound(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn mebibytes(bytes: &usize) -> f64 {
    *bytes as f64 / (1024.0 * 1024.0)
}

impl ClaudebinError {
    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Auth(auth) => match auth {
                AuthError::Connection(_) => ErrorCategory::Connection,
                AuthError::Expired | AuthError::InvalidResponse(_) => ErrorCategory::RemoteTerminal,
                AuthError::NotLoggedIn => ErrorCategory::LocalValidation,
                AuthError::TimedOut(_) => ErrorCategory::Timeout,
                AuthError::Io(_) | AuthError::Serialization(_) => ErrorCategory::Storage,
            },
            Self::Api(ApiError::Network(_)) => ErrorCategory::Connection,
            Self::Api(_) => ErrorCategory::RemoteTerminal,
            Self::PayloadTooLarge { .. } | Self::InvalidUrl(_) => ErrorCategory::LocalValidation,
            Self::ProcessingFailed { .. } => ErrorCategory::RemoteTerminal,
            Self::ProcessingTimedOut { .. } => ErrorCategory::Timeout,
            Self::SessionNotFound(_) | Self::Io(_) => ErrorCategory::Storage,
        }
    }

    /// Remote job reference retained when processing did not finish cleanly.
    pub fn submission_id(&self) -> Option<&str> {
        match self {
            Self::ProcessingFailed { submission_id, .. }
            | Self::ProcessingTimedOut { submission_id, .. } => Some(submission_id),
            _ => None,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ClaudebinError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_too_large_reports_megabytes() {
        let err = ClaudebinError::PayloadTooLarge {
            size_bytes: 60 * 1024 * 1024,
            limit_bytes: 50 * 1024 * 1024,
        };
        assert_eq!(err.to_string(), "Session too large: 60.0MB exceeds 50MB limit");
        assert_eq!(err.category(), ErrorCategory::LocalValidation);
    }

    #[test]
    fn timeout_is_distinct_from_terminal_failure() {
        let timed_out = ClaudebinError::ProcessingTimedOut {
            submission_id: "S1".to_string(),
            message: "Processing timed out after 2 minutes".to_string(),
        };
        let failed = ClaudebinError::ProcessingFailed {
            submission_id: "S1".to_string(),
            message: "Processing failed".to_string(),
        };
        assert_eq!(timed_out.category(), ErrorCategory::Timeout);
        assert_eq!(failed.category(), ErrorCategory::RemoteTerminal);
        assert_eq!(timed_out.submission_id(), Some("S1"));
        assert_eq!(
            ClaudebinError::from(AuthError::Expired).category(),
            ErrorCategory::RemoteTerminal
        );
        assert_eq!(
            ClaudebinError::from(AuthError::Connection("refused".into())).category(),
            ErrorCategory::Connection
        );
    }
}
