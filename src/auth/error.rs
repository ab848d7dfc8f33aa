use thiserror::Error;

/// Authentication failures surfaced to callers.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Not authenticated. Run `claudebin auth login` first.")]
    NotLoggedIn,
    #[error("Failed to connect to Claudebin: {0}")]
    Connection(String),
    #[error("Authentication code expired")]
    Expired,
    #[error("{0}")]
    TimedOut(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::de::Error> for AuthError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for AuthError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}
