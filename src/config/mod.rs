//! Client configuration (explicit values, optionally seeded from env).

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::auth::store::default_claudebin_dir;
use crate::error::{ClaudebinError, Result};
use crate::util::poll::PollPolicy;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const AUTH_POLL_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const PROCESSING_POLL_TIMEOUT: Duration = Duration::from_secs(2 * 60);
pub const TOKEN_REFRESH_BUFFER: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);
pub const AUTH_TOKEN_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);
pub const MAX_PAYLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Settings shared by the auth and publication flows.
#[derive(Debug, Clone)]
pub struct ClaudebinConfig {
    pub api_base_url: String,
    pub credentials_dir: PathBuf,
    pub poll_interval: Duration,
    pub auth_timeout: Duration,
    pub processing_timeout: Duration,
    /// Lookahead before expiry during which a cached token is renewed.
    pub refresh_buffer: Duration,
    /// Lifetime assumed for refreshed tokens without a server-declared expiry.
    pub default_token_ttl: Duration,
    /// Lifetime granted locally to credentials from a fresh device login.
    pub auth_token_ttl: Duration,
    pub max_payload_bytes: usize,
    pub open_browser: bool,
}

impl Default for ClaudebinConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            credentials_dir: default_claudebin_dir(),
            poll_interval: POLL_INTERVAL,
            auth_timeout: AUTH_POLL_TIMEOUT,
            processing_timeout: PROCESSING_POLL_TIMEOUT,
            refresh_buffer: TOKEN_REFRESH_BUFFER,
            default_token_ttl: DEFAULT_TOKEN_TTL,
            auth_token_ttl: AUTH_TOKEN_TTL,
            max_payload_bytes: MAX_PAYLOAD_BYTES,
            open_browser: true,
        }
    }
}

impl ClaudebinConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `CLAUDEBIN_API_URL` and `CLAUDEBIN_HOME`.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = Self::new();
        if let Some(url) = non_empty_env("CLAUDEBIN_API_URL") {
            config.api_base_url = url;
        }
        if let Some(home) = non_empty_env("CLAUDEBIN_HOME") {
            config.credentials_dir = PathBuf::from(home);
        }
        config
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_credentials_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.credentials_dir = dir.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_auth_timeout(mut self, timeout: Duration) -> Self {
        self.auth_timeout = timeout;
        self
    }

    pub fn with_processing_timeout(mut self, timeout: Duration) -> Self {
        self.processing_timeout = timeout;
        self
    }

    pub fn with_open_browser(mut self, open: bool) -> Self {
        self.open_browser = open;
        self
    }

    /// Reject settings no request could succeed with.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api_base_url).map_err(|e| {
            ClaudebinError::Configuration(format!(
                "invalid API base URL {:?}: {e}",
                self.api_base_url
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
            return Err(ClaudebinError::Configuration(format!(
                "API base URL must be an http(s) address, got {:?}",
                self.api_base_url
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(ClaudebinError::Configuration(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn auth_poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            self.poll_interval,
            self.auth_timeout,
            format!(
                "Authentication timed out after {}",
                describe_duration(self.auth_timeout)
            ),
        )
    }

    pub fn processing_poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            self.poll_interval,
            self.processing_timeout,
            format!(
                "Processing timed out after {}",
                describe_duration(self.processing_timeout)
            ),
        )
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn describe_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    match (secs / 60, secs % 60) {
        (1, 0) => "1 minute".to_string(),
        (m, 0) if m > 0 => format!("{m} minutes"),
        _ => format!("{secs} seconds"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_limits() {
        let config = ClaudebinConfig::new();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.max_payload_bytes, 52_428_800);
        assert!(config.open_browser);
    }

    #[test]
    fn validate_rejects_unusable_base_urls() {
        assert!(ClaudebinConfig::new().validate().is_ok());
        for url in ["not a url", "ftp://claudebin.com", "localhost:3000"] {
            let err = ClaudebinConfig::new()
                .with_api_base_url(url)
                .validate()
                .unwrap_err();
            assert!(matches!(err, ClaudebinError::Configuration(_)), "{url}");
            assert_eq!(err.category(), crate::error::ErrorCategory::Configuration);
        }
        assert!(ClaudebinConfig::new()
            .with_poll_interval(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn poll_policies_carry_readable_timeout_messages() {
        let config = ClaudebinConfig::new();
        assert_eq!(
            config.processing_poll_policy().timeout_message,
            "Processing timed out after 2 minutes"
        );
        assert_eq!(
            config.auth_poll_policy().timeout_message,
            "Authentication timed out after 5 minutes"
        );
        let short = config.with_auth_timeout(Duration::from_secs(45));
        assert_eq!(
            short.auth_poll_policy().timeout_message,
            "Authentication timed out after 45 seconds"
        );
    }
}
