use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::api::{HttpApi, RefreshOutcome, RemoteApi};
use crate::config::ClaudebinConfig;

use super::device_code::DeviceAuthFlow;
use super::error::AuthError;
use super::store::{CredentialStore, FileCredentialStore};
use super::token::{expires_after, expiry_from_secs, now_millis, Credentials, UserProfile};

/// Snapshot of the local credential cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    LoggedOut,
    LoggedIn {
        user: Option<UserProfile>,
        expires_at: Option<DateTime<Utc>>,
        /// False when the token is inside the refresh window or has no expiry.
        fresh: bool,
    },
}

/// Token lifecycle manager.
///
/// Resolution order for [`AuthService::get_token`]:
/// 1. the cached token, refreshed first if it is inside the refresh window
/// 2. a server-side validation of that token
/// 3. one refresh attempt if validation rejected a token that was not just refreshed
/// 4. a full device authorization
///
/// Refresh failures never surface as errors; they fall through to the next step.
///
/// # Example
/// ```no_run
/// use claudebin::auth::AuthService;
/// use claudebin::config::ClaudebinConfig;
///
/// # async fn example() -> Result<(), claudebin::auth::AuthError> {
/// let auth = AuthService::from_config(&ClaudebinConfig::from_env());
/// let token = auth.get_token().await?;
/// # Ok(())
/// # }
/// ```
pub struct AuthService {
    api: Arc<dyn RemoteApi>,
    store: Arc<dyn CredentialStore>,
    flow: DeviceAuthFlow,
    refresh_buffer: chrono::Duration,
    default_token_ttl: Duration,
}

impl AuthService {
    pub fn new(
        api: Arc<dyn RemoteApi>,
        store: Arc<dyn CredentialStore>,
        config: &ClaudebinConfig,
    ) -> Self {
        let flow = DeviceAuthFlow::new(api.clone(), store.clone(), config);
        Self {
            api,
            store,
            flow,
            refresh_buffer: chrono::Duration::from_std(config.refresh_buffer)
                .unwrap_or_else(|_| chrono::Duration::minutes(5)),
            default_token_ttl: config.default_token_ttl,
        }
    }

    /// Service backed by [`HttpApi`] and [`FileCredentialStore`].
    pub fn from_config(config: &ClaudebinConfig) -> Self {
        Self::new(
            Arc::new(HttpApi::from_config(config)),
            Arc::new(FileCredentialStore::new(config.credentials_dir.clone())),
            config,
        )
    }

    pub fn with_device_flow(mut self, flow: DeviceAuthFlow) -> Self {
        self.flow = flow;
        self
    }

    pub fn device_flow(&self) -> &DeviceAuthFlow {
        &self.flow
    }

    /// Cached token if locally fresh, otherwise a refreshed one.
    ///
    /// Returns `None` when nothing is cached or the refresh did not succeed.
    pub async fn get_valid_token(&self) -> Result<Option<String>, AuthError> {
        Ok(self
            .usable_credentials()
            .await?
            .map(|credentials| credentials.access_token))
    }

    /// A token confirmed by the service, running device authorization if needed.
    ///
    /// An unreadable credentials file is treated as empty; the new login
    /// overwrites it.
    pub async fn get_token(&self) -> Result<String, AuthError> {
        let cached = self.store.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring unreadable credentials");
            None
        });
        if let Some(current) = cached {
            let refreshed = current.needs_refresh(self.refresh_buffer);
            let candidate = if refreshed {
                self.refresh_credentials(&current).await
            } else {
                Some(current.clone())
            };

            if let Some(candidate) = candidate {
                if self.validate(&candidate.access_token).await {
                    return Ok(candidate.access_token);
                }
                tracing::info!("Cached token rejected by server");
                if !refreshed {
                    if let Some(renewed) = self.refresh_credentials(&current).await {
                        return Ok(renewed.access_token);
                    }
                }
            }
        }

        tracing::info!("Starting device authorization");
        let credentials = self.flow.run().await?;
        Ok(credentials.access_token)
    }

    /// Refresh the stored credentials now. Returns whether a new token was saved.
    pub async fn refresh(&self) -> Result<bool, AuthError> {
        let Some(current) = self.store.load()? else {
            return Ok(false);
        };
        Ok(self.refresh_credentials(&current).await.is_some())
    }

    /// Ask the service whether `token` is still accepted.
    ///
    /// Transport errors count as "not valid".
    pub async fn validate(&self, token: &str) -> bool {
        match self.api.validate(token).await {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!(error = %e, "Token validation failed");
                false
            }
        }
    }

    /// Force a fresh device authorization.
    pub async fn login(&self) -> Result<Credentials, AuthError> {
        self.flow.run().await
    }

    /// Local view of the cached credentials; makes no network calls.
    pub fn status(&self) -> Result<AuthStatus, AuthError> {
        Ok(match self.store.load()? {
            None => AuthStatus::LoggedOut,
            Some(credentials) => AuthStatus::LoggedIn {
                fresh: !credentials.needs_refresh(self.refresh_buffer),
                user: credentials.user,
                expires_at: credentials.expires_at,
            },
        })
    }

    /// Remove stored credentials.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.clear()
    }

    async fn usable_credentials(&self) -> Result<Option<Credentials>, AuthError> {
        let Some(current) = self.store.load()? else {
            return Ok(None);
        };
        if !current.needs_refresh(self.refresh_buffer) {
            return Ok(Some(current));
        }
        Ok(self.refresh_credentials(&current).await)
    }

    /// Exchange the stored refresh token and persist the result.
    ///
    /// Leaves the store untouched unless a complete new record was obtained.
    async fn refresh_credentials(&self, current: &Credentials) -> Option<Credentials> {
        let Some(refresh_token) = current.refresh_token.as_deref() else {
            tracing::debug!("No refresh token stored");
            return None;
        };

        let (access_token, rotated, expires_at_secs) = match self.api.refresh(refresh_token).await
        {
            Ok(RefreshOutcome::Refreshed {
                access_token,
                refresh_token,
                expires_at_secs,
            }) => (access_token, refresh_token, expires_at_secs),
            Ok(RefreshOutcome::Rejected { error }) => {
                let reason = error.as_deref().unwrap_or("unknown");
                tracing::warn!(reason, "Token refresh rejected");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed");
                return None;
            }
        };

        let expires_at = match expires_at_secs {
            Some(secs) => expiry_from_secs(secs),
            None => expires_after(now_millis(), self.default_token_ttl),
        };
        let renewed = Credentials {
            access_token,
            refresh_token: rotated.or_else(|| current.refresh_token.clone()),
            expires_at,
            user: current.user.clone(),
        };

        if let Err(e) = self.store.save(&renewed) {
            tracing::warn!(error = %e, "Could not persist refreshed token");
            return None;
        }
        tracing::debug!("Token refreshed");
        Some(renewed)
    }
}
