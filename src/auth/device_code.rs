use std::sync::Arc;
use std::time::Duration;

use crate::api::{AuthPoll, AuthStart, RemoteApi};
use crate::config::ClaudebinConfig;
use crate::util::browser;
use crate::util::poll::{PollError, PollPolicy, PollVerdict};

use super::error::AuthError;
use super::store::CredentialStore;
use super::token::{expires_after, now_millis, Credentials};

/// Device authorization against Claudebin.
///
/// `start` opens a remote session, `authorize` sends the user to the sign-in
/// URL and polls until the code is approved, expires, or the deadline passes.
/// Approved credentials are persisted before they are returned.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use claudebin::api::HttpApi;
/// use claudebin::auth::{DeviceAuthFlow, FileCredentialStore};
/// use claudebin::config::ClaudebinConfig;
///
/// # async fn example() -> Result<(), claudebin::auth::AuthError> {
/// let config = ClaudebinConfig::from_env();
/// let flow = DeviceAuthFlow::new(
///     Arc::new(HttpApi::from_config(&config)),
///     Arc::new(FileCredentialStore::new(config.credentials_dir.clone())),
///     &config,
/// );
/// let start = flow.start().await?;
/// println!("Visit: {}", start.url);
/// let credentials = flow.authorize(&start).await?;
/// # Ok(())
/// # }
/// ```
pub struct DeviceAuthFlow {
    api: Arc<dyn RemoteApi>,
    store: Arc<dyn CredentialStore>,
    policy: PollPolicy,
    auth_token_ttl: Duration,
    open_browser: bool,
}

impl DeviceAuthFlow {
    pub fn new(
        api: Arc<dyn RemoteApi>,
        store: Arc<dyn CredentialStore>,
        config: &ClaudebinConfig,
    ) -> Self {
        Self {
            api,
            store,
            policy: config.auth_poll_policy(),
            auth_token_ttl: config.auth_token_ttl,
            open_browser: config.open_browser,
        }
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }

    /// Request a new authorization session. Transport failures are final.
    pub async fn start(&self) -> Result<AuthStart, AuthError> {
        let start = self
            .api
            .start_auth()
            .await
            .map_err(|e| AuthError::Connection(e.to_string()))?;
        tracing::info!(url = %start.url, "Device authorization started");
        Ok(start)
    }

    /// Open the sign-in URL and poll until the session reaches a terminal state.
    pub async fn authorize(&self, start: &AuthStart) -> Result<Credentials, AuthError> {
        if self.open_browser {
            browser::open_url_best_effort(&start.url);
        }

        let api = &self.api;
        let code = start.code.as_str();
        let approved = self
            .policy
            .run(
                move || async move { api.poll_auth(code).await.map(Some) },
                classify_auth_poll,
            )
            .await
            .map_err(|e| match e {
                PollError::Failed(_) => AuthError::Expired,
                PollError::TimedOut(message) => AuthError::TimedOut(message),
                PollError::Rejected(message) => AuthError::InvalidResponse(message),
            })?;

        let AuthPoll::Success {
            token: Some(access_token),
            refresh_token: Some(refresh_token),
            user: Some(user),
        } = approved
        else {
            return Err(AuthError::InvalidResponse(
                "Invalid authentication response".to_string(),
            ));
        };

        let credentials = Credentials {
            access_token,
            refresh_token: Some(refresh_token),
            expires_at: expires_after(now_millis(), self.auth_token_ttl),
            user: Some(user),
        };
        self.store.save(&credentials)?;
        let user_id = credentials.user.as_ref().map_or("", |u| u.id.as_str());
        tracing::info!(user_id, "Device authorization complete");
        Ok(credentials)
    }

    /// `start` followed by `authorize`, without retrying the whole flow.
    pub async fn run(&self) -> Result<Credentials, AuthError> {
        let start = self.start().await?;
        self.authorize(&start).await
    }
}

fn classify_auth_poll(poll: &AuthPoll) -> PollVerdict {
    match poll {
        AuthPoll::Success {
            token: Some(_),
            refresh_token: Some(_),
            user: Some(_),
        } => PollVerdict::Ready,
        AuthPoll::Expired => PollVerdict::Failed(Some(AuthError::Expired.to_string())),
        AuthPoll::Success { .. } | AuthPoll::Pending => PollVerdict::Pending,
    }
}
