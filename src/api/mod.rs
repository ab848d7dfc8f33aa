//! Claudebin service contract and its HTTP implementation.

pub mod error;
pub mod http;
pub mod types;

use async_trait::async_trait;

pub use error::ApiError;
pub use http::HttpApi;
pub use types::{AuthPoll, AuthStart, RefreshOutcome, SubmissionPoll, SubmitPayload, SubmitReceipt};

/// Remote operations used by the auth and publication flows.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn start_auth(&self) -> Result<AuthStart, ApiError>;
    async fn poll_auth(&self, code: &str) -> Result<AuthPoll, ApiError>;
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshOutcome, ApiError>;
    async fn validate(&self, token: &str) -> Result<bool, ApiError>;
    async fn submit(&self, payload: &SubmitPayload<'_>) -> Result<SubmitReceipt, ApiError>;
    async fn poll_submission(&self, submission_id: &str) -> Result<SubmissionPoll, ApiError>;
}
