//! Session publication: upload, then wait for server-side processing.

use std::sync::Arc;

use bon::Builder;
use strum::{Display, EnumString};

use crate::api::{RemoteApi, SubmissionPoll, SubmitPayload};
use crate::auth::{AuthError, AuthService};
use crate::config::ClaudebinConfig;
use crate::error::{ClaudebinError, Result};
use crate::util::browser;
use crate::util::poll::{PollError, PollPolicy, PollVerdict};

/// Fallback message when a failed submission carries no reason.
pub const PROCESSING_FAILED_MESSAGE: &str = "Processing failed";

/// Whether a published session appears in public listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Visibility {
    /// Listed publicly.
    #[default]
    Public,
    /// Reachable only through its link.
    Unlisted,
}

impl Visibility {
    pub fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }
}

/// A session transcript to publish.
///
/// # Example
/// ```
/// use claudebin::publish::{PublishRequest, Visibility};
///
/// let request = PublishRequest::builder()
///     .payload("{\"type\":\"user\"}\n".to_string())
///     .title("Fixing the flaky test".to_string())
///     .visibility(Visibility::Unlisted)
///     .build();
/// assert_eq!(request.size_bytes(), 16);
/// ```
#[derive(Debug, Clone, Builder)]
pub struct PublishRequest {
    pub payload: String,
    pub title: Option<String>,
    #[builder(default)]
    pub visibility: Visibility,
}

impl PublishRequest {
    /// Size of the payload as UTF-8 bytes on the wire.
    pub fn size_bytes(&self) -> usize {
        self.payload.len()
    }
}

/// A processed submission and its shareable link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub submission_id: String,
    pub url: String,
}

/// Uploads sessions and waits for the service to finish processing them.
///
/// Failures after submission keep the submission id so callers can follow up
/// on a job that may still be running.
pub struct PublishFlow {
    api: Arc<dyn RemoteApi>,
    policy: PollPolicy,
    max_payload_bytes: usize,
    open_browser: bool,
}

impl PublishFlow {
    pub fn new(api: Arc<dyn RemoteApi>, config: &ClaudebinConfig) -> Self {
        Self {
            api,
            policy: config.processing_poll_policy(),
            max_payload_bytes: config.max_payload_bytes,
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

    /// Reject payloads over the size cap without contacting the service.
    pub fn check_size(&self, request: &PublishRequest) -> Result<()> {
        let size_bytes = request.size_bytes();
        if size_bytes > self.max_payload_bytes {
            return Err(ClaudebinError::PayloadTooLarge {
                size_bytes,
                limit_bytes: self.max_payload_bytes,
            });
        }
        Ok(())
    }

    /// Size-check, obtain a token from `auth` (authorizing if needed), publish.
    pub async fn share(&self, auth: &AuthService, request: &PublishRequest) -> Result<Publication> {
        self.check_size(request)?;
        let token = auth.get_token().await?;
        self.publish(&token, request).await
    }

    /// Publish with the cached (or refreshed) token only; never starts a login.
    ///
    /// Fails with [`AuthError::NotLoggedIn`] when no usable token is stored.
    pub async fn publish_cached(
        &self,
        auth: &AuthService,
        request: &PublishRequest,
    ) -> Result<Publication> {
        self.check_size(request)?;
        let token = auth
            .get_valid_token()
            .await?
            .ok_or(AuthError::NotLoggedIn)?;
        self.publish(&token, request).await
    }

    /// Submit `request` with `access_token` and wait for the shareable URL.
    pub async fn publish(&self, access_token: &str, request: &PublishRequest) -> Result<Publication> {
        self.check_size(request)?;

        let receipt = self
            .api
            .submit(&SubmitPayload {
                title: request.title.as_deref(),
                conversation_data: &request.payload,
                is_public: request.visibility.is_public(),
                access_token,
            })
            .await?;
        tracing::info!(submission_id = %receipt.submission_id, "Session submitted");

        let url = self.wait_for_processing(&receipt.submission_id).await?;
        if self.open_browser {
            browser::open_url_best_effort(&url);
        }
        Ok(Publication {
            submission_id: receipt.submission_id,
            url,
        })
    }

    /// Poll the submission until it is ready, failed, or the deadline passes.
    pub async fn wait_for_processing(&self, submission_id: &str) -> Result<String> {
        let api = &self.api;
        let ready = self
            .policy
            .run(
                move || async move { api.poll_submission(submission_id).await.map(Some) },
                classify_submission_poll,
            )
            .await
            .map_err(|e| match e {
                PollError::Failed(message) | PollError::Rejected(message) => {
                    ClaudebinError::ProcessingFailed {
                        submission_id: submission_id.to_string(),
                        message,
                    }
                }
                PollError::TimedOut(message) => ClaudebinError::ProcessingTimedOut {
                    submission_id: submission_id.to_string(),
                    message,
                },
            })?;

        match ready {
            SubmissionPoll::Ready { url: Some(url) } => Ok(url),
            _ => Err(ClaudebinError::ProcessingFailed {
                submission_id: submission_id.to_string(),
                message: "Invalid session response".to_string(),
            }),
        }
    }
}

fn classify_submission_poll(poll: &SubmissionPoll) -> PollVerdict {
    match poll {
        SubmissionPoll::Ready { url: Some(_) } => PollVerdict::Ready,
        SubmissionPoll::Failed { error } => PollVerdict::Failed(Some(
            error
                .clone()
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| PROCESSING_FAILED_MESSAGE.to_string()),
        )),
        SubmissionPoll::Ready { url: None } | SubmissionPoll::Processing => PollVerdict::Pending,
    }
}
