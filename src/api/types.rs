//! Wire types for the Claudebin service.
//!
//! Status-bearing responses are decoded into `Raw*` structs and then validated
//! into closed enums. Unrecognized status values become
//! [`ApiError::UnknownStatus`] instead of being treated as pending.

use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::auth::token::UserProfile;

/// Result of `auth.start`: the polling code and the sign-in URL for the user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthStart {
    pub code: String,
    pub url: String,
}

/// Status of a pending device authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPoll {
    Pending,
    Success {
        token: Option<String>,
        refresh_token: Option<String>,
        user: Option<UserProfile>,
    },
    Expired,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawAuthPoll {
    status: String,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    user: Option<UserProfile>,
}

impl TryFrom<RawAuthPoll> for AuthPoll {
    type Error = ApiError;

    fn try_from(raw: RawAuthPoll) -> Result<Self, Self::Error> {
        match raw.status.as_str() {
            "pending" => Ok(Self::Pending),
            "expired" => Ok(Self::Expired),
            "success" => Ok(Self::Success {
                token: raw.token,
                refresh_token: raw.refresh_token,
                user: raw.user,
            }),
            other => Err(ApiError::UnknownStatus(other.to_string())),
        }
    }
}

/// Outcome of `auth.refresh`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed {
        access_token: String,
        refresh_token: Option<String>,
        /// Server-declared expiry in seconds since the epoch.
        expires_at_secs: Option<i64>,
    },
    Rejected {
        error: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRefresh {
    success: bool,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    error: Option<String>,
}

impl From<RawRefresh> for RefreshOutcome {
    fn from(raw: RawRefresh) -> Self {
        match (raw.success, raw.access_token) {
            (true, Some(access_token)) => Self::Refreshed {
                access_token,
                refresh_token: raw.refresh_token,
                expires_at_secs: raw.expires_at,
            },
            (true, None) => Self::Rejected {
                error: Some("refresh response missing access token".to_string()),
            },
            (false, _) => Self::Rejected { error: raw.error },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ValidateResponse {
    pub valid: bool,
}

/// Body of `sessions.publish`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    pub conversation_data: &'a str,
    pub is_public: bool,
    pub access_token: &'a str,
}

/// Synchronous acknowledgement of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmitReceipt {
    #[serde(rename = "id")]
    pub submission_id: String,
}

/// Processing status of a submitted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionPoll {
    Processing,
    Ready { url: Option<String> },
    Failed { error: Option<String> },
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSubmissionPoll {
    status: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl TryFrom<RawSubmissionPoll> for SubmissionPoll {
    type Error = ApiError;

    fn try_from(raw: RawSubmissionPoll) -> Result<Self, Self::Error> {
        match raw.status.as_str() {
            "processing" => Ok(Self::Processing),
            "ready" => Ok(Self::Ready { url: raw.url }),
            "failed" => Ok(Self::Failed { error: raw.error }),
            other => Err(ApiError::UnknownStatus(other.to_string())),
        }
    }
}
