#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use claudebin::api::{
    ApiError, AuthPoll, AuthStart, RefreshOutcome, RemoteApi, SubmissionPoll, SubmitPayload,
    SubmitReceipt,
};
use claudebin::auth::{AuthError, CredentialStore, Credentials, UserProfile};
use claudebin::config::ClaudebinConfig;

#[derive(Default)]
pub struct InMemoryCredentialStore {
    record: Mutex<Option<Credentials>>,
    saves: AtomicUsize,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(credentials: Credentials) -> Self {
        let store = Self::new();
        *store.record.lock().expect("store lock poisoned") = Some(credentials);
        store
    }

    pub fn get(&self) -> Option<Credentials> {
        self.record.lock().expect("store lock poisoned").clone()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn load(&self) -> Result<Option<Credentials>, AuthError> {
        Ok(self.get())
    }

    fn save(&self, credentials: &Credentials) -> Result<(), AuthError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.record.lock().expect("store lock poisoned") = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        *self.record.lock().expect("store lock poisoned") = None;
        Ok(())
    }
}

/// `RemoteApi` that replays queued responses and counts calls.
///
/// Empty queues fall back to: a fixed auth start, `pending` auth polls,
/// rejected refreshes, valid tokens, receipt `S1`, and `processing` polls.
#[derive(Default)]
pub struct ScriptedApi {
    auth_polls: Mutex<VecDeque<Result<AuthPoll, ApiError>>>,
    refreshes: Mutex<VecDeque<Result<RefreshOutcome, ApiError>>>,
    validations: Mutex<VecDeque<Result<bool, ApiError>>>,
    submission_polls: Mutex<VecDeque<Result<SubmissionPoll, ApiError>>>,
    submitted: Mutex<Vec<(Option<String>, bool, String)>>,
    pub start_calls: AtomicUsize,
    pub auth_poll_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub validate_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
    pub submission_poll_calls: AtomicUsize,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auth_polls(self, polls: Vec<Result<AuthPoll, ApiError>>) -> Self {
        self.auth_polls.lock().unwrap().extend(polls);
        self
    }

    pub fn with_refreshes(self, refreshes: Vec<Result<RefreshOutcome, ApiError>>) -> Self {
        self.refreshes.lock().unwrap().extend(refreshes);
        self
    }

    pub fn with_validations(self, validations: Vec<Result<bool, ApiError>>) -> Self {
        self.validations.lock().unwrap().extend(validations);
        self
    }

    pub fn with_submission_polls(self, polls: Vec<Result<SubmissionPoll, ApiError>>) -> Self {
        self.submission_polls.lock().unwrap().extend(polls);
        self
    }

    /// `(title, is_public, access_token)` for each submit call.
    pub fn submitted(&self) -> Vec<(Option<String>, bool, String)> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn network_calls(&self) -> usize {
        [
            &self.start_calls,
            &self.auth_poll_calls,
            &self.refresh_calls,
            &self.validate_calls,
            &self.submit_calls,
            &self.submission_poll_calls,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }
}

#[async_trait]
impl RemoteApi for ScriptedApi {
    async fn start_auth(&self) -> Result<AuthStart, ApiError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        Ok(AuthStart {
            code: "ABC".to_string(),
            url: "https://x/y".to_string(),
        })
    }

    async fn poll_auth(&self, code: &str) -> Result<AuthPoll, ApiError> {
        assert_eq!(code, "ABC");
        self.auth_poll_calls.fetch_add(1, Ordering::SeqCst);
        self.auth_polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(AuthPoll::Pending))
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<RefreshOutcome, ApiError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.refreshes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(RefreshOutcome::Rejected { error: None }))
    }

    async fn validate(&self, _token: &str) -> Result<bool, ApiError> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        self.validations.lock().unwrap().pop_front().unwrap_or(Ok(true))
    }

    async fn submit(&self, payload: &SubmitPayload<'_>) -> Result<SubmitReceipt, ApiError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().unwrap().push((
            payload.title.map(str::to_string),
            payload.is_public,
            payload.access_token.to_string(),
        ));
        Ok(SubmitReceipt {
            submission_id: "S1".to_string(),
        })
    }

    async fn poll_submission(&self, submission_id: &str) -> Result<SubmissionPoll, ApiError> {
        assert_eq!(submission_id, "S1");
        self.submission_poll_calls.fetch_add(1, Ordering::SeqCst);
        self.submission_polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(SubmissionPoll::Processing))
    }
}

/// Defaults with the browser disabled.
pub fn test_config() -> ClaudebinConfig {
    ClaudebinConfig::new().with_open_browser(false)
}

pub fn user() -> UserProfile {
    UserProfile {
        id: "u1".to_string(),
        name: Some("Ada".to_string()),
        email: Some("ada@example.com".to_string()),
        avatar_url: None,
    }
}

pub fn credentials(access_token: &str, expires_at: Option<DateTime<Utc>>) -> Credentials {
    Credentials {
        access_token: access_token.to_string(),
        refresh_token: Some("r0".to_string()),
        expires_at,
        user: Some(user()),
    }
}

pub fn auth_success() -> AuthPoll {
    AuthPoll::Success {
        token: Some("t1".to_string()),
        refresh_token: Some("r1".to_string()),
        user: Some(user()),
    }
}

pub fn in_future(duration: Duration) -> DateTime<Utc> {
    claudebin::auth::now_millis() + chrono::Duration::from_std(duration).unwrap()
}
