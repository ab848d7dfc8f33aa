//! tRPC-over-HTTP transport for the Claudebin service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::error::ApiError;
use super::types::{
    AuthPoll, AuthStart, RawAuthPoll, RawRefresh, RawSubmissionPoll, RefreshOutcome,
    SubmissionPoll, SubmitPayload, SubmitReceipt, ValidateResponse,
};
use super::RemoteApi;
use crate::config::ClaudebinConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// HTTP client for the Claudebin tRPC endpoints.
///
/// # Example
/// ```no_run
/// use claudebin::api::HttpApi;
///
/// let api = HttpApi::new("http://localhost:3000");
/// ```
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn from_config(config: &ClaudebinConfig) -> Self {
        Self::new(config.api_base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn procedure_url(&self, procedure: &str) -> String {
        format!("{}/api/trpc/{procedure}", self.base_url)
    }

    async fn query<I, T>(&self, procedure: &str, input: &I) -> Result<T, ApiError>
    where
        I: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let input = serde_json::to_string(input)?;
        let resp = self
            .client
            .get(self.procedure_url(procedure))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .query(&[("input", input.as_str())])
            .send()
            .await?;
        read_envelope(procedure, resp).await
    }

    async fn mutation<I, T>(&self, procedure: &str, input: Option<&I>) -> Result<T, ApiError>
    where
        I: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self
            .client
            .post(self.procedure_url(procedure))
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(input) = input {
            request = request.json(input);
        }
        let resp = request.send().await?;
        read_envelope(procedure, resp).await
    }
}

#[async_trait]
impl RemoteApi for HttpApi {
    async fn start_auth(&self) -> Result<AuthStart, ApiError> {
        self.mutation::<(), _>("auth.start", None).await
    }

    async fn poll_auth(&self, code: &str) -> Result<AuthPoll, ApiError> {
        let raw: RawAuthPoll = self.query("auth.poll", &json!({ "code": code })).await?;
        AuthPoll::try_from(raw)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshOutcome, ApiError> {
        let raw: RawRefresh = self
            .mutation("auth.refresh", Some(&json!({ "refresh_token": refresh_token })))
            .await?;
        Ok(RefreshOutcome::from(raw))
    }

    async fn validate(&self, token: &str) -> Result<bool, ApiError> {
        let resp: ValidateResponse = self
            .query("auth.validate", &json!({ "token": token }))
            .await?;
        Ok(resp.valid)
    }

    async fn submit(&self, payload: &SubmitPayload<'_>) -> Result<SubmitReceipt, ApiError> {
        self.mutation("sessions.publish", Some(payload)).await
    }

    async fn poll_submission(&self, submission_id: &str) -> Result<SubmissionPoll, ApiError> {
        let raw: RawSubmissionPoll = self
            .query("sessions.poll", &json!({ "id": submission_id }))
            .await?;
        SubmissionPoll::try_from(raw)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: Option<EnvelopeResult<T>>,
    error: Option<EnvelopeError>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeResult<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct EnvelopeError {
    message: Option<String>,
}

async fn read_envelope<T: DeserializeOwned>(
    procedure: &str,
    resp: reqwest::Response,
) -> Result<T, ApiError> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            }),
        });
    }

    let envelope: Envelope<T> = serde_json::from_str(&body)?;
    if let Some(result) = envelope.result {
        return Ok(result.data);
    }
    let message = envelope
        .error
        .and_then(|e| e.message)
        .unwrap_or_else(|| format!("{procedure} returned no data"));
    Err(ApiError::Decode(message))
}

fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    error
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| error.as_str())
        .map(str::to_string)
}
