use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Identity of the signed-in Claudebin user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Cached Claudebin credentials.
///
/// `expires_at` is stored as milliseconds since the epoch. A record without
/// an expiry is always considered stale.
///
/// # Example
/// ```no_run
/// use claudebin::auth::Credentials;
/// use chrono::{Duration, Utc};
///
/// let creds = Credentials {
///     access_token: "access".to_string(),
///     refresh_token: Some("refresh".to_string()),
///     expires_at: Some(Utc::now() + Duration::days(30)),
///     user: None,
/// };
/// assert!(!creds.needs_refresh(Duration::minutes(5)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

impl Credentials {
    /// True when the token is missing an expiry or expires within `buffer`.
    pub fn needs_refresh(&self, buffer: Duration) -> bool {
        self.needs_refresh_at(now_millis(), buffer)
    }

    pub fn needs_refresh_at(&self, now: DateTime<Utc>, buffer: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => now > expires_at - buffer,
            None => true,
        }
    }
}

/// Current time truncated to the millisecond precision used on disk.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// `now + ttl`, or `None` when the sum is not representable.
pub fn expires_after(now: DateTime<Utc>, ttl: std::time::Duration) -> Option<DateTime<Utc>> {
    Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
}

/// Convert a server-declared expiry in epoch seconds.
pub fn expiry_from_secs(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(secs, 0)
}
