//! Deadline-bounded polling for pending remote operations.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

/// Message used when a failure verdict carries no reason of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Polling failed";

/// Errors a probe may return while polling.
///
/// Transient errors are absorbed into the retry loop. Anything else ends the
/// poll with [`PollError::Rejected`].
pub trait ProbeError: Display {
    fn is_transient(&self) -> bool;
}

/// How a single probe result should steer the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollVerdict {
    /// Terminal success: return the result now.
    Ready,
    /// Terminal failure, optionally with a server-supplied reason.
    Failed(Option<String>),
    /// No informative answer yet; wait and probe again.
    Pending,
}

/// Terminal outcome of a poll that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    /// The remote side reported a terminal failure state.
    #[error("{0}")]
    Failed(String),
    /// The probe returned a non-transient error (e.g. a malformed status).
    #[error("{0}")]
    Rejected(String),
    /// The deadline passed without a terminal state.
    #[error("{0}")]
    TimedOut(String),
}

/// Fixed-interval polling policy with a wall-clock deadline.
///
/// Each cycle checks the deadline, probes, then sleeps only when the probe
/// gave no terminal answer.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
    pub timeout_message: String,
}

impl PollPolicy {
    pub fn new(interval: Duration, timeout: Duration, timeout_message: impl Into<String>) -> Self {
        Self {
            interval,
            timeout,
            timeout_message: timeout_message.into(),
        }
    }

    /// Drive `probe` until `classify` reports a terminal verdict or the
    /// deadline elapses.
    ///
    /// `Ok(None)` from the probe and transient probe errors count as pending.
    pub async fn run<T, E, F, Fut, C>(&self, mut probe: F, mut classify: C) -> Result<T, PollError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
        E: ProbeError,
        C: FnMut(&T) -> PollVerdict,
    {
        // `None` when the timeout is too large to represent: poll without a deadline.
        let deadline = Instant::now().checked_add(self.timeout);
        let mut attempt: u32 = 0;

        loop {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                tracing::debug!(attempts = attempt, "Poll deadline reached");
                return Err(PollError::TimedOut(self.timeout_message.clone()));
            }
            attempt += 1;

            match probe().await {
                Ok(Some(result)) => match classify(&result) {
                    PollVerdict::Ready => return Ok(result),
                    PollVerdict::Failed(message) => {
                        return Err(PollError::Failed(
                            message.unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
                        ));
                    }
                    PollVerdict::Pending => {
                        tracing::debug!(attempt, "Poll pending");
                    }
                },
                Ok(None) => {
                    tracing::debug!(attempt, "Poll returned no data");
                }
                Err(e) if e.is_transient() => {
                    tracing::debug!(attempt, error = %e, "Ignoring transient poll error");
                }
                Err(e) => return Err(PollError::Rejected(e.to_string())),
            }

            tokio::time::sleep(self.interval).await;
        }
    }
}
