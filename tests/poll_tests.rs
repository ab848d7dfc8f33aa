//! Timing and short-circuit behavior of the poller.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use claudebin::api::ApiError;
use claudebin::util::poll::{PollError, PollPolicy, PollVerdict};
use tokio::time::Instant;

const INTERVAL: Duration = Duration::from_secs(2);

fn policy(timeout: Duration) -> PollPolicy {
    PollPolicy::new(INTERVAL, timeout, "Timed out")
}

#[derive(Debug, PartialEq)]
enum Status {
    Pending,
    Done,
    Failed,
}

fn classify(status: &Status) -> PollVerdict {
    match status {
        Status::Done => PollVerdict::Ready,
        Status::Failed => PollVerdict::Failed(Some("boom".to_string())),
        Status::Pending => PollVerdict::Pending,
    }
}

#[tokio::test(start_paused = true)]
async fn success_on_nth_probe_waits_n_minus_one_intervals() {
    for n in 1..=5usize {
        let calls = AtomicUsize::new(0);
        let started = Instant::now();

        let result = policy(Duration::from_secs(60))
            .run(
                || {
                    let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    async move {
                        Ok::<_, ApiError>(if call == n { Some(Status::Done) } else { None })
                    }
                },
                classify,
            )
            .await;

        assert_eq!(result, Ok(Status::Done));
        assert_eq!(calls.load(Ordering::SeqCst), n);
        let expected = INTERVAL * (n as u32 - 1);
        let elapsed = started.elapsed();
        assert!(elapsed >= expected && elapsed < expected + INTERVAL, "{n}: {elapsed:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn failure_short_circuits_without_waiting() {
    let calls = AtomicUsize::new(0);
    let started = Instant::now();

    let result = policy(Duration::from_secs(60))
        .run(
            || {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    Ok::<_, ApiError>(Some(if call == 0 { Status::Pending } else { Status::Failed }))
                }
            },
            classify,
        )
        .await;

    assert_eq!(result, Err(PollError::Failed("boom".to_string())));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(started.elapsed() < INTERVAL * 2);
}

#[tokio::test(start_paused = true)]
async fn transient_errors_are_absorbed_until_success() {
    let calls = AtomicUsize::new(0);

    let result = policy(Duration::from_secs(60))
        .run(
            || {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    match call {
                        0 => Err(ApiError::Network("connection reset".to_string())),
                        1 => Err(ApiError::Status {
                            status: 502,
                            message: "Bad Gateway".to_string(),
                        }),
                        _ => Ok(Some(Status::Done)),
                    }
                }
            },
            classify,
        )
        .await;

    assert_eq!(result, Ok(Status::Done));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn unknown_status_is_rejected_not_retried() {
    let calls = AtomicUsize::new(0);

    let result: Result<Status, _> = policy(Duration::from_secs(60))
        .run(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ApiError::UnknownStatus("approved".to_string())) }
            },
            classify,
        )
        .await;

    assert!(matches!(result, Err(PollError::Rejected(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn deadline_is_wall_clock_bounded() {
    let calls = AtomicUsize::new(0);
    let started = Instant::now();

    let result = policy(Duration::from_secs(7))
        .run(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, ApiError>(Some(Status::Pending)) }
            },
            classify,
        )
        .await;

    assert_eq!(result, Err(PollError::TimedOut("Timed out".to_string())));
    // Probes at 0s, 2s, 4s, 6s; the check at 8s is past the deadline.
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert!(started.elapsed() >= Duration::from_secs(7));
}
