//! Per-request time budget.
//!
//! A `RequestBudget` pairs the request deadline with a cancellation token that
//! fires on server shutdown. Backoff waits race both, so no retry ever sleeps
//! past the deadline or outlives the server.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Result of a budget-aware wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The full delay elapsed; the caller may retry.
    Elapsed,
    /// The delay would end after the deadline, so it was not started.
    DeadlineExceeded,
    /// The token was cancelled before or during the wait.
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct RequestBudget {
    deadline: Instant,
    cancel: CancellationToken,
}

impl RequestBudget {
    /// Starts a budget of `timeout` from now.
    pub fn new(timeout: Duration, cancel: CancellationToken) -> Self {
        Self {
            deadline: Instant::now() + timeout,
            cancel,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left before the deadline (zero once it has passed).
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Waits `delay` unless that would pass the deadline or the token fires.
    pub async fn wait(&self, delay: Duration) -> WaitOutcome {
        if self.cancel.is_cancelled() {
            return WaitOutcome::Cancelled;
        }
        if Instant::now() + delay > self.deadline {
            return WaitOutcome::DeadlineExceeded;
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => WaitOutcome::Cancelled,
            _ = tokio::time::sleep(delay) => WaitOutcome::Elapsed,
        }
    }
}
