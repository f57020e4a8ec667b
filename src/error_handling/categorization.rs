//! Error categorization and retry strategy.
//!
//! This module classifies outbound HTTP failures into recoverable
//! `SourceFailure`s and configures the retry strategy for timed-out lookups.

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::SourceFailure;

/// Creates the exponential backoff schedule for timed-out lookups.
///
/// Returns a strategy configured with:
/// - First delay: `RETRY_BACKOFF_BASE * RETRY_BACKOFF_FACTOR_MS` (2s)
/// - Each following delay doubles (4s)
/// - Maximum attempts: `RETRY_MAX_ATTEMPTS` retries after the first call
///
/// The iterator only yields delays; the caller decides how to wait on them so
/// the wait can honor the request deadline and cancellation.
pub fn get_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(crate::config::RETRY_BACKOFF_BASE)
        .factor(crate::config::RETRY_BACKOFF_FACTOR_MS)
        .take(crate::config::RETRY_MAX_ATTEMPTS)
}

/// Categorizes a transport-level `reqwest::Error`.
///
/// Returns `None` for errors that are neither timeouts nor connection
/// failures; callers treat those as "no data" without a warning.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> Option<SourceFailure> {
    if error.is_timeout() {
        return Some(SourceFailure::Timeout);
    }
    if error.is_connect() {
        return Some(SourceFailure::Connection(error.to_string()));
    }
    if let Some(status) = error.status() {
        return categorize_status(status, &HeaderMap::new());
    }
    None
}

/// Categorizes a non-success HTTP status.
///
/// 429 becomes `RateLimited` (with `Retry-After` seconds when present) and 503
/// becomes `Connection`. Any other status returns `None`.
pub fn categorize_status(status: StatusCode, headers: &HeaderMap) -> Option<SourceFailure> {
    match status {
        StatusCode::TOO_MANY_REQUESTS => Some(SourceFailure::RateLimited {
            retry_after_secs: headers
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok()),
        }),
        StatusCode::SERVICE_UNAVAILABLE => Some(SourceFailure::Connection(format!(
            "HTTP {}",
            status.as_u16()
        ))),
        _ => None,
    }
}
