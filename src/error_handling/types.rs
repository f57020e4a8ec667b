//! Error type definitions.
//!
//! This module defines the fatal analysis error, the recoverable source
//! failures that degrade a report into warnings, and start-up errors.

use axum::http::StatusCode;
use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::{Display as DisplayMacro, EnumIter as EnumIterMacro, IntoStaticStr};
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Kinds of failures that abort an analysis (or, for the vulnerability and
/// ownership kinds, that a collaborator can report).
///
/// The string form is the wire `code` of an error response.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro, IntoStaticStr, DisplayMacro,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    // Input
    InvalidInput,
    AsnInvalidIp,
    // Scanner
    ScannerNotFound,
    ScannerTimeout,
    ScannerPermissionDenied,
    ScannerExecutionError,
    // Vulnerability database
    VulnRateLimit,
    VulnTimeout,
    VulnConnectionError,
    // Network ownership
    AsnRateLimit,
    AsnServiceUnavailable,
    // Pipeline
    RequestTimeout,
    InternalError,
}

impl ErrorKind {
    /// Wire code, e.g. `SCANNER_TIMEOUT`.
    pub fn code(&self) -> &'static str {
        self.into()
    }

    /// Short error title used in the `error` field of a response body.
    pub fn title(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput | ErrorKind::AsnInvalidIp => "Invalid input",
            ErrorKind::ScannerNotFound
            | ErrorKind::ScannerTimeout
            | ErrorKind::ScannerPermissionDenied
            | ErrorKind::ScannerExecutionError => "Scan failed",
            ErrorKind::VulnRateLimit | ErrorKind::AsnRateLimit => "Rate limit exceeded",
            ErrorKind::VulnTimeout | ErrorKind::RequestTimeout => "Timeout",
            ErrorKind::VulnConnectionError | ErrorKind::AsnServiceUnavailable => {
                "Service unavailable"
            }
            ErrorKind::InternalError => "Internal error",
        }
    }

    /// Maps the kind to the HTTP status of the error response.
    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorKind::InvalidInput | ErrorKind::AsnInvalidIp => StatusCode::BAD_REQUEST,
            ErrorKind::VulnRateLimit | ErrorKind::AsnRateLimit => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::ScannerTimeout | ErrorKind::VulnTimeout | ErrorKind::RequestTimeout => {
                StatusCode::GATEWAY_TIMEOUT
            }
            ErrorKind::VulnConnectionError | ErrorKind::AsnServiceUnavailable => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ErrorKind::ScannerPermissionDenied => StatusCode::FORBIDDEN,
            ErrorKind::ScannerNotFound
            | ErrorKind::ScannerExecutionError
            | ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A fatal analysis failure.
///
/// Carries a user-facing message, a technical detail for logs, and a suggested
/// action for the caller. Aborts the request; no partial report is produced.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}: {user_message} ({technical_detail})")]
pub struct AnalysisError {
    pub kind: ErrorKind,
    pub user_message: String,
    pub technical_detail: String,
    pub suggested_action: String,
}

impl AnalysisError {
    pub fn new(
        kind: ErrorKind,
        user_message: impl Into<String>,
        technical_detail: impl Into<String>,
        suggested_action: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            user_message: user_message.into(),
            technical_detail: technical_detail.into(),
            suggested_action: suggested_action.into(),
        }
    }

    /// Malformed query or unresolvable target.
    pub fn invalid_input(user_message: impl Into<String>, technical_detail: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::InvalidInput,
            user_message,
            technical_detail,
            "Check the query format and the declared target type",
        )
    }

    /// Request deadline expired while a critical stage was still running.
    pub fn request_timeout(stage: &str, technical_detail: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::RequestTimeout,
            format!("The analysis did not finish in time ({})", stage),
            technical_detail,
            "Retry later or analyze a target with fewer exposed services",
        )
    }

    pub fn internal(technical_detail: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::InternalError,
            "An unexpected error occurred during the analysis",
            technical_detail,
            "Retry the request; contact the operator if it keeps failing",
        )
    }
}

/// A recoverable failure of a non-critical source.
///
/// Never aborts a request; it becomes a warning on the report and the source
/// contributes no data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceFailure {
    /// The source did not answer in time (after any retries).
    #[error("timed out")]
    Timeout,

    /// The source rejected the call with HTTP 429.
    #[error("rate limited (retry after {})", .retry_after_secs.map(|s| format!("{}s", s)).unwrap_or_else(|| "an unspecified delay".to_string()))]
    RateLimited { retry_after_secs: Option<u64> },

    /// Connection refused/reset, DNS failure, or HTTP 503.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The request was cancelled while waiting to retry.
    #[error("cancelled")]
    Cancelled,
}
