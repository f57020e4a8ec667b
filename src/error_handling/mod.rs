//! Error handling for the analysis pipeline.
//!
//! This module provides:
//! - The fatal `AnalysisError` with its `ErrorKind` and HTTP mapping
//! - Recoverable `SourceFailure`s that become report warnings
//! - Retry strategy configuration
//! - Classification of outbound HTTP failures
//!
//! Failures are split into:
//! - **Fatal**: the target cannot be analyzed (bad input, scanner failure, deadline)
//! - **Recoverable**: a non-critical source failed; the report is degraded, not aborted

mod categorization;
mod response;
mod types;

// Re-export public API
pub use categorization::{categorize_reqwest_error, categorize_status, get_retry_strategy};
pub use response::ErrorBody;
pub use types::{AnalysisError, ErrorKind, InitializationError, SourceFailure};
