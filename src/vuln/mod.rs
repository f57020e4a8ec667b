//! Vulnerability correlation.
//!
//! This module maps discovered services to CPE platform ids, queries the NVD
//! CVE API for each, and merges the results into the report. Every failure of
//! the vulnerability source is recoverable.

mod correlate;
mod nvd;
mod parse;
mod platform;

use async_trait::async_trait;

use crate::error_handling::SourceFailure;
use crate::models::Vulnerability;

// Re-export public API
pub use correlate::{CorrelationOutcome, VulnerabilityCorrelator, INCOMPLETE_VULNERABILITY_DATA};
pub use nvd::NvdClient;
pub use parse::parse_nvd_response;
pub use platform::platform_id_for;

/// Known-vulnerability database, queried by platform id.
#[async_trait]
pub trait VulnerabilitySource: Send + Sync {
    /// Returns the vulnerabilities recorded for `platform_id`.
    ///
    /// `Err` is reserved for timeouts, rate limiting and connection failures.
    async fn fetch(&self, platform_id: &str) -> Result<Vec<Vulnerability>, SourceFailure>;
}
