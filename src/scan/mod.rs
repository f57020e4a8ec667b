//! Port and service discovery.
//!
//! This module runs the external scanner and turns its XML report into
//! `ServiceRecord`s, each carrying a heuristic initial risk level.
//! Any scanner failure is fatal to the analysis.

mod parse;
mod risk;
mod runner;

use async_trait::async_trait;

use crate::error_handling::AnalysisError;
use crate::models::ServiceRecord;

// Re-export public API
pub use parse::parse_nmap_xml;
pub use risk::initial_risk;
pub use runner::NmapScanner;

/// Discovers open services on an address.
#[async_trait]
pub trait PortScanner: Send + Sync {
    /// Scans `ip` and returns its open services in scanner order.
    async fn scan(&self, ip: &str) -> Result<Vec<ServiceRecord>, AnalysisError>;
}
