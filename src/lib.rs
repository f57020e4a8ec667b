//! posture_analyzer library: composite security posture of a network target
//!
//! Given an IPv4/IPv6 address, an ASN or a domain, the analyzer scans the
//! target with `nmap`, correlates the discovered services with the NVD CVE
//! database, enriches the address with geolocation and network ownership,
//! and folds the evidence into a deterministic 0-100 security score, a
//! reputation verdict and a prioritized list of recommendations.
//!
//! Failures of the scanner (or of target resolution) abort an analysis.
//! Failures of the vulnerability, geolocation and ownership sources only
//! degrade the report and are listed in `metadata.warnings`.
//!
//! # Example
//!
//! ```no_run
//! use posture_analyzer::{run_server, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), anyhow::Error> {
//! let config = Config {
//!     port: 9090,
//!     geoip: Some("GeoLite2-City.mmdb".into()),
//!     ..Default::default()
//! };
//! run_server(config).await
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime and an `nmap` binary on the host.

pub mod analysis;
pub mod config;
pub mod dns;
pub mod enrichment;
pub mod error_handling;
pub mod geoip;
pub mod initialization;
pub mod models;
pub mod scan;
pub mod server;
mod target;
mod utils;
mod validation;
pub mod vuln;

// Re-export public API
pub use analysis::{Analyzer, Collaborators};
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{AnalysisError, ErrorKind, SourceFailure};
pub use models::{AnalysisReport, AnalysisRequest};
pub use server::{router, AppState};
pub use target::resolve_target;
pub use utils::{RequestBudget, WaitOutcome};
pub use validation::validate_query;

use std::sync::Arc;

use anyhow::{Context, Result};

/// Loads the shared resources described by `config` and serves the HTTP API
/// until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the listener cannot
/// bind. A GeoIP database that cannot be loaded is logged and skipped.
pub async fn run_server(config: Config) -> Result<()> {
    // Geolocation is best-effort: a bad database only disables it
    if let Err(e) = geoip::init_geoip(config.geoip.as_deref()).await {
        log::warn!(
            "GeoIP database unavailable, geolocation will report Unknown: {:#}",
            e
        );
    }

    let client = initialization::init_client().context("Failed to initialize HTTP client")?;
    let resolver = initialization::init_resolver();
    let analyzer = Arc::new(initialization::init_analyzer(&config, client, resolver));

    log::info!(
        "Scanner: {} (ports {}, timeout {}s); request deadline {}s",
        config.nmap_path.display(),
        config.scan_ports,
        config.scan_timeout_seconds,
        config.request_timeout_seconds
    );

    let state = AppState::new(analyzer, config.request_timeout());
    server::serve(&config.bind_address(), state).await
}
