//! Application initialization and resource setup.
//!
//! This module provides functions to initialize all shared resources:
//! - Logger
//! - HTTP client (shared by the vulnerability and ownership lookups)
//! - DNS resolver
//! - The analyzer with its production collaborators

mod client;
mod logger;
mod resolver;

use std::sync::Arc;

use hickory_resolver::TokioAsyncResolver;

use crate::analysis::{Analyzer, Collaborators};
use crate::config::Config;
use crate::enrichment::{FallbackOwnership, IpApiClient, MaxMindLocator, WhoisClient};
use crate::scan::NmapScanner;
use crate::vuln::NvdClient;

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;
pub use resolver::init_resolver;

/// Wires the production collaborators into an `Analyzer`.
///
/// Geolocation reads the process-wide reader, so `geoip::init_geoip` should
/// run first; without it every location is reported as unknown.
pub fn init_analyzer(
    config: &Config,
    client: Arc<reqwest::Client>,
    resolver: Arc<TokioAsyncResolver>,
) -> Analyzer {
    let collaborators = Collaborators {
        resolver,
        scanner: Arc::new(NmapScanner::from_config(config)),
        vulnerabilities: Arc::new(NvdClient::from_config(Arc::clone(&client), config)),
        geolocation: Arc::new(MaxMindLocator),
        ownership: Arc::new(FallbackOwnership::new(
            Arc::new(IpApiClient::from_config(client, config)),
            Arc::new(WhoisClient::from_config(config)),
        )),
    };
    Analyzer::new(collaborators, config.vuln_concurrency)
}
