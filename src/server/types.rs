//! Server data structures.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::analysis::Analyzer;

/// Shared state for the analysis server
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    /// Deadline given to each analysis.
    pub request_timeout: Duration,
    /// Cancelled on shutdown; every request waits on a child of it.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(analyzer: Arc<Analyzer>, request_timeout: Duration) -> Self {
        Self {
            analyzer,
            request_timeout,
            shutdown: CancellationToken::new(),
        }
    }
}

/// JSON response for `/health`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub geoip: bool,
    /// Build version of the loaded GeoIP database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geoip_version: Option<String>,
    pub version: String,
}
