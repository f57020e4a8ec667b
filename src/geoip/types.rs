//! GeoIP data structures.
//!
//! This module defines the data structures used for GeoIP lookups and metadata.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Metadata about the loaded GeoIP database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoIpMetadata {
    /// Source path
    pub source: String,
    /// Database build date/version (extracted from database)
    pub version: String,
    /// Load timestamp
    pub last_updated: SystemTime,
}

/// GeoIP lookup result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoIpResult {
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
}
