//! GeoIP database loading.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use maxminddb::Reader;

use crate::geoip::metadata::extract_metadata;
use crate::geoip::types::GeoIpMetadata;
use crate::geoip::GEOIP_CITY_READER;

/// Loads a GeoIP database from a local file path
pub(crate) async fn load_from_file(path: &Path) -> Result<(Reader<Vec<u8>>, GeoIpMetadata)> {
    log::info!("Loading GeoIP database from: {}", path.display());

    let db_bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read GeoIP database from {}", path.display()))?;

    let reader = Reader::from_source(db_bytes)
        .with_context(|| format!("Failed to parse GeoIP database from {}", path.display()))?;

    let metadata = extract_metadata(&reader, &path.display().to_string());
    Ok((reader, metadata))
}

/// Initializes the process-wide GeoIP City reader.
///
/// The database is read once at start-up and is read-only afterwards.
/// Without a path, geolocation stays disabled and every lookup falls back to
/// the "Unknown" sentinels.
///
/// # Arguments
///
/// * `geoip_path` - Optional path to the MaxMind GeoLite2 City database file (.mmdb)
///
/// # Returns
///
/// Metadata about the loaded database, or `None` when no path was given.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a MaxMind database.
pub async fn init_geoip(geoip_path: Option<&Path>) -> Result<Option<GeoIpMetadata>> {
    let Some(path) = geoip_path else {
        log::warn!("No GeoIP database configured; geolocation will report Unknown");
        return Ok(None);
    };

    let (reader, metadata) = load_from_file(path).await?;

    let mut cache = GEOIP_CITY_READER
        .write()
        .map_err(|e| anyhow::anyhow!("GeoIP reader lock poisoned: {}", e))?;
    *cache = Some((Arc::new(reader), metadata.clone()));

    log::info!(
        "GeoIP database loaded ({}, {})",
        metadata.source,
        metadata.version
    );
    Ok(Some(metadata))
}
