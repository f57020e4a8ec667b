//! IP address lookup functions.
//!
//! This module provides functions to look up IP addresses in the GeoIP City
//! database and retrieve metadata about the loaded database.

use super::types::{GeoIpMetadata, GeoIpResult};
use crate::geoip::GEOIP_CITY_READER;

/// Looks up an IP address in the GeoIP City database.
///
/// Returns `None` if GeoIP is not initialized, the address does not parse,
/// or the database has no record for it.
pub fn lookup_ip(ip: &str) -> Option<GeoIpResult> {
    let city_reader = GEOIP_CITY_READER.read().ok()?;
    let (city_reader, _) = city_reader.as_ref()?;

    let ip_addr: std::net::IpAddr = ip.trim().parse().ok()?;

    // maxminddb 0.27 API: lookup() returns Result<LookupResult, MaxMindDbError>
    // Use has_data() to check if data exists, then decode() to get the City struct
    let city_lookup = match city_reader.lookup(ip_addr) {
        Ok(result) => result,
        Err(e) => {
            log::debug!("GeoIP lookup failed for {}: {}", ip, e);
            return None;
        }
    };

    if !city_lookup.has_data() {
        return None;
    }

    let city_result: maxminddb::geoip2::City = match city_lookup.decode() {
        Ok(Some(city)) => city,
        Ok(None) => return None,
        Err(e) => {
            log::debug!("GeoIP record for {} could not be decoded: {}", ip, e);
            return None;
        }
    };

    let region = city_result
        .subdivisions
        .first()
        .and_then(|subdivision| subdivision.names.english)
        .map(|s| s.to_string());

    Some(GeoIpResult {
        country_code: city_result.country.iso_code.map(|s| s.to_string()),
        country_name: city_result.country.names.english.map(|s| s.to_string()),
        region,
        city: city_result.city.names.english.map(|s| s.to_string()),
        latitude: city_result.location.latitude,
        longitude: city_result.location.longitude,
        timezone: city_result.location.time_zone.map(|s| s.to_string()),
    })
}

/// Gets the current GeoIP City metadata if initialized
pub fn get_metadata() -> Option<GeoIpMetadata> {
    let reader = GEOIP_CITY_READER.read().ok()?;
    reader.as_ref().map(|(_, metadata)| metadata.clone())
}

/// Checks if GeoIP is enabled (database is loaded).
pub fn is_enabled() -> bool {
    GEOIP_CITY_READER
        .read()
        .ok()
        .is_some_and(|reader| reader.is_some())
}
