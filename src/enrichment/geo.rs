//! Geolocation from the local GeoIP database.

use crate::geoip::{self, GeoIpResult};
use crate::models::GeoInfo;

/// Looks up the location of an address.
pub trait GeoLocator: Send + Sync {
    /// `None` when the database is unavailable or has no record.
    fn locate(&self, ip: &str) -> Option<GeoIpResult>;
}

/// `GeoLocator` backed by the process-wide MaxMind reader.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxMindLocator;

impl GeoLocator for MaxMindLocator {
    fn locate(&self, ip: &str) -> Option<GeoIpResult> {
        geoip::lookup_ip(ip)
    }
}

/// Fills the location fields of a `GeoInfo`, keeping sentinels for anything
/// the lookup did not provide.
pub(crate) fn apply_location(geo: &mut GeoInfo, result: GeoIpResult) {
    let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

    if let Some(country) = present(result.country_name) {
        geo.country = country;
    }
    if let Some(code) = present(result.country_code) {
        geo.country_code = code;
    }
    if let Some(region) = present(result.region) {
        geo.region = region;
    }
    if let Some(city) = present(result.city) {
        geo.city = city;
    }
    if let Some(timezone) = present(result.timezone) {
        geo.timezone = timezone;
    }
    if let (Some(latitude), Some(longitude)) = (result.latitude, result.longitude) {
        geo.latitude = latitude;
        geo.longitude = longitude;
    }
}
