//! GeoIP lookup using a MaxMind GeoLite2 City database.
//!
//! The database is loaded once at start-up into a process-wide reader and is
//! only read afterwards, so lookups from concurrent requests share it freely.

mod loader;
mod lookup;
mod metadata;
mod types;

// Re-export public API
pub use loader::init_geoip;
pub use lookup::{get_metadata, is_enabled, lookup_ip};
pub use types::{GeoIpMetadata, GeoIpResult};

use maxminddb::Reader;
use std::sync::{Arc, LazyLock, RwLock};

/// Type alias for GeoIP reader cache entry
type GeoIpReaderCache = Arc<RwLock<Option<(Arc<Reader<Vec<u8>>>, GeoIpMetadata)>>>;

/// Global GeoIP City reader (written once by `init_geoip`)
pub(crate) static GEOIP_CITY_READER: LazyLock<GeoIpReaderCache> =
    LazyLock::new(|| Arc::new(RwLock::new(None)));
