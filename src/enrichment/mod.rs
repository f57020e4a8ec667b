//! Best-effort geolocation and network ownership enrichment.
//!
//! Neither lookup can fail a request. Whatever is missing keeps its sentinel
//! value and, where the operator should know about it, adds a warning.

mod asn;
mod geo;
mod whois;

pub use asn::{normalize_asn, IpApiClient};
pub use geo::{GeoLocator, MaxMindLocator};
pub use whois::{parse_whois_output, WhoisClient};

use std::net::IpAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;

use crate::error_handling::{ErrorKind, SourceFailure};
use crate::models::GeoInfo;
use crate::utils::{panic_message, RequestBudget};

/// Ownership data for one address. Absent fields keep their sentinels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkOwnership {
    pub asn: Option<String>,
    pub org: Option<String>,
    pub isp: Option<String>,
}

/// An IP-intelligence service that knows who operates an address.
#[async_trait]
pub trait NetworkOwnershipSource: Send + Sync {
    /// `Ok(None)` when the service answered but has nothing for `ip`.
    async fn lookup(&self, ip: &str) -> Result<Option<NetworkOwnership>, SourceFailure>;
}

/// Asks `primary` first and `fallback` when the primary has no data or fails.
///
/// A fallback answer replaces a primary failure. When neither has data the
/// primary's result is returned, so its failure still reaches the report.
pub struct FallbackOwnership {
    primary: Arc<dyn NetworkOwnershipSource>,
    fallback: Arc<dyn NetworkOwnershipSource>,
}

impl FallbackOwnership {
    pub fn new(
        primary: Arc<dyn NetworkOwnershipSource>,
        fallback: Arc<dyn NetworkOwnershipSource>,
    ) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl NetworkOwnershipSource for FallbackOwnership {
    async fn lookup(&self, ip: &str) -> Result<Option<NetworkOwnership>, SourceFailure> {
        let primary = self.primary.lookup(ip).await;
        match &primary {
            Ok(Some(_)) => return primary,
            Ok(None) => log::debug!("No primary ownership data for {}, trying fallback", ip),
            Err(failure) => log::warn!(
                "Primary ownership lookup for {} failed ({}), trying fallback",
                ip,
                failure
            ),
        }

        match self.fallback.lookup(ip).await {
            Ok(Some(ownership)) => Ok(Some(ownership)),
            Ok(None) => primary,
            Err(failure) => {
                log::debug!("Fallback ownership lookup for {} failed: {}", ip, failure);
                primary
            }
        }
    }
}

pub const UNKNOWN_LOCATION_WARNING: &str =
    "Geolocation unavailable: country and city could not be determined";

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentOutcome {
    pub geo: GeoInfo,
    pub warnings: Vec<String>,
}

pub struct EnrichmentEngine {
    locator: Arc<dyn GeoLocator>,
    ownership: Arc<dyn NetworkOwnershipSource>,
}

impl EnrichmentEngine {
    pub fn new(locator: Arc<dyn GeoLocator>, ownership: Arc<dyn NetworkOwnershipSource>) -> Self {
        Self { locator, ownership }
    }

    pub async fn enrich(&self, ip: &str, budget: &RequestBudget) -> EnrichmentOutcome {
        let mut geo = GeoInfo::default();
        let mut warnings = Vec::new();

        match self.locator.locate(ip) {
            Some(result) => geo::apply_location(&mut geo, result),
            None => log::debug!("No geolocation record for {}", ip),
        }
        if geo.is_location_unknown() {
            warnings.push(UNKNOWN_LOCATION_WARNING.to_string());
        }

        if ip.trim().parse::<IpAddr>().is_err() {
            let warning = format!(
                "Network ownership lookup skipped for {} [{}]: not an IP address",
                ip,
                ErrorKind::AsnInvalidIp.code()
            );
            log::warn!("{}", warning);
            warnings.push(warning);
            return EnrichmentOutcome { geo, warnings };
        }

        let lookup = tokio::select! {
            biased;
            _ = tokio::time::sleep_until(budget.deadline()) => Ok(Err(SourceFailure::Timeout)),
            result = AssertUnwindSafe(self.ownership.lookup(ip)).catch_unwind() => result,
        };

        let lookup = match lookup {
            Ok(result) => result,
            Err(payload) => {
                let warning = format!(
                    "Network ownership lookup for {} failed [{}]: {}",
                    ip,
                    ErrorKind::InternalError.code(),
                    panic_message(payload.as_ref())
                );
                log::error!("{}", warning);
                warnings.push(warning);
                return EnrichmentOutcome { geo, warnings };
            }
        };

        match lookup {
            Ok(Some(ownership)) => {
                if let Some(asn) = ownership.asn {
                    geo.asn = asn;
                }
                if let Some(org) = ownership.org {
                    geo.org = org;
                }
                if let Some(isp) = ownership.isp {
                    geo.isp = isp;
                }
            }
            Ok(None) => log::debug!("No ownership data for {}", ip),
            Err(failure) => {
                geo.clear_ownership();
                let warning = ownership_warning(ip, &failure);
                log::warn!("{}", warning);
                warnings.push(warning);
            }
        }

        log::info!(
            "Enriched {}: {}, {} ({})",
            ip,
            geo.city,
            geo.country,
            geo.asn
        );
        EnrichmentOutcome { geo, warnings }
    }
}

fn ownership_warning(ip: &str, failure: &SourceFailure) -> String {
    let code = match failure {
        SourceFailure::RateLimited { .. } => ErrorKind::AsnRateLimit.code(),
        _ => ErrorKind::AsnServiceUnavailable.code(),
    };
    format!("Network ownership lookup for {} failed [{}]: {}", ip, code, failure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geoip::GeoIpResult;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    struct FixedLocator(Option<GeoIpResult>);

    impl GeoLocator for FixedLocator {
        fn locate(&self, _ip: &str) -> Option<GeoIpResult> {
            self.0.clone()
        }
    }

    struct FixedOwnership(Result<Option<NetworkOwnership>, SourceFailure>);

    #[async_trait]
    impl NetworkOwnershipSource for FixedOwnership {
        async fn lookup(&self, _ip: &str) -> Result<Option<NetworkOwnership>, SourceFailure> {
            self.0.clone()
        }
    }

    struct HangingOwnership;

    #[async_trait]
    impl NetworkOwnershipSource for HangingOwnership {
        async fn lookup(&self, _ip: &str) -> Result<Option<NetworkOwnership>, SourceFailure> {
            std::future::pending().await
        }
    }

    struct PanickingOwnership;

    #[async_trait]
    impl NetworkOwnershipSource for PanickingOwnership {
        async fn lookup(&self, ip: &str) -> Result<Option<NetworkOwnership>, SourceFailure> {
            panic!("malformed ownership record for {}", ip)
        }
    }

    /// Counts lookups and answers with a fixed result.
    struct CountingOwnership {
        result: Result<Option<NetworkOwnership>, SourceFailure>,
        calls: AtomicUsize,
    }

    impl CountingOwnership {
        fn new(result: Result<Option<NetworkOwnership>, SourceFailure>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NetworkOwnershipSource for CountingOwnership {
        async fn lookup(&self, _ip: &str) -> Result<Option<NetworkOwnership>, SourceFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn budget() -> RequestBudget {
        RequestBudget::new(Duration::from_secs(30), CancellationToken::new())
    }

    fn mountain_view() -> GeoIpResult {
        GeoIpResult {
            country_code: Some("US".to_string()),
            country_name: Some("United States".to_string()),
            city: Some("Mountain View".to_string()),
            ..Default::default()
        }
    }

    fn google() -> NetworkOwnership {
        NetworkOwnership {
            asn: Some("AS15169".to_string()),
            org: Some("Google Public DNS".to_string()),
            isp: Some("Google LLC".to_string()),
        }
    }

    #[tokio::test]
    async fn test_enrich_with_both_sources() {
        let engine = EnrichmentEngine::new(
            Arc::new(FixedLocator(Some(mountain_view()))),
            Arc::new(FixedOwnership(Ok(Some(google())))),
        );
        let outcome = engine.enrich("8.8.8.8", &budget()).await;
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.geo.country, "United States");
        assert_eq!(outcome.geo.asn, "AS15169");
        assert_eq!(outcome.geo.isp, "Google LLC");
    }

    #[tokio::test]
    async fn test_unknown_location_warns() {
        let engine = EnrichmentEngine::new(
            Arc::new(FixedLocator(None)),
            Arc::new(FixedOwnership(Ok(Some(google())))),
        );
        let outcome = engine.enrich("10.0.0.1", &budget()).await;
        assert_eq!(outcome.warnings, vec![UNKNOWN_LOCATION_WARNING.to_string()]);
        assert_eq!(outcome.geo.country_code, "--");
        assert_eq!(outcome.geo.asn, "AS15169");
    }

    #[tokio::test]
    async fn test_rate_limited_ownership_resets_and_warns() {
        let engine = EnrichmentEngine::new(
            Arc::new(FixedLocator(Some(mountain_view()))),
            Arc::new(FixedOwnership(Err(SourceFailure::RateLimited {
                retry_after_secs: Some(60),
            }))),
        );
        let outcome = engine.enrich("8.8.8.8", &budget()).await;
        assert_eq!(outcome.geo.asn, "Unknown");
        assert_eq!(outcome.geo.org, "Unknown");
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("ASN_RATE_LIMIT"));
    }

    #[tokio::test]
    async fn test_connection_failure_warns_unavailable() {
        let engine = EnrichmentEngine::new(
            Arc::new(FixedLocator(Some(mountain_view()))),
            Arc::new(FixedOwnership(Err(SourceFailure::Connection(
                "refused".to_string(),
            )))),
        );
        let outcome = engine.enrich("8.8.8.8", &budget()).await;
        assert!(outcome.warnings[0].contains("ASN_SERVICE_UNAVAILABLE"));
    }

    #[tokio::test]
    async fn test_no_ownership_data_is_silent() {
        let engine = EnrichmentEngine::new(
            Arc::new(FixedLocator(Some(mountain_view()))),
            Arc::new(FixedOwnership(Ok(None))),
        );
        let outcome = engine.enrich("192.168.1.1", &budget()).await;
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.geo.asn, "Unknown");
    }

    #[tokio::test(start_paused = true)]
    async fn test_ownership_lookup_bounded_by_deadline() {
        let engine = EnrichmentEngine::new(
            Arc::new(FixedLocator(Some(mountain_view()))),
            Arc::new(HangingOwnership),
        );
        let budget = RequestBudget::new(Duration::from_secs(5), CancellationToken::new());
        let outcome = engine.enrich("8.8.8.8", &budget).await;
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("timed out"));
    }

    #[tokio::test]
    async fn test_panicking_ownership_keeps_location() {
        let engine = EnrichmentEngine::new(
            Arc::new(FixedLocator(Some(mountain_view()))),
            Arc::new(PanickingOwnership),
        );
        let outcome = engine.enrich("8.8.8.8", &budget()).await;
        assert_eq!(outcome.geo.city, "Mountain View");
        assert_eq!(outcome.geo.asn, "Unknown");
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("INTERNAL_ERROR"));
        assert!(outcome.warnings[0].contains("malformed ownership record"));
    }

    #[tokio::test]
    async fn test_non_ip_target_skips_ownership_lookup() {
        let ownership = CountingOwnership::new(Ok(Some(google())));
        let engine = EnrichmentEngine::new(Arc::new(FixedLocator(None)), ownership.clone());
        let outcome = engine.enrich("AS15169", &budget()).await;
        assert_eq!(ownership.calls(), 0);
        assert_eq!(outcome.geo.asn, "Unknown");
        assert!(outcome
            .warnings
            .iter()
            .any(|warning| warning.contains("ASN_INVALID_IP")));
    }

    #[tokio::test]
    async fn test_fallback_answers_after_primary_failure() {
        let primary = CountingOwnership::new(Err(SourceFailure::Timeout));
        let fallback = CountingOwnership::new(Ok(Some(google())));
        let chain = FallbackOwnership::new(primary.clone(), fallback.clone());

        assert_eq!(chain.lookup("8.8.8.8").await, Ok(Some(google())));
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);

        let engine = EnrichmentEngine::new(
            Arc::new(FixedLocator(Some(mountain_view()))),
            Arc::new(chain),
        );
        let outcome = engine.enrich("8.8.8.8", &budget()).await;
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.geo.asn, "AS15169");
    }

    #[tokio::test]
    async fn test_fallback_not_asked_when_primary_answers() {
        let primary = CountingOwnership::new(Ok(Some(google())));
        let fallback = CountingOwnership::new(Ok(None));
        let chain = FallbackOwnership::new(primary, fallback.clone());

        assert_eq!(chain.lookup("8.8.8.8").await, Ok(Some(google())));
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_fallback_without_data_keeps_primary_failure() {
        let rate_limited = Err(SourceFailure::RateLimited {
            retry_after_secs: None,
        });
        let chain = FallbackOwnership::new(
            CountingOwnership::new(rate_limited.clone()),
            CountingOwnership::new(Err(SourceFailure::Timeout)),
        );
        assert_eq!(chain.lookup("8.8.8.8").await, rate_limited);

        let chain = FallbackOwnership::new(
            CountingOwnership::new(Ok(None)),
            CountingOwnership::new(Ok(None)),
        );
        assert_eq!(chain.lookup("10.0.0.1").await, Ok(None));
    }
}
