//! Service to vulnerability correlation.
//!
//! Maps each service to a platform id, queries the vulnerability source with
//! deadline-aware retries, merges the findings without duplicates, and
//! escalates service risk from the worst CVSS found.

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use super::platform::platform_id_for;
use super::VulnerabilitySource;
use crate::error_handling::{get_retry_strategy, ErrorKind, SourceFailure};
use crate::models::{RiskLevel, ServiceRecord, Vulnerability};
use crate::utils::{RequestBudget, WaitOutcome};

/// Aggregate warning added when any lookup failed.
pub const INCOMPLETE_VULNERABILITY_DATA: &str =
    "Vulnerability data may be incomplete: one or more vulnerability lookups failed";

/// Findings and warnings of one correlation pass.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CorrelationOutcome {
    /// Unique by id, in first-seen order.
    pub vulnerabilities: Vec<Vulnerability>,
    pub warnings: Vec<String>,
}

pub struct VulnerabilityCorrelator {
    source: Arc<dyn VulnerabilitySource>,
    concurrency: usize,
}

impl VulnerabilityCorrelator {
    pub fn new(source: Arc<dyn VulnerabilitySource>, concurrency: usize) -> Self {
        Self {
            source,
            concurrency: concurrency.max(1),
        }
    }

    /// Correlates `services` in place and returns the global findings.
    ///
    /// Lookups may overlap (bounded by the configured concurrency) but results
    /// are merged in scan order, so the outcome does not depend on timing.
    pub async fn correlate(
        &self,
        services: &mut [ServiceRecord],
        budget: &RequestBudget,
    ) -> CorrelationOutcome {
        for service in services.iter_mut() {
            service.platform_id = platform_id_for(&service.service_name, service.version.as_deref());
        }

        let lookups: Vec<(usize, String)> = services
            .iter()
            .enumerate()
            .filter_map(|(index, service)| service.platform_id.clone().map(|id| (index, id)))
            .collect();

        log::info!(
            "Correlating {} of {} service(s) with known vulnerabilities",
            lookups.len(),
            services.len()
        );

        // `buffered` yields in input order
        let results: Vec<(usize, Result<Vec<Vulnerability>, SourceFailure>)> = stream::iter(lookups)
            .map(|(index, platform_id)| async move {
                (index, self.fetch_with_retry(&platform_id, budget).await)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut outcome = CorrelationOutcome::default();
        let mut degraded = false;
        for (index, result) in results {
            let service = &mut services[index];
            match result {
                Ok(findings) => merge_findings(service, findings, &mut outcome.vulnerabilities),
                Err(failure) => {
                    degraded = true;
                    let warning = lookup_warning(service, &failure);
                    log::warn!("{}", warning);
                    outcome.warnings.push(warning);
                }
            }
        }

        if degraded {
            outcome.warnings.push(INCOMPLETE_VULNERABILITY_DATA.to_string());
        }
        outcome
    }

    /// One lookup, retried on timeout with the backoff schedule.
    ///
    /// A wait that would pass the request deadline is not started and the
    /// lookup is reported as timed out.
    async fn fetch_with_retry(
        &self,
        platform_id: &str,
        budget: &RequestBudget,
    ) -> Result<Vec<Vulnerability>, SourceFailure> {
        let mut delays = get_retry_strategy();
        let mut attempt = 1;
        loop {
            let result = tokio::select! {
                biased;
                _ = tokio::time::sleep_until(budget.deadline()) => Err(SourceFailure::Timeout),
                result = self.source.fetch(platform_id) => result,
            };

            match result {
                Err(SourceFailure::Timeout) => {
                    let Some(delay) = delays.next() else {
                        log::warn!("Giving up on {} after {} attempt(s)", platform_id, attempt);
                        return Err(SourceFailure::Timeout);
                    };
                    log::warn!(
                        "Lookup of {} timed out (attempt {}), retrying in {:?}",
                        platform_id,
                        attempt,
                        delay
                    );
                    match budget.wait(delay).await {
                        WaitOutcome::Elapsed => attempt += 1,
                        WaitOutcome::DeadlineExceeded => return Err(SourceFailure::Timeout),
                        WaitOutcome::Cancelled => return Err(SourceFailure::Cancelled),
                    }
                }
                other => return other,
            }
        }
    }
}

/// Merges one service's findings into the service and the global list, then
/// escalates the service's risk from the highest CVSS among them.
fn merge_findings(
    service: &mut ServiceRecord,
    findings: Vec<Vulnerability>,
    global: &mut Vec<Vulnerability>,
) {
    let max_cvss = findings
        .iter()
        .map(|v| v.cvss_score)
        .fold(None, |max: Option<f64>, score| Some(max.map_or(score, |m| m.max(score))));

    for vulnerability in findings {
        service.record_vulnerability(&vulnerability.id);
        if !global.iter().any(|existing| existing.id == vulnerability.id) {
            global.push(vulnerability);
        }
    }

    if let Some(floor) = max_cvss.and_then(RiskLevel::floor_for_cvss) {
        service.escalate_risk(floor);
    }
}

fn lookup_warning(service: &ServiceRecord, failure: &SourceFailure) -> String {
    let kind = match failure {
        SourceFailure::Timeout => ErrorKind::VulnTimeout.code(),
        SourceFailure::RateLimited { .. } => ErrorKind::VulnRateLimit.code(),
        SourceFailure::Connection(_) => ErrorKind::VulnConnectionError.code(),
        SourceFailure::Cancelled => "CANCELLED",
    };
    format!(
        "Vulnerability lookup for {} on port {}/{} failed [{}]: {}",
        service.service_name, service.port, service.protocol, kind, failure
    )
}
