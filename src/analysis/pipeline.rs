//! The analysis pipeline.
//!
//! validate -> resolve -> scan are critical: any failure aborts the request.
//! Vulnerability correlation and enrichment then run concurrently and can
//! only degrade the report with warnings. Scoring, reputation and
//! recommendations are pure functions of the collected evidence.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio::time::timeout_at;

use super::assemble::{assemble_report, Findings};
use super::recommendations::build_recommendations;
use super::reputation::build_reputation;
use super::scoring::calculate_score;
use crate::dns::HostResolver;
use crate::enrichment::{EnrichmentEngine, EnrichmentOutcome, GeoLocator, NetworkOwnershipSource};
use crate::error_handling::{AnalysisError, ErrorKind};
use crate::models::{AnalysisReport, AnalysisRequest, GeoInfo, ServiceRecord};
use crate::scan::PortScanner;
use crate::target::resolve_target;
use crate::utils::{epoch_millis, panic_message, RequestBudget};
use crate::validation::validate_query;
use crate::vuln::{
    CorrelationOutcome, VulnerabilityCorrelator, VulnerabilitySource, INCOMPLETE_VULNERABILITY_DATA,
};

/// External collaborators the pipeline delegates to.
#[derive(Clone)]
pub struct Collaborators {
    pub resolver: Arc<dyn HostResolver>,
    pub scanner: Arc<dyn PortScanner>,
    pub vulnerabilities: Arc<dyn VulnerabilitySource>,
    pub geolocation: Arc<dyn GeoLocator>,
    pub ownership: Arc<dyn NetworkOwnershipSource>,
}

/// Runs complete analyses. Shared by all requests; holds no per-request state.
pub struct Analyzer {
    resolver: Arc<dyn HostResolver>,
    scanner: Arc<dyn PortScanner>,
    correlator: VulnerabilityCorrelator,
    enrichment: EnrichmentEngine,
}

impl Analyzer {
    pub fn new(collaborators: Collaborators, vuln_concurrency: usize) -> Self {
        Self {
            resolver: collaborators.resolver,
            scanner: collaborators.scanner,
            correlator: VulnerabilityCorrelator::new(
                collaborators.vulnerabilities,
                vuln_concurrency,
            ),
            enrichment: EnrichmentEngine::new(collaborators.geolocation, collaborators.ownership),
        }
    }

    /// Analyzes one target within `budget`.
    ///
    /// # Errors
    ///
    /// Invalid input, an unresolvable domain, any scanner failure, or the
    /// deadline expiring before the scan finished. Failures of the
    /// vulnerability and enrichment sources never surface here.
    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
        budget: &RequestBudget,
    ) -> Result<AnalysisReport, AnalysisError> {
        let started = Instant::now();
        let query = validate_query(&request.query, request.target_type)?;
        log::info!("Analyzing {} ({})", query, request.target_type);

        let target = timeout_at(
            budget.deadline(),
            resolve_target(&query, request.target_type, self.resolver.as_ref()),
        )
        .await
        .map_err(|_| {
            AnalysisError::request_timeout("target resolution", "deadline expired during DNS lookup")
        })??;

        let mut services = timeout_at(budget.deadline(), self.scanner.scan(&target.ip))
            .await
            .map_err(|_| {
                AnalysisError::request_timeout("port scan", "deadline expired while the scanner ran")
            })??;

        log::debug!(
            "Scan of {} done with {:?} of the request budget left",
            target.ip,
            budget.remaining()
        );

        // A panicking source costs its own stage's data, never the report
        let (correlation, enrichment) = tokio::join!(
            AssertUnwindSafe(self.correlator.correlate(&mut services, budget)).catch_unwind(),
            AssertUnwindSafe(self.enrichment.enrich(&target.ip, budget)).catch_unwind(),
        );
        let correlation = correlation
            .unwrap_or_else(|payload| correlation_aborted(&mut services, &panic_message(payload.as_ref())));
        let enrichment = enrichment
            .unwrap_or_else(|payload| enrichment_aborted(&target.ip, &panic_message(payload.as_ref())));

        if budget.is_cancelled() {
            log::warn!(
                "Analysis of {} was cancelled; vulnerability data may be partial",
                target.ip
            );
        }

        let mut warnings = correlation.warnings;
        warnings.extend(enrichment.warnings);

        let vulnerabilities = correlation.vulnerabilities;
        let security_score = calculate_score(&services, &vulnerabilities);
        let reputation = build_reputation(&services, &vulnerabilities, epoch_millis());
        let recommendations = build_recommendations(&services, &vulnerabilities, security_score);

        let report = assemble_report(
            target,
            Findings {
                services,
                vulnerabilities,
                geo: enrichment.geo,
                reputation,
                recommendations,
                security_score,
                warnings,
            },
            started.elapsed(),
        );

        log::info!(
            "Analysis of {} complete: score {} ({}), {} vulnerabilit(ies), {} warning(s) in {}ms",
            report.ip,
            report.security_score,
            report.risk_level,
            report.vulnerabilities.len(),
            report.metadata.warnings.len(),
            report.metadata.scan_duration_ms
        );
        Ok(report)
    }
}

/// Outcome of a correlation stage that panicked. Service links to
/// vulnerabilities are dropped since the global list is lost.
fn correlation_aborted(services: &mut [ServiceRecord], message: &str) -> CorrelationOutcome {
    let warning = format!(
        "Vulnerability correlation failed [{}]: {}",
        ErrorKind::InternalError.code(),
        message
    );
    log::error!("{}", warning);
    for service in services.iter_mut() {
        service.clear_vulnerabilities();
    }
    CorrelationOutcome {
        vulnerabilities: Vec::new(),
        warnings: vec![warning, INCOMPLETE_VULNERABILITY_DATA.to_string()],
    }
}

fn enrichment_aborted(ip: &str, message: &str) -> EnrichmentOutcome {
    let warning = format!(
        "Enrichment of {} failed [{}]: {}",
        ip,
        ErrorKind::InternalError.code(),
        message
    );
    log::error!("{}", warning);
    EnrichmentOutcome {
        geo: GeoInfo::default(),
        warnings: vec![warning],
    }
}
