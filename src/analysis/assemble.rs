//! Final report composition.

use std::time::Duration;

use crate::config::{
    SOURCE_DNS, SOURCE_GEOLOCATION, SOURCE_OWNERSHIP, SOURCE_SCANNER, SOURCE_VULNERABILITIES,
};
use crate::models::{
    AnalysisReport, GeoInfo, Recommendation, ReportMetadata, ReputationEntry, ServiceRecord,
    Target, Vulnerability,
};
use crate::utils::{duration_to_ms, epoch_millis};

use super::scoring::classify_risk;

/// Everything the stages produced for one target.
#[derive(Debug, Clone)]
pub struct Findings {
    pub services: Vec<ServiceRecord>,
    pub vulnerabilities: Vec<Vulnerability>,
    pub geo: GeoInfo,
    pub reputation: ReputationEntry,
    pub recommendations: Vec<Recommendation>,
    pub security_score: u8,
    /// In the order they were raised.
    pub warnings: Vec<String>,
}

pub fn sources_used(target: &Target) -> Vec<String> {
    let resolved = target.was_resolved().then_some(SOURCE_DNS);
    resolved
        .into_iter()
        .chain([
            SOURCE_SCANNER,
            SOURCE_VULNERABILITIES,
            SOURCE_GEOLOCATION,
            SOURCE_OWNERSHIP,
        ])
        .map(str::to_string)
        .collect()
}

pub fn assemble_report(target: Target, findings: Findings, elapsed: Duration) -> AnalysisReport {
    let metadata = ReportMetadata {
        scan_duration_ms: duration_to_ms(elapsed),
        sources_used: sources_used(&target),
        cached: false,
        warnings: findings.warnings,
    };

    AnalysisReport {
        ip: target.ip,
        domain: target.domain,
        target_type: target.target_type,
        security_score: findings.security_score,
        risk_level: classify_risk(findings.security_score),
        timestamp: epoch_millis(),
        services: findings.services,
        geo: findings.geo,
        reputation: vec![findings.reputation],
        vulnerabilities: findings.vulnerabilities,
        recommendations: findings.recommendations,
        metadata,
    }
}
