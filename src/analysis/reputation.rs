//! Qualitative reputation from exposed services and known vulnerabilities.

use super::capped_penalty;
use crate::config::{REPUTATION_LABEL, REPUTATION_SOURCE};
use crate::models::{
    ReputationEntry, ReputationStatus, RiskLevel, ServiceRecord, Severity, Vulnerability,
};

const NO_FINDINGS: &str = "No apparent malicious activity was observed on the analyzed services.";
const DEGRADED: &str = "Reputation degraded: potentially risky activity detected.";
const SEVERELY_DEGRADED: &str = "Reputation severely degraded: multiple indicators of compromise.";

struct Penalty {
    label: &'static str,
    count: usize,
    points: u32,
}

/// Builds the single reputation entry of a report.
pub fn build_reputation(
    services: &[ServiceRecord],
    vulnerabilities: &[Vulnerability],
    checked_at: i64,
) -> ReputationEntry {
    let services_at = |level: RiskLevel| services.iter().filter(|s| s.risk_level() == level).count();
    let vulns_of = |severity: Severity| {
        vulnerabilities
            .iter()
            .filter(|v| v.severity == severity)
            .count()
    };

    let penalties = [
        ("High-risk services", services_at(RiskLevel::High), 10, 30),
        ("Medium-risk services", services_at(RiskLevel::Medium), 5, 20),
        ("Critical vulnerabilities", vulns_of(Severity::Critical), 15, 30),
        ("High vulnerabilities", vulns_of(Severity::High), 10, 30),
        ("Medium vulnerabilities", vulns_of(Severity::Medium), 5, 20),
    ]
    .into_iter()
    .filter(|(_, count, _, _)| *count > 0)
    .map(|(label, count, each, cap)| Penalty {
        label,
        count,
        points: capped_penalty(count, each, cap),
    })
    .collect::<Vec<_>>();

    let total: u32 = penalties.iter().map(|p| p.points).sum();
    let score = 100u32.saturating_sub(total) as u8;
    let status = ReputationStatus::from_score(score);

    let mut details: Vec<String> = penalties
        .iter()
        .map(|p| format!("{}: {}. Penalty: -{} points.", p.label, p.count, p.points))
        .collect();
    match status {
        ReputationStatus::Clean if details.is_empty() => details.push(NO_FINDINGS.to_string()),
        ReputationStatus::Suspicious => details.push(DEGRADED.to_string()),
        ReputationStatus::Malicious => details.push(SEVERELY_DEGRADED.to_string()),
        _ => {}
    }

    ReputationEntry {
        source: REPUTATION_SOURCE.to_string(),
        label: REPUTATION_LABEL.to_string(),
        status,
        score,
        details: details.join(" "),
        checked_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Protocol;

    fn vuln(id: &str, severity: Severity) -> Vulnerability {
        Vulnerability {
            id: id.to_string(),
            title: id.to_string(),
            severity,
            cvss_score: 0.0,
            description: String::new(),
            remediation: String::new(),
            references: Vec::new(),
        }
    }

    #[test]
    fn test_no_evidence_is_clean() {
        let entry = build_reputation(&[], &[], 1_700_000_000_000);
        assert_eq!(entry.score, 100);
        assert_eq!(entry.status, ReputationStatus::Clean);
        assert_eq!(entry.details, NO_FINDINGS);
        assert_eq!(entry.source, "nmap-nvd");
        assert_eq!(entry.checked_at, 1_700_000_000_000);
    }

    #[test]
    fn test_clean_with_penalties_lists_them() {
        let mut https = ServiceRecord::new(443, Protocol::Tcp, "https");
        https.escalate_risk(RiskLevel::Medium);
        let services = [ServiceRecord::new(53, Protocol::Udp, "dns"), https];
        let entry = build_reputation(&services, &[vuln("CVE-2021-23017", Severity::Medium)], 0);

        assert_eq!(entry.score, 85);
        assert_eq!(entry.status, ReputationStatus::Clean);
        assert!(entry.details.contains("Medium-risk services: 2. Penalty: -10 points."));
        assert!(entry.details.contains("Medium vulnerabilities: 1. Penalty: -5 points."));
        assert!(!entry.details.contains(NO_FINDINGS));
    }

    #[test]
    fn test_suspicious_verdict() {
        let services: Vec<_> = [23, 21, 3389]
            .into_iter()
            .map(|port| ServiceRecord::new(port, Protocol::Tcp, "svc"))
            .collect();
        let entry = build_reputation(&services, &[], 0);
        assert_eq!(entry.score, 70);
        assert_eq!(entry.status, ReputationStatus::Suspicious);
        assert!(entry.details.ends_with(DEGRADED));
    }

    #[test]
    fn test_malicious_verdict_and_caps() {
        let services: Vec<_> = [23, 21, 3389, 3306, 5432]
            .into_iter()
            .map(|port| ServiceRecord::new(port, Protocol::Tcp, "svc"))
            .collect();
        let vulnerabilities: Vec<_> = (0..4)
            .map(|i| vuln(&format!("CVE-2024-{}", i), Severity::Critical))
            .collect();
        let entry = build_reputation(&services, &vulnerabilities, 0);
        // services capped at -30, criticals capped at -30
        assert_eq!(entry.score, 40);
        assert_eq!(entry.status, ReputationStatus::Malicious);
        assert!(entry.details.ends_with(SEVERELY_DEGRADED));
    }
}
