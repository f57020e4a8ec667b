//! Deterministic 0-100 security score.

use std::collections::HashMap;
use std::sync::LazyLock;

use super::capped_penalty;
use crate::models::{RiskLevel, ServiceRecord, Severity, Vulnerability};

/// Penalty for each exposed port known to be risky.
static PORT_PENALTIES: LazyLock<HashMap<u16, u32>> = LazyLock::new(|| {
    HashMap::from([
        (23, 15),
        (21, 10),
        (445, 8),
        (135, 8),
        (3389, 10),
        (5900, 10),
        (22, 5),
        (3306, 8),
        (5432, 8),
        (27017, 10),
        (6379, 10),
    ])
});

/// Per-finding penalty and cap for each severity.
const fn severity_penalty(severity: Severity) -> (u32, u32) {
    match severity {
        Severity::Critical => (15, 30),
        Severity::High => (10, 30),
        Severity::Medium => (5, 20),
        Severity::Low => (2, 10),
    }
}

/// Attack surface penalty; each threshold passed adds its amount.
const OPEN_PORT_THRESHOLDS: [(usize, u32); 3] = [(10, 5), (20, 10), (50, 15)];

pub fn calculate_score(services: &[ServiceRecord], vulnerabilities: &[Vulnerability]) -> u8 {
    let port_penalty: u32 = services
        .iter()
        .filter_map(|service| PORT_PENALTIES.get(&service.port))
        .sum();

    let unversioned = services.iter().filter(|s| !s.has_version()).count() as u32;

    let surface_penalty: u32 = OPEN_PORT_THRESHOLDS
        .iter()
        .filter(|(threshold, _)| services.len() > *threshold)
        .map(|(_, penalty)| penalty)
        .sum();

    let vulnerability_penalty: u32 = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ]
    .into_iter()
    .map(|severity| {
        let count = vulnerabilities
            .iter()
            .filter(|v| v.severity == severity)
            .count();
        let (each, cap) = severity_penalty(severity);
        capped_penalty(count, each, cap)
    })
    .sum();

    let total = port_penalty + unversioned + surface_penalty + vulnerability_penalty;
    let score = 100u32.saturating_sub(total) as u8;

    log::debug!(
        "Score {}: ports -{}, unversioned -{}, surface -{}, vulnerabilities -{}",
        score,
        port_penalty,
        unversioned,
        surface_penalty,
        vulnerability_penalty
    );
    score
}

pub fn classify_risk(score: u8) -> RiskLevel {
    RiskLevel::from_score(score)
}
