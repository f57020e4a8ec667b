//! Heuristic initial risk of an open port.

use crate::models::RiskLevel;

/// Risk assigned to a service before any vulnerability evidence.
///
/// Cleartext or remote-admin protocols (FTP, Telnet, RDP) and exposed
/// databases start high; SSH and plain HTTP start medium; HTTPS starts low.
/// Unlisted ports start medium.
pub fn initial_risk(port: u16) -> RiskLevel {
    match port {
        21 | 23 | 3389 => RiskLevel::High,
        3306 | 5432 | 27017 | 6379 => RiskLevel::High,
        22 | 80 | 8080 => RiskLevel::Medium,
        443 => RiskLevel::Low,
        _ => RiskLevel::Medium,
    }
}
