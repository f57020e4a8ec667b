//! Enumerations shared by the report and the pipeline stages.

use serde::{Deserialize, Serialize};
use strum_macros::{Display as DisplayMacro, EnumIter as EnumIterMacro};

/// Declared type of the analyzed query.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIterMacro, DisplayMacro,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TargetType {
    Ipv4,
    Ipv6,
    Asn,
    Domain,
}

/// Transport protocol of a discovered service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, DisplayMacro)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    /// "udp" (any case) is UDP; everything else is TCP.
    pub fn from_scanner(value: &str) -> Self {
        if value.eq_ignore_ascii_case("udp") {
            Protocol::Udp
        } else {
            Protocol::Tcp
        }
    }
}

/// Risk level of a service or of the whole target.
///
/// Ordered `Low < Medium < High`, so escalation is a `max`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, DisplayMacro,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Band of the 0-100 security score: >=80 low, >=60 medium, else high.
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => RiskLevel::Low,
            60..=79 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }

    /// Minimum service risk implied by the highest CVSS found on it.
    ///
    /// 9.0 and above demands high; 4.0 and above demands at least medium.
    pub fn floor_for_cvss(max_cvss: f64) -> Option<Self> {
        if max_cvss >= 9.0 {
            Some(RiskLevel::High)
        } else if max_cvss >= 4.0 {
            Some(RiskLevel::Medium)
        } else {
            None
        }
    }
}

/// Severity of a vulnerability as labeled by the vulnerability database.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumIterMacro,
    DisplayMacro,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Parses an NVD severity label ("CRITICAL", "High", ...).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" => Some(Severity::Critical),
            "high" => Some(Severity::High),
            "medium" | "moderate" => Some(Severity::Medium),
            "low" | "none" => Some(Severity::Low),
            _ => None,
        }
    }

    /// CVSS v3 qualitative rating of a base score.
    pub fn from_cvss(score: f64) -> Self {
        if score >= 9.0 {
            Severity::Critical
        } else if score >= 7.0 {
            Severity::High
        } else if score >= 4.0 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

/// Reputation verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, DisplayMacro)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReputationStatus {
    Clean,
    Suspicious,
    Malicious,
    Unknown,
}

impl ReputationStatus {
    /// >=80 clean, >=60 suspicious, else malicious.
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => ReputationStatus::Clean,
            60..=79 => ReputationStatus::Suspicious,
            _ => ReputationStatus::Malicious,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, DisplayMacro)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, DisplayMacro)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    Network,
    Service,
    Configuration,
    Security,
}
