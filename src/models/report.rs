//! Report entities.
//!
//! Every entity is created fresh for one request and serialized with the
//! camelCase field names of the HTTP API.

use serde::{Deserialize, Serialize};

use super::types::{
    Category, Priority, Protocol, ReputationStatus, RiskLevel, Severity, TargetType,
};
use crate::config::{DEFAULT_TIMEZONE, UNKNOWN, UNKNOWN_COUNTRY_CODE};

/// Body of `POST /api/analysis/analyze`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisRequest {
    pub query: String,
    #[serde(rename = "type")]
    pub target_type: TargetType,
}

/// The concrete target of one analysis. Immutable after resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub query: String,
    pub target_type: TargetType,
    pub ip: String,
    /// Set only when the address was obtained through DNS.
    pub domain: Option<String>,
}

impl Target {
    pub fn was_resolved(&self) -> bool {
        self.domain.is_some()
    }
}

/// An open port and the service the scanner identified on it.
///
/// `risk_level` only ever moves upward after construction, and
/// `vulnerability_ids` never holds the same id twice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    pub port: u16,
    pub protocol: Protocol,
    #[serde(rename = "service")]
    pub service_name: String,
    pub version: Option<String>,
    pub banner: Option<String>,
    pub platform_id: Option<String>,
    #[serde(rename = "vulnerabilities")]
    vulnerability_ids: Vec<String>,
    risk_level: RiskLevel,
}

impl ServiceRecord {
    /// Creates a record with the heuristic initial risk of its port.
    pub fn new(port: u16, protocol: Protocol, service_name: impl Into<String>) -> Self {
        Self {
            port,
            protocol,
            service_name: service_name.into(),
            version: None,
            banner: None,
            platform_id: None,
            vulnerability_ids: Vec::new(),
            risk_level: crate::scan::initial_risk(port),
        }
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    pub fn with_banner(mut self, banner: Option<String>) -> Self {
        self.banner = banner;
        self
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    /// Raises the risk level to `level`; a lower level is ignored.
    pub fn escalate_risk(&mut self, level: RiskLevel) {
        self.risk_level = self.risk_level.max(level);
    }

    pub fn vulnerability_ids(&self) -> &[String] {
        &self.vulnerability_ids
    }

    /// Appends `id` unless already present. Returns whether it was added.
    pub fn record_vulnerability(&mut self, id: &str) -> bool {
        if self.vulnerability_ids.iter().any(|existing| existing == id) {
            return false;
        }
        self.vulnerability_ids.push(id.to_string());
        true
    }

    /// Drops every vulnerability link. The risk level is kept.
    pub fn clear_vulnerabilities(&mut self) {
        self.vulnerability_ids.clear();
    }

    /// True when the scanner reported a product/version string.
    pub fn has_version(&self) -> bool {
        self.version
            .as_deref()
            .is_some_and(|version| !version.trim().is_empty())
    }
}

/// A known vulnerability correlated with one or more services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    pub id: String,
    pub title: String,
    pub severity: Severity,
    #[serde(rename = "cvss")]
    pub cvss_score: f64,
    pub description: String,
    #[serde(rename = "solution")]
    pub remediation: String,
    pub references: Vec<String>,
}

/// Geolocation and network ownership of the analyzed address.
///
/// Fields a source cannot provide hold sentinels, never null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeoInfo {
    pub country: String,
    pub country_code: String,
    pub region: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub isp: String,
    pub asn: String,
    pub org: String,
}

impl Default for GeoInfo {
    fn default() -> Self {
        Self {
            country: UNKNOWN.to_string(),
            country_code: UNKNOWN_COUNTRY_CODE.to_string(),
            region: UNKNOWN.to_string(),
            city: UNKNOWN.to_string(),
            latitude: 0.0,
            longitude: 0.0,
            timezone: DEFAULT_TIMEZONE.to_string(),
            isp: UNKNOWN.to_string(),
            asn: UNKNOWN.to_string(),
            org: UNKNOWN.to_string(),
        }
    }
}

impl GeoInfo {
    /// Neither country nor city could be determined.
    pub fn is_location_unknown(&self) -> bool {
        self.country == UNKNOWN && self.city == UNKNOWN
    }

    /// Resets the ownership fields to their sentinels.
    pub fn clear_ownership(&mut self) {
        self.isp = UNKNOWN.to_string();
        self.asn = UNKNOWN.to_string();
        self.org = UNKNOWN.to_string();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReputationEntry {
    pub source: String,
    #[serde(rename = "name")]
    pub label: String,
    pub status: ReputationStatus,
    pub score: u8,
    pub details: String,
    /// Epoch milliseconds.
    #[serde(rename = "lastChecked")]
    pub checked_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: Category,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    /// Milliseconds from pipeline start to assembly.
    #[serde(rename = "scanDuration")]
    pub scan_duration_ms: u64,
    pub sources_used: Vec<String>,
    pub cached: bool,
    pub warnings: Vec<String>,
}

/// The composite security posture of one target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub ip: String,
    pub domain: Option<String>,
    #[serde(rename = "type")]
    pub target_type: TargetType,
    pub security_score: u8,
    pub risk_level: RiskLevel,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub services: Vec<ServiceRecord>,
    #[serde(rename = "geolocation")]
    pub geo: GeoInfo,
    pub reputation: Vec<ReputationEntry>,
    pub vulnerabilities: Vec<Vulnerability>,
    pub recommendations: Vec<Recommendation>,
    pub metadata: ReportMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_record_initial_risk_from_port() {
        assert_eq!(
            ServiceRecord::new(23, Protocol::Tcp, "telnet").risk_level(),
            RiskLevel::High
        );
        assert_eq!(
            ServiceRecord::new(443, Protocol::Tcp, "https").risk_level(),
            RiskLevel::Low
        );
        assert_eq!(
            ServiceRecord::new(9999, Protocol::Tcp, "abyss").risk_level(),
            RiskLevel::Medium
        );
    }

    #[test]
    fn test_escalate_risk_never_lowers() {
        let mut service = ServiceRecord::new(22, Protocol::Tcp, "ssh");
        assert_eq!(service.risk_level(), RiskLevel::Medium);

        service.escalate_risk(RiskLevel::Low);
        assert_eq!(service.risk_level(), RiskLevel::Medium, "must not lower");

        service.escalate_risk(RiskLevel::High);
        assert_eq!(service.risk_level(), RiskLevel::High);

        service.escalate_risk(RiskLevel::Medium);
        assert_eq!(service.risk_level(), RiskLevel::High, "must not lower");
    }

    #[test]
    fn test_record_vulnerability_deduplicates() {
        let mut service = ServiceRecord::new(443, Protocol::Tcp, "https");
        assert!(service.record_vulnerability("CVE-2021-23017"));
        assert!(!service.record_vulnerability("CVE-2021-23017"));
        assert!(service.record_vulnerability("CVE-2019-20372"));
        assert_eq!(
            service.vulnerability_ids(),
            &["CVE-2021-23017".to_string(), "CVE-2019-20372".to_string()]
        );
    }

    #[test]
    fn test_has_version() {
        let service = ServiceRecord::new(53, Protocol::Udp, "domain");
        assert!(!service.has_version());
        let service = service.with_version(Some("   ".to_string()));
        assert!(!service.has_version());
        let service = service.with_version(Some("ISC BIND 9.16".to_string()));
        assert!(service.has_version());
    }

    #[test]
    fn test_geo_info_defaults_are_sentinels() {
        let geo = GeoInfo::default();
        assert_eq!(geo.country, "Unknown");
        assert_eq!(geo.country_code, "--");
        assert_eq!(geo.timezone, "UTC");
        assert_eq!(geo.latitude, 0.0);
        assert_eq!(geo.asn, "Unknown");
        assert!(geo.is_location_unknown());
    }

    #[test]
    fn test_service_record_wire_format() {
        let mut service = ServiceRecord::new(443, Protocol::Tcp, "https")
            .with_version(Some("nginx 1.18.0".to_string()));
        service.platform_id = Some("cpe:2.3:a:nginx:nginx:1.18.0:*:*:*:*:*:*:*".to_string());
        service.record_vulnerability("CVE-2021-23017");

        let json = serde_json::to_value(&service).expect("serialize");
        assert_eq!(json["port"], 443);
        assert_eq!(json["protocol"], "tcp");
        assert_eq!(json["service"], "https");
        assert_eq!(json["version"], "nginx 1.18.0");
        assert!(json["banner"].is_null());
        assert_eq!(
            json["platformId"],
            "cpe:2.3:a:nginx:nginx:1.18.0:*:*:*:*:*:*:*"
        );
        assert_eq!(json["vulnerabilities"][0], "CVE-2021-23017");
        assert_eq!(json["riskLevel"], "low");
    }

    #[test]
    fn test_analysis_request_uses_type_field() {
        let request: AnalysisRequest =
            serde_json::from_str(r#"{"query":"8.8.8.8","type":"ipv4"}"#).expect("deserialize");
        assert_eq!(request.query, "8.8.8.8");
        assert_eq!(request.target_type, TargetType::Ipv4);
    }
}
