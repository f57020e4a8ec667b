// Shared test doubles for the analysis collaborators.
//
// Each integration test file includes this module with `mod helpers;`, so not
// every helper is used by every file.
#![allow(dead_code)]

use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use posture_analyzer::dns::HostResolver;
use posture_analyzer::enrichment::{GeoLocator, NetworkOwnership, NetworkOwnershipSource};
use posture_analyzer::geoip::GeoIpResult;
use posture_analyzer::models::{Protocol, ServiceRecord, Severity, Vulnerability};
use posture_analyzer::scan::PortScanner;
use posture_analyzer::vuln::VulnerabilitySource;
use posture_analyzer::{AnalysisError, Analyzer, Collaborators, RequestBudget, SourceFailure};
use tokio_util::sync::CancellationToken;

/// Resolves every name to one address, or fails every lookup.
pub struct StaticResolver(pub Option<IpAddr>);

#[async_trait]
impl HostResolver for StaticResolver {
    async fn resolve(&self, host: &str) -> anyhow::Result<IpAddr> {
        self.0
            .ok_or_else(|| anyhow::anyhow!("NXDOMAIN: {}", host))
    }
}

/// Returns a fixed scan result and records the scanned addresses.
pub struct FixedScanner {
    result: Result<Vec<ServiceRecord>, AnalysisError>,
    pub scanned: Mutex<Vec<String>>,
}

impl FixedScanner {
    pub fn services(services: Vec<ServiceRecord>) -> Self {
        Self {
            result: Ok(services),
            scanned: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: AnalysisError) -> Self {
        Self {
            result: Err(error),
            scanned: Mutex::new(Vec::new()),
        }
    }

    pub fn scan_count(&self) -> usize {
        self.scanned.lock().expect("lock").len()
    }
}

#[async_trait]
impl PortScanner for FixedScanner {
    async fn scan(&self, ip: &str) -> Result<Vec<ServiceRecord>, AnalysisError> {
        self.scanned.lock().expect("lock").push(ip.to_string());
        self.result.clone()
    }
}

/// Answers by the first registered fragment contained in the platform id.
/// Unmatched ids have no vulnerabilities.
#[derive(Default)]
pub struct FragmentSource {
    answers: Vec<(String, Result<Vec<Vulnerability>, SourceFailure>)>,
    pub calls: AtomicUsize,
}

impl FragmentSource {
    pub fn answer(
        mut self,
        fragment: &str,
        answer: Result<Vec<Vulnerability>, SourceFailure>,
    ) -> Self {
        self.answers.push((fragment.to_string(), answer));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VulnerabilitySource for FragmentSource {
    async fn fetch(&self, platform_id: &str) -> Result<Vec<Vulnerability>, SourceFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers
            .iter()
            .find(|(fragment, _)| platform_id.contains(fragment.as_str()))
            .map(|(_, answer)| answer.clone())
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

pub struct FixedLocator(pub Option<GeoIpResult>);

impl GeoLocator for FixedLocator {
    fn locate(&self, _ip: &str) -> Option<GeoIpResult> {
        self.0.clone()
    }
}

pub struct FixedOwnership(pub Result<Option<NetworkOwnership>, SourceFailure>);

#[async_trait]
impl NetworkOwnershipSource for FixedOwnership {
    async fn lookup(&self, _ip: &str) -> Result<Option<NetworkOwnership>, SourceFailure> {
        self.0.clone()
    }
}

/// Collaborators that panic on every call.
pub struct PanickingSource;

#[async_trait]
impl VulnerabilitySource for PanickingSource {
    async fn fetch(&self, platform_id: &str) -> Result<Vec<Vulnerability>, SourceFailure> {
        panic!("unexpected payload for {}", platform_id)
    }
}

pub struct PanickingLocator;

impl GeoLocator for PanickingLocator {
    fn locate(&self, ip: &str) -> Option<GeoIpResult> {
        panic!("corrupt location record for {}", ip)
    }
}

pub struct PanickingOwnership;

#[async_trait]
impl NetworkOwnershipSource for PanickingOwnership {
    async fn lookup(&self, ip: &str) -> Result<Option<NetworkOwnership>, SourceFailure> {
        panic!("corrupt ownership record for {}", ip)
    }
}

pub fn mountain_view() -> GeoIpResult {
    GeoIpResult {
        country_code: Some("US".to_string()),
        country_name: Some("United States".to_string()),
        region: Some("California".to_string()),
        city: Some("Mountain View".to_string()),
        latitude: Some(37.386),
        longitude: Some(-122.0838),
        timezone: Some("America/Los_Angeles".to_string()),
    }
}

pub fn google() -> NetworkOwnership {
    NetworkOwnership {
        asn: Some("AS15169".to_string()),
        org: Some("Google Public DNS".to_string()),
        isp: Some("Google LLC".to_string()),
    }
}

pub fn vulnerability(id: &str, severity: Severity, cvss: f64) -> Vulnerability {
    Vulnerability {
        id: id.to_string(),
        title: id.to_string(),
        severity,
        cvss_score: cvss,
        description: format!("{} description", id),
        remediation: "Consult the vendor advisory or apply available patches.".to_string(),
        references: vec![format!("https://nvd.nist.gov/vuln/detail/{}", id)],
    }
}

pub fn service(port: u16, protocol: Protocol, name: &str, version: Option<&str>) -> ServiceRecord {
    ServiceRecord::new(port, protocol, name).with_version(version.map(str::to_string))
}

/// Collaborators with a located, owned address and an empty vulnerability source.
pub fn collaborators(scanner: Arc<dyn PortScanner>) -> Collaborators {
    Collaborators {
        resolver: Arc::new(StaticResolver(Some("93.184.216.34".parse().expect("ip")))),
        scanner,
        vulnerabilities: Arc::new(FragmentSource::default()),
        geolocation: Arc::new(FixedLocator(Some(mountain_view()))),
        ownership: Arc::new(FixedOwnership(Ok(Some(google())))),
    }
}

pub fn analyzer(collaborators: Collaborators) -> Analyzer {
    Analyzer::new(collaborators, 2)
}

pub fn budget() -> RequestBudget {
    RequestBudget::new(Duration::from_secs(60), CancellationToken::new())
}
