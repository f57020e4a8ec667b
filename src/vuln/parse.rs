//! NVD CVE API 2.0 response parsing.

use serde::Deserialize;

use crate::config::MAX_VULNERABILITY_REFERENCES;
use crate::models::{Severity, Vulnerability};

const NO_DESCRIPTION: &str = "No description available";
const UNKNOWN_ID: &str = "Unknown";
const GENERIC_REMEDIATION: &str = "Consult the vendor advisory or apply available patches.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NvdResponse {
    #[serde(default)]
    total_results: u64,
    // Kept raw so one malformed entry does not discard the page
    #[serde(default)]
    vulnerabilities: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CveItem {
    cve: CveRecord,
}

#[derive(Debug, Deserialize)]
struct CveRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    descriptions: Vec<Description>,
    #[serde(default)]
    metrics: Option<Metrics>,
    #[serde(default)]
    references: Vec<Reference>,
}

#[derive(Debug, Deserialize)]
struct Description {
    #[serde(default)]
    lang: Option<String>,
    value: String,
}

#[derive(Debug, Default, Deserialize)]
struct Metrics {
    #[serde(rename = "cvssMetricV31", default)]
    v31: Vec<CvssMetric>,
    #[serde(rename = "cvssMetricV30", default)]
    v30: Vec<CvssMetric>,
    #[serde(rename = "cvssMetricV2", default)]
    v2: Vec<CvssMetric>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CvssMetric {
    cvss_data: CvssData,
    /// v2 carries the severity label on the metric, not in cvssData
    #[serde(default)]
    base_severity: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CvssData {
    base_score: f64,
    #[serde(default)]
    base_severity: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Reference {
    #[serde(default)]
    url: Option<String>,
}

/// Parses an NVD response body into vulnerabilities.
///
/// An unparsable body or `totalResults == 0` yields no vulnerabilities.
/// Individual malformed entries are skipped.
pub fn parse_nvd_response(body: &str) -> Vec<Vulnerability> {
    let response: NvdResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(e) => {
            log::warn!("Discarding unparsable NVD response: {}", e);
            return Vec::new();
        }
    };

    if response.total_results == 0 {
        return Vec::new();
    }

    response
        .vulnerabilities
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<CveItem>(entry) {
            Ok(item) => Some(to_vulnerability(item.cve)),
            Err(e) => {
                log::debug!("Skipping malformed CVE entry: {}", e);
                None
            }
        })
        .collect()
}

fn to_vulnerability(cve: CveRecord) -> Vulnerability {
    let id = cve
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_ID.to_string());

    let description = pick_description(&cve.descriptions)
        .unwrap_or(NO_DESCRIPTION)
        .to_string();

    let (cvss_score, severity) = cve
        .metrics
        .as_ref()
        .and_then(primary_score)
        .unwrap_or((0.0, Severity::Low));

    let references: Vec<String> = cve
        .references
        .into_iter()
        .filter_map(|reference| reference.url)
        .filter(|url| !url.trim().is_empty())
        .take(MAX_VULNERABILITY_REFERENCES)
        .collect();

    let remediation = if references.is_empty() {
        GENERIC_REMEDIATION.to_string()
    } else {
        format!("{} References: {}", GENERIC_REMEDIATION, references.join(", "))
    };

    Vulnerability {
        title: id.clone(),
        id,
        severity,
        cvss_score,
        description,
        remediation,
        references,
    }
}

/// English description when present, else the first one.
fn pick_description(descriptions: &[Description]) -> Option<&str> {
    descriptions
        .iter()
        .find(|d| d.lang.as_deref() == Some("en"))
        .or_else(|| descriptions.first())
        .map(|d| d.value.as_str())
        .filter(|value| !value.trim().is_empty())
}

/// Score and severity from the newest CVSS version present (v3.1, v3.0, v2).
fn primary_score(metrics: &Metrics) -> Option<(f64, Severity)> {
    let (metric, label) = if let Some(metric) = metrics.v31.first() {
        (metric, metric.cvss_data.base_severity.as_deref())
    } else if let Some(metric) = metrics.v30.first() {
        (metric, metric.cvss_data.base_severity.as_deref())
    } else {
        let metric = metrics.v2.first()?;
        (metric, metric.base_severity.as_deref())
    };

    let score = metric.cvss_data.base_score.clamp(0.0, 10.0);
    let severity = label
        .and_then(Severity::from_label)
        .unwrap_or_else(|| Severity::from_cvss(score));
    Some((score, severity))
}
