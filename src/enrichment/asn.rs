//! Network ownership from the ip-api.com JSON endpoint.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use super::{NetworkOwnership, NetworkOwnershipSource};
use crate::config::{Config, IPAPI_FIELDS};
use crate::error_handling::{categorize_reqwest_error, categorize_status, SourceFailure};
use crate::utils::compile_regex_unsafe;

static ASN_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(r"(?i)AS(\d+)", "ASN_NUMBER_RE"));

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(rename = "as", default)]
    asn: Option<String>,
    #[serde(default)]
    isp: Option<String>,
    #[serde(default)]
    org: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IpApiClient {
    client: Arc<reqwest::Client>,
    base_url: String,
    timeout: Duration,
}

impl IpApiClient {
    pub fn new(client: Arc<reqwest::Client>, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn from_config(client: Arc<reqwest::Client>, config: &Config) -> Self {
        Self::new(client, config.ipapi_url.clone(), config.ipapi_timeout())
    }

    fn lookup_url(&self, ip: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), ip.trim())
    }
}

/// Reduces an ip-api `as` value ("AS15169 Google LLC") to "AS15169".
///
/// Values without an `AS<digits>` token are returned trimmed.
pub fn normalize_asn(raw: &str) -> String {
    ASN_NUMBER_RE
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .map(|number| format!("AS{}", number.as_str()))
        .unwrap_or_else(|| raw.trim().to_string())
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl NetworkOwnershipSource for IpApiClient {
    async fn lookup(&self, ip: &str) -> Result<Option<NetworkOwnership>, SourceFailure> {
        let response = match self
            .client
            .get(self.lookup_url(ip))
            .query(&[("fields", IPAPI_FIELDS)])
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return match categorize_reqwest_error(&e) {
                    Some(failure) => Err(failure),
                    None => {
                        log::warn!("ip-api request for {} failed: {}", ip, e);
                        Ok(None)
                    }
                }
            }
        };

        let status = response.status();
        if !status.is_success() {
            if let Some(failure) = categorize_status(status, response.headers()) {
                return Err(failure);
            }
            log::warn!("ip-api returned HTTP {} for {}", status.as_u16(), ip);
            return Ok(None);
        }

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) if e.is_timeout() => return Err(SourceFailure::Timeout),
            Err(e) => {
                log::warn!("Could not read ip-api response for {}: {}", ip, e);
                return Ok(None);
            }
        };
        let body: IpApiResponse = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(e) => {
                log::warn!("Could not parse ip-api response for {}: {}", ip, e);
                return Ok(None);
            }
        };

        if body.status != "success" {
            log::debug!(
                "ip-api has no data for {}: {}",
                ip,
                body.message.as_deref().unwrap_or("no message")
            );
            return Ok(None);
        }

        let isp = present(body.isp);
        let org = present(body.org).or_else(|| isp.clone());
        let asn = present(body.asn).map(|raw| normalize_asn(&raw));

        Ok(Some(NetworkOwnership { asn, org, isp }))
    }
}
