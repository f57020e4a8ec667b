//! NVD CVE API 2.0 client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::parse::parse_nvd_response;
use super::VulnerabilitySource;
use crate::config::{Config, NVD_API_KEY_HEADER};
use crate::error_handling::{categorize_reqwest_error, categorize_status, SourceFailure};
use crate::models::Vulnerability;

/// Queries the NVD for the vulnerabilities of one CPE platform id.
///
/// Only timeouts, rate limiting and connection failures are reported as
/// `SourceFailure`s; any other unsuccessful response means "no data".
#[derive(Debug, Clone)]
pub struct NvdClient {
    client: Arc<reqwest::Client>,
    base_url: String,
    api_key: Option<String>,
    results_per_page: u32,
    timeout: Duration,
}

impl NvdClient {
    pub fn new(client: Arc<reqwest::Client>, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: None,
            results_per_page: crate::config::NVD_RESULTS_PER_PAGE,
            timeout,
        }
    }

    pub fn from_config(client: Arc<reqwest::Client>, config: &Config) -> Self {
        Self::new(client, config.nvd_url.clone(), config.nvd_timeout())
            .with_api_key(config.nvd_api_key.clone())
            .with_results_per_page(config.nvd_results_per_page)
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    pub fn with_results_per_page(mut self, results_per_page: u32) -> Self {
        self.results_per_page = results_per_page.max(1);
        self
    }
}

#[async_trait]
impl VulnerabilitySource for NvdClient {
    async fn fetch(&self, platform_id: &str) -> Result<Vec<Vulnerability>, SourceFailure> {
        let results_per_page = self.results_per_page.to_string();
        let mut request = self
            .client
            .get(&self.base_url)
            .query(&[
                ("cpeName", platform_id),
                ("resultsPerPage", results_per_page.as_str()),
            ])
            .timeout(self.timeout);
        if let Some(api_key) = &self.api_key {
            request = request.header(NVD_API_KEY_HEADER, api_key);
        }

        log::debug!("Querying NVD for {}", platform_id);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                return match categorize_reqwest_error(&e) {
                    Some(failure) => Err(failure),
                    None => {
                        log::warn!("NVD request for {} failed: {}", platform_id, e);
                        Ok(Vec::new())
                    }
                }
            }
        };

        let status = response.status();
        if !status.is_success() {
            if let Some(failure) = categorize_status(status, response.headers()) {
                return Err(failure);
            }
            log::warn!("NVD returned HTTP {} for {}", status.as_u16(), platform_id);
            return Ok(Vec::new());
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if e.is_timeout() => return Err(SourceFailure::Timeout),
            Err(e) => {
                log::warn!("Could not read NVD response for {}: {}", platform_id, e);
                return Ok(Vec::new());
            }
        };

        let vulnerabilities = parse_nvd_response(&body);
        log::debug!(
            "NVD returned {} vulnerabilit{} for {}",
            vulnerabilities.len(),
            if vulnerabilities.len() == 1 { "y" } else { "ies" },
            platform_id
        );
        Ok(vulnerabilities)
    }
}
