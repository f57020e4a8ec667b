//! Hostname resolution.
//!
//! This module resolves hostnames to IP addresses. Lookups go through the
//! `HostResolver` trait so the pipeline can run against a canned resolver.

use std::net::IpAddr;

use anyhow::{Error, Result};
use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;

/// Forward DNS lookup.
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Returns the first address the name resolves to.
    async fn resolve(&self, host: &str) -> Result<IpAddr>;
}

#[async_trait]
impl HostResolver for TokioAsyncResolver {
    async fn resolve(&self, host: &str) -> Result<IpAddr> {
        resolve_host_to_ip(host, self).await
    }
}

/// Resolves a hostname to an IP address using DNS.
///
/// # Arguments
///
/// * `host` - The hostname to resolve
/// * `resolver` - The DNS resolver instance
///
/// # Returns
///
/// The first IP address found, or an error if resolution fails.
///
/// # Errors
///
/// Returns an error if DNS resolution fails or no IP addresses are found.
pub async fn resolve_host_to_ip(host: &str, resolver: &TokioAsyncResolver) -> Result<IpAddr, Error> {
    let response = resolver.lookup_ip(host).await.map_err(Error::new)?;
    response
        .iter()
        .next()
        .ok_or_else(|| Error::msg("No IP addresses found"))
}
