//! Target resolution.
//!
//! Turns a validated query into the concrete address that will be scanned.
//! Domains are resolved through DNS; IPs and ASNs are used as given.

use crate::dns::HostResolver;
use crate::error_handling::AnalysisError;
use crate::models::{Target, TargetType};

/// Resolves `query` (already validated for `target_type`) into a `Target`.
///
/// # Errors
///
/// A domain that does not resolve is fatal: `INVALID_INPUT`.
pub async fn resolve_target(
    query: &str,
    target_type: TargetType,
    resolver: &dyn HostResolver,
) -> Result<Target, AnalysisError> {
    let query = query.trim();
    match target_type {
        TargetType::Domain => {
            let ip = resolver.resolve(query).await.map_err(|e| {
                log::error!("DNS resolution failed for {}: {}", query, e);
                AnalysisError::invalid_input(
                    format!("Could not resolve domain '{}'", query),
                    e.to_string(),
                )
            })?;
            log::info!("Resolved {} to {}", query, ip);
            Ok(Target {
                query: query.to_string(),
                target_type,
                ip: ip.to_string(),
                domain: Some(query.to_string()),
            })
        }
        TargetType::Ipv4 | TargetType::Ipv6 | TargetType::Asn => Ok(Target {
            query: query.to_string(),
            target_type,
            ip: query.to_string(),
            domain: None,
        }),
    }
}
