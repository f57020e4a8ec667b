//! Query format validation.
//!
//! Checks that a query matches its declared type before any stage runs:
//! - `ipv4`: dotted-quad IPv4 address
//! - `ipv6`: IPv6 address in any textual form `std::net` accepts
//! - `asn`: `AS` followed by 1-10 digits
//! - `domain`: hostname syntax (labels of 1-63 chars, alphabetic TLD, 253 max)

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use regex::Regex;

use crate::error_handling::AnalysisError;
use crate::models::TargetType;
use crate::utils::compile_regex_unsafe;

const MAX_DOMAIN_LENGTH: usize = 253;

const ASN_QUERY_PATTERN: &str = r"^AS[0-9]{1,10}$";
const DOMAIN_QUERY_PATTERN: &str =
    r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$";

static ASN_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(ASN_QUERY_PATTERN, "ASN_RE"));
static DOMAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(DOMAIN_QUERY_PATTERN, "DOMAIN_RE"));

/// Validates `query` against `target_type` and returns it trimmed.
///
/// # Errors
///
/// Returns an `INVALID_INPUT` error naming the expected format.
pub fn validate_query(query: &str, target_type: TargetType) -> Result<String, AnalysisError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AnalysisError::invalid_input(
            "The query must not be empty",
            "empty query",
        ));
    }

    let valid = match target_type {
        TargetType::Ipv4 => query.parse::<Ipv4Addr>().is_ok(),
        TargetType::Ipv6 => query.parse::<Ipv6Addr>().is_ok(),
        TargetType::Asn => ASN_RE.is_match(query),
        TargetType::Domain => query.len() <= MAX_DOMAIN_LENGTH && DOMAIN_RE.is_match(query),
    };

    if valid {
        Ok(query.to_string())
    } else {
        Err(AnalysisError::invalid_input(
            format!("'{}' is not a valid {}", query, expected_format(target_type)),
            format!("query {:?} rejected for type {}", query, target_type),
        ))
    }
}

fn expected_format(target_type: TargetType) -> &'static str {
    match target_type {
        TargetType::Ipv4 => "IPv4 address (e.g. 8.8.8.8)",
        TargetType::Ipv6 => "IPv6 address (e.g. 2001:4860:4860::8888)",
        TargetType::Asn => "ASN (e.g. AS15169)",
        TargetType::Domain => "domain name (e.g. example.com)",
    }
}
