//! Service to platform-identifier (CPE 2.3) mapping.

/// A product the vulnerability database can be queried for.
struct PlatformRule {
    /// Substring of the scanner's service name
    service_hint: &'static str,
    /// Substring of the scanner's product/version string
    product_hint: &'static str,
    vendor: &'static str,
    product: &'static str,
}

const PLATFORM_RULES: [PlatformRule; 3] = [
    PlatformRule {
        service_hint: "ssh",
        product_hint: "OpenSSH",
        vendor: "openbsd",
        product: "openssh",
    },
    PlatformRule {
        service_hint: "http",
        product_hint: "Apache",
        vendor: "apache",
        product: "http_server",
    },
    PlatformRule {
        service_hint: "http",
        product_hint: "nginx",
        vendor: "nginx",
        product: "nginx",
    },
];

/// Builds the CPE 2.3 platform id of a service, if it is a known product
/// with a recognizable version number.
///
/// ```
/// use posture_analyzer::vuln::platform_id_for;
///
/// assert_eq!(
///     platform_id_for("ssh", Some("OpenSSH 8.2p1 Ubuntu 4ubuntu0.5")).as_deref(),
///     Some("cpe:2.3:a:openbsd:openssh:8.2:*:*:*:*:*:*:*")
/// );
/// assert_eq!(platform_id_for("domain", None), None);
/// ```
pub fn platform_id_for(service_name: &str, version: Option<&str>) -> Option<String> {
    let version = version?;
    let rule = PLATFORM_RULES.iter().find(|rule| {
        service_name.contains(rule.service_hint) && version.contains(rule.product_hint)
    })?;
    let number = version_number(version)?;
    Some(format!(
        "cpe:2.3:a:{}:{}:{}:*:*:*:*:*:*:*",
        rule.vendor, rule.product, number
    ))
}

/// Leading dotted-numeric part of the first token that starts with a digit.
///
/// `"OpenSSH 8.2p1 Ubuntu"` gives `"8.2"`, `"nginx 1.18.0"` gives `"1.18.0"`.
fn version_number(version: &str) -> Option<String> {
    let token = version
        .split_whitespace()
        .find(|token| token.starts_with(|c: char| c.is_ascii_digit()))?;
    let number: String = token
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let number = number.trim_end_matches('.');
    (!number.is_empty()).then(|| number.to_string())
}
