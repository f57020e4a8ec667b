//! Prioritized remediation items.

use crate::models::{Category, Priority, Recommendation, ServiceRecord, Severity, Vulnerability};

const DATABASE_PORTS: [u16; 4] = [3306, 5432, 27017, 6379];
const REMOTE_ADMIN_PORTS: [u16; 2] = [22, 3389];
const AUDIT_THRESHOLD: u8 = 60;

fn recommendation(
    title: impl Into<String>,
    description: impl Into<String>,
    priority: Priority,
    category: Category,
) -> Recommendation {
    Recommendation {
        title: title.into(),
        description: description.into(),
        priority,
        category,
    }
}

fn priority_for(severity: Severity) -> Priority {
    match severity {
        Severity::Critical | Severity::High => Priority::High,
        Severity::Medium => Priority::Medium,
        Severity::Low => Priority::Low,
    }
}

fn for_vulnerability(vulnerability: &Vulnerability) -> Recommendation {
    let id = &vulnerability.id;
    let (title, fallback) = match vulnerability.severity {
        Severity::Critical => (
            format!("Mitigate critical vulnerability {}", id),
            format!(
                "Critical vulnerability {} must be mitigated immediately. Upgrade the affected \
                 software to a fixed release and follow the vendor guidance.",
                id
            ),
        ),
        Severity::High => (
            format!("Mitigate high severity vulnerability {}", id),
            format!(
                "Vulnerability {} has high severity. Schedule its fix with priority by updating \
                 the affected service and applying the available patches.",
                id
            ),
        ),
        Severity::Medium => (
            format!("Review vulnerability {}", id),
            format!(
                "Vulnerability {} has medium severity. Plan its mitigation in the short term, \
                 starting with Internet-facing systems.",
                id
            ),
        ),
        Severity::Low => (
            format!("Monitor low impact vulnerability {}", id),
            format!(
                "Vulnerability {} has low impact. Track it and apply patches during regular \
                 maintenance windows.",
                id
            ),
        ),
    };

    let description = if vulnerability.remediation.trim().is_empty() {
        fallback
    } else {
        vulnerability.remediation.clone()
    };
    recommendation(
        title,
        description,
        priority_for(vulnerability.severity),
        Category::Service,
    )
}

/// Product part of a scanner version string ("nginx 1.18.0" is "nginx").
fn product_name(service: &ServiceRecord) -> &str {
    service
        .version
        .as_deref()
        .and_then(|version| version.split_whitespace().next())
        .unwrap_or(&service.service_name)
}

fn for_vulnerable_service(service: &ServiceRecord) -> Option<Recommendation> {
    if service.platform_id.is_none() || service.vulnerability_ids().is_empty() {
        return None;
    }
    let product = product_name(service);
    Some(recommendation(
        format!("Update {} on port {}/{}", product, service.port, service.protocol),
        format!(
            "{} on port {}/{} is affected by {}. Upgrade it to a patched release.",
            service.version.as_deref().unwrap_or(product),
            service.port,
            service.protocol,
            service.vulnerability_ids().join(", ")
        ),
        Priority::High,
        Category::Service,
    ))
}

fn exposes(services: &[ServiceRecord], ports: &[u16]) -> bool {
    services.iter().any(|s| ports.contains(&s.port))
}

fn attack_surface(open: usize) -> Option<Recommendation> {
    if open <= 10 {
        return None;
    }
    let assessment = if open > 50 {
        "The number of exposed services is very high and significantly widens the attack surface."
    } else if open > 20 {
        "A considerable number of services is exposed."
    } else {
        "Some exposed services are possibly unnecessary."
    };
    let priority = if open > 20 {
        Priority::High
    } else {
        Priority::Medium
    };
    Some(recommendation(
        "Reduce attack surface (open ports)",
        format!(
            "{} ports/services are exposed to the Internet. {} Review the list and close or \
             filter every service that is not strictly required.",
            open, assessment
        ),
        priority,
        Category::Network,
    ))
}

/// Builds the remediation list, deduplicated by title with the first
/// occurrence kept.
pub fn build_recommendations(
    services: &[ServiceRecord],
    vulnerabilities: &[Vulnerability],
    security_score: u8,
) -> Vec<Recommendation> {
    let mut candidates: Vec<Recommendation> = vulnerabilities.iter().map(for_vulnerability).collect();
    candidates.extend(services.iter().filter_map(for_vulnerable_service));

    if exposes(services, &[23]) {
        candidates.push(recommendation(
            "Disable Telnet (port 23)",
            "Port 23 (Telnet) is open. Telnet sends credentials and traffic in clear text. \
             Disable it and use SSH instead.",
            Priority::High,
            Category::Configuration,
        ));
    }
    if exposes(services, &[21]) {
        candidates.push(recommendation(
            "Migrate FTP to FTPS/SFTP (port 21)",
            "Port 21 (FTP) is exposed. FTP encrypts neither credentials nor data, which makes \
             interception easy. Migrate to FTPS or SFTP.",
            Priority::High,
            Category::Configuration,
        ));
    }
    if exposes(services, &REMOTE_ADMIN_PORTS) {
        candidates.push(recommendation(
            "Restrict remote administrative access (SSH/RDP)",
            "Administrative services (SSH and/or RDP) are exposed. Limit access to trusted \
             address ranges with firewall rules, require strong authentication (MFA, keys) and \
             log access attempts.",
            Priority::High,
            Category::Security,
        ));
    }
    if exposes(services, &DATABASE_PORTS) {
        candidates.push(recommendation(
            "Protect databases exposed to the Internet",
            "Database services (MySQL, PostgreSQL, MongoDB or Redis) are reachable from the \
             Internet. Restrict them to internal networks or a VPN, enforce authentication and \
             encryption, and check for weak credentials.",
            Priority::High,
            Category::Security,
        ));
    }
    candidates.extend(attack_surface(services.len()));
    if security_score < AUDIT_THRESHOLD {
        candidates.push(recommendation(
            "Perform a full security audit",
            format!(
                "The security score is low ({}). Audit the whole system: review configurations, \
                 harden exposed services, update software and fix the detected vulnerabilities.",
                security_score
            ),
            Priority::High,
            Category::Security,
        ));
    }

    let mut unique: Vec<Recommendation> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !unique.iter().any(|r| r.title == candidate.title) {
            unique.push(candidate);
        }
    }
    unique
}
