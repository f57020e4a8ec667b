//! Network ownership from the system whois client.
//!
//! Used when ip-api has nothing for an address. The registry record is read
//! line by line: `origin:`/`originas:` give the ASN, `orgname:`/`org-name:`
//! the organization and `netname:` the network name reported as ISP.

use std::io::ErrorKind as IoErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;

use super::{NetworkOwnership, NetworkOwnershipSource};
use crate::config::Config;
use crate::error_handling::SourceFailure;
use crate::utils::compile_regex_unsafe;

static ORIGIN_AS_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(r"(?i)AS(\d+)", "ORIGIN_AS_RE"));

/// `NetworkOwnershipSource` backed by a whois binary.
#[derive(Debug, Clone)]
pub struct WhoisClient {
    binary: PathBuf,
    timeout: Duration,
}

impl WhoisClient {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.whois_path.clone(), config.whois_timeout())
    }
}

/// Value after the first `:` of a `key: value` line, if not blank.
fn field_value(line: &str) -> Option<String> {
    line.split_once(':')
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Extracts ownership from a whois record.
///
/// The first occurrence of each field wins. Returns `None` when the record
/// names none of them.
pub fn parse_whois_output(output: &str) -> Option<NetworkOwnership> {
    let mut asn: Option<String> = None;
    let mut org: Option<String> = None;
    let mut netname: Option<String> = None;

    for line in output.lines() {
        let lower = line.to_lowercase();

        if asn.is_none() && (lower.contains("origin:") || lower.contains("originas:")) {
            asn = ORIGIN_AS_RE
                .captures(line)
                .and_then(|captures| captures.get(1))
                .map(|number| format!("AS{}", number.as_str()));
        }
        if org.is_none() && (lower.contains("orgname:") || lower.contains("org-name:")) {
            org = field_value(line);
        }
        if netname.is_none() && lower.contains("netname:") {
            netname = field_value(line);
        }
    }

    if asn.is_none() && org.is_none() && netname.is_none() {
        return None;
    }

    Some(NetworkOwnership {
        isp: netname.or_else(|| org.clone()),
        asn,
        org,
    })
}

#[async_trait]
impl NetworkOwnershipSource for WhoisClient {
    async fn lookup(&self, ip: &str) -> Result<Option<NetworkOwnership>, SourceFailure> {
        log::debug!("Trying whois lookup for {}", ip);

        let mut command = Command::new(&self.binary);
        command
            .arg(ip.trim())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                log::debug!("whois client {} not installed", self.binary.display());
                return Ok(None);
            }
            Err(e) => return Err(SourceFailure::Connection(format!("whois: {}", e))),
        };

        // Dropping the wait future on timeout drops the child, which kills it
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(SourceFailure::Connection(format!("whois: {}", e))),
            Err(_) => {
                log::warn!("whois lookup for {} killed after {:?}", ip, self.timeout);
                return Err(SourceFailure::Timeout);
            }
        };

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        let ownership = parse_whois_output(&text);
        if ownership.is_none() {
            log::debug!("whois record for {} names no network owner", ip);
        }
        Ok(ownership)
    }
}
