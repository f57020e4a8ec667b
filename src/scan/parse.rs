//! Scanner XML parsing.
//!
//! Models only the parts of the nmap XML report the pipeline uses. Every
//! attribute is optional so one malformed `<port>` is skipped instead of
//! failing the whole document.

use serde::Deserialize;

use crate::models::{Protocol, ServiceRecord};

#[derive(Debug, Deserialize)]
struct NmapRun {
    #[serde(rename = "host", default)]
    hosts: Vec<Host>,
}

#[derive(Debug, Deserialize)]
struct Host {
    #[serde(rename = "ports", default)]
    ports: Option<Ports>,
}

#[derive(Debug, Deserialize)]
struct Ports {
    #[serde(rename = "port", default)]
    ports: Vec<Port>,
}

#[derive(Debug, Deserialize)]
struct Port {
    #[serde(rename = "@portid", default)]
    portid: Option<String>,
    #[serde(rename = "@protocol", default)]
    protocol: Option<String>,
    #[serde(default)]
    state: Option<PortState>,
    #[serde(default)]
    service: Option<Service>,
}

#[derive(Debug, Deserialize)]
struct PortState {
    #[serde(rename = "@state", default)]
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Service {
    #[serde(rename = "@name", default)]
    name: Option<String>,
    #[serde(rename = "@product", default)]
    product: Option<String>,
    #[serde(rename = "@version", default)]
    version: Option<String>,
    #[serde(rename = "@extrainfo", default)]
    extrainfo: Option<String>,
    #[serde(rename = "@tunnel", default)]
    tunnel: Option<String>,
}

/// Parses an nmap XML report into service records.
///
/// Only open ports of the first host are returned, in document order.
///
/// # Errors
///
/// Returns an error if the document is not well-formed XML.
pub fn parse_nmap_xml(xml: &str) -> Result<Vec<ServiceRecord>, quick_xml::DeError> {
    let run: NmapRun = quick_xml::de::from_str(xml)?;

    let Some(ports) = run.hosts.into_iter().next().and_then(|host| host.ports) else {
        return Ok(Vec::new());
    };

    let services = ports
        .ports
        .into_iter()
        .filter(|port| {
            port.state
                .as_ref()
                .and_then(|state| state.state.as_deref())
                == Some("open")
        })
        .filter_map(to_service_record)
        .collect();

    Ok(services)
}

fn to_service_record(port: Port) -> Option<ServiceRecord> {
    let port_number = match port.portid.as_deref().map(str::trim).map(str::parse::<u16>) {
        Some(Ok(number)) if number > 0 => number,
        other => {
            log::debug!("Skipping port entry with unusable portid: {:?}", other);
            return None;
        }
    };
    let protocol = Protocol::from_scanner(port.protocol.as_deref().unwrap_or_default());

    let Some(service) = port.service else {
        return Some(ServiceRecord::new(port_number, protocol, "unknown"));
    };

    let name = non_empty(service.name).unwrap_or_else(|| "unknown".to_string());
    let version = non_empty(service.product).map(|product| match non_empty(service.version) {
        Some(version) => format!("{} {}", product, version),
        None => product,
    });
    let banner = non_empty(service.extrainfo)
        .or_else(|| non_empty(service.tunnel).map(|tunnel| format!("tunnel: {}", tunnel)));

    Some(
        ServiceRecord::new(port_number, protocol, name)
            .with_version(version)
            .with_banner(banner),
    )
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
