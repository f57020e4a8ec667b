//! Configuration constants.
//!
//! This module defines the constants used throughout the service: default
//! collaborator endpoints, timeouts, retry parameters, and the sentinel values
//! used when a source has no data.

// Server defaults
/// Default bind address for the HTTP API
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
/// Default HTTP API port
pub const DEFAULT_PORT: u16 = 8080;
/// Overall per-request deadline in seconds
/// Covers the scan (60s) plus vulnerability retries and enrichment with headroom
pub const REQUEST_TIMEOUT_SECS: u64 = 180;

// Scanner
/// Default scanner binary (looked up on PATH)
pub const DEFAULT_NMAP_PATH: &str = "nmap";
/// Candidate ports probed by the fixed scan profile
pub const DEFAULT_SCAN_PORTS: &str = "21,22,23,80,443,3306,3389,5432,6379,8080,27017";
/// Scanner process timeout in seconds; the child is killed when it is exceeded
pub const SCAN_TIMEOUT_SECS: u64 = 60;
/// Prefix of the scoped directory holding the scanner's XML output
pub const SCAN_TEMP_PREFIX: &str = "nmap_scan_";
/// File name of the scanner's XML output inside the scoped directory
pub const SCAN_OUTPUT_FILE: &str = "scan.xml";
/// Maximum number of scanner output characters kept in a technical detail
pub const MAX_SCANNER_OUTPUT_CHARS: usize = 500;

// Vulnerability database (NVD CVE API 2.0)
/// NVD CVE API endpoint
pub const NVD_API_URL: &str = "https://services.nvd.nist.gov/rest/json/cves/2.0";
/// Header carrying the optional NVD API key
pub const NVD_API_KEY_HEADER: &str = "apiKey";
/// Results requested per platform query (single page)
pub const NVD_RESULTS_PER_PAGE: u32 = 20;
/// Per-request NVD timeout in seconds
pub const NVD_TIMEOUT_SECS: u64 = 30;
/// Maximum references kept per vulnerability
pub const MAX_VULNERABILITY_REFERENCES: usize = 5;
/// Concurrent platform lookups per request
pub const VULN_FETCH_CONCURRENCY: usize = 2;

// Retry strategy for vulnerability lookups that time out
/// Exponential backoff base (each delay doubles)
pub const RETRY_BACKOFF_BASE: u64 = 2;
/// Multiplier applied to the base, in milliseconds (first delay = 2 * 1000ms)
pub const RETRY_BACKOFF_FACTOR_MS: u64 = 1000;
/// Retries after the first attempt (delays 2s then 4s)
pub const RETRY_MAX_ATTEMPTS: usize = 2;

// Network ownership (ip-api.com)
/// ip-api JSON endpoint (the IP is appended as a path segment)
pub const IPAPI_URL: &str = "http://ip-api.com/json";
/// Fields requested from ip-api
pub const IPAPI_FIELDS: &str = "status,message,as,isp,org";
/// Per-request ip-api timeout in seconds
pub const IPAPI_TIMEOUT_SECS: u64 = 10;

// Network ownership fallback (whois)
/// Default whois client binary (looked up on PATH)
pub const DEFAULT_WHOIS_PATH: &str = "whois";
/// whois process timeout in seconds; the child is killed when it is exceeded
pub const WHOIS_TIMEOUT_SECS: u64 = 10;

// Network operation timeouts
/// DNS query timeout in seconds
pub const DNS_TIMEOUT_SECS: u64 = 3;
/// TCP connect timeout shared by all outbound HTTP clients
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// User-Agent sent to the vulnerability and IP-intelligence services
pub const DEFAULT_USER_AGENT: &str = concat!("posture_analyzer/", env!("CARGO_PKG_VERSION"));

// Sentinels for fields a source could not provide
pub const UNKNOWN: &str = "Unknown";
pub const UNKNOWN_COUNTRY_CODE: &str = "--";
pub const DEFAULT_TIMEZONE: &str = "UTC";

// Names reported in metadata.sourcesUsed
pub const SOURCE_DNS: &str = "dns";
pub const SOURCE_SCANNER: &str = "nmap";
pub const SOURCE_VULNERABILITIES: &str = "nvd";
pub const SOURCE_GEOLOCATION: &str = "geolite2";
pub const SOURCE_OWNERSHIP: &str = "ipapi";

/// Source identifier of the reputation entry built from scan evidence
pub const REPUTATION_SOURCE: &str = "nmap-nvd";
/// Display label of the reputation entry
pub const REPUTATION_LABEL: &str = "Service and vulnerability analysis";
