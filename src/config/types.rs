//! Configuration types and CLI options.
//!
//! This module defines the enums and the `Config` struct used for command-line
//! argument parsing. Every option can also be supplied through an environment
//! variable (or a `.env` file loaded by the binary).

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_BIND_ADDRESS, DEFAULT_NMAP_PATH, DEFAULT_PORT, DEFAULT_SCAN_PORTS, DEFAULT_WHOIS_PATH,
    IPAPI_TIMEOUT_SECS, IPAPI_URL, NVD_API_URL, NVD_RESULTS_PER_PAGE, NVD_TIMEOUT_SECS,
    REQUEST_TIMEOUT_SECS, SCAN_TIMEOUT_SECS, VULN_FETCH_CONCURRENCY, WHOIS_TIMEOUT_SECS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Service configuration.
///
/// Parsed by `clap` from command-line flags with environment-variable
/// fallbacks. `Config::default()` mirrors the CLI defaults so the library can be
/// configured programmatically.
///
/// # Examples
///
/// ```bash
/// # Serve on the default address with a GeoLite2 City database
/// posture_analyzer --geoip ./GeoLite2-City.mmdb
///
/// # Use an NVD API key from the environment and a custom scanner path
/// NVD_API_KEY=... posture_analyzer --nmap-path /usr/local/bin/nmap --port 9000
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "posture_analyzer",
    about = "Scans a network target and reports its composite security posture."
)]
pub struct Config {
    /// Address the HTTP API binds to
    #[arg(long, env = "POSTURE_HOST", default_value = DEFAULT_BIND_ADDRESS)]
    pub host: String,

    /// Port the HTTP API listens on
    #[arg(long, env = "POSTURE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Path to the nmap binary
    #[arg(long, env = "NMAP_PATH", default_value = DEFAULT_NMAP_PATH)]
    pub nmap_path: PathBuf,

    /// Comma-separated list of candidate ports probed on every target
    #[arg(long, env = "SCAN_PORTS", default_value = DEFAULT_SCAN_PORTS)]
    pub scan_ports: String,

    /// Scanner timeout in seconds (the process is killed when exceeded)
    #[arg(long, env = "SCAN_TIMEOUT_SECONDS", default_value_t = SCAN_TIMEOUT_SECS)]
    pub scan_timeout_seconds: u64,

    /// Directory for the scanner's scoped XML output (system temp dir if unset)
    #[arg(long, env = "SCAN_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// NVD CVE API 2.0 endpoint
    #[arg(long, env = "NVD_API_URL", default_value = NVD_API_URL)]
    pub nvd_url: String,

    /// NVD API key (raises the public rate limit)
    #[arg(long, env = "NVD_API_KEY", hide_env_values = true)]
    pub nvd_api_key: Option<String>,

    /// Vulnerabilities requested per platform lookup
    #[arg(long, env = "NVD_RESULTS_PER_PAGE", default_value_t = NVD_RESULTS_PER_PAGE)]
    pub nvd_results_per_page: u32,

    /// Per-request NVD timeout in seconds
    #[arg(long, env = "NVD_TIMEOUT_SECONDS", default_value_t = NVD_TIMEOUT_SECS)]
    pub nvd_timeout_seconds: u64,

    /// ip-api.com JSON endpoint
    #[arg(long, env = "IPAPI_URL", default_value = IPAPI_URL)]
    pub ipapi_url: String,

    /// Per-request ip-api timeout in seconds
    #[arg(long, env = "IPAPI_TIMEOUT_SECONDS", default_value_t = IPAPI_TIMEOUT_SECS)]
    pub ipapi_timeout_seconds: u64,

    /// Path to the whois client used when ip-api has no ownership data
    #[arg(long, env = "WHOIS_PATH", default_value = DEFAULT_WHOIS_PATH)]
    pub whois_path: PathBuf,

    /// whois timeout in seconds (the process is killed when exceeded)
    #[arg(long, env = "WHOIS_TIMEOUT_SECONDS", default_value_t = WHOIS_TIMEOUT_SECS)]
    pub whois_timeout_seconds: u64,

    /// GeoIP database path (MaxMind GeoLite2 City .mmdb file)
    /// If not provided, geolocation falls back to "Unknown" for every target.
    #[arg(long, env = "GEOIP_DB_PATH")]
    pub geoip: Option<PathBuf>,

    /// Overall deadline for a single analysis request in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECONDS", default_value_t = REQUEST_TIMEOUT_SECS)]
    pub request_timeout_seconds: u64,

    /// Concurrent vulnerability lookups per request
    #[arg(long, env = "VULN_CONCURRENCY", default_value_t = VULN_FETCH_CONCURRENCY)]
    pub vuln_concurrency: usize,
}

impl Config {
    /// Address string handed to the TCP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_seconds)
    }

    pub fn nvd_timeout(&self) -> Duration {
        Duration::from_secs(self.nvd_timeout_seconds)
    }

    pub fn ipapi_timeout(&self) -> Duration {
        Duration::from_secs(self.ipapi_timeout_seconds)
    }

    pub fn whois_timeout(&self) -> Duration {
        Duration::from_secs(self.whois_timeout_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            nmap_path: PathBuf::from(DEFAULT_NMAP_PATH),
            scan_ports: DEFAULT_SCAN_PORTS.to_string(),
            scan_timeout_seconds: SCAN_TIMEOUT_SECS,
            temp_dir: None,
            nvd_url: NVD_API_URL.to_string(),
            nvd_api_key: None,
            nvd_results_per_page: NVD_RESULTS_PER_PAGE,
            nvd_timeout_seconds: NVD_TIMEOUT_SECS,
            ipapi_url: IPAPI_URL.to_string(),
            ipapi_timeout_seconds: IPAPI_TIMEOUT_SECS,
            whois_path: PathBuf::from(DEFAULT_WHOIS_PATH),
            whois_timeout_seconds: WHOIS_TIMEOUT_SECS,
            geoip: None,
            request_timeout_seconds: REQUEST_TIMEOUT_SECS,
            vuln_concurrency: VULN_FETCH_CONCURRENCY,
        }
    }
}
