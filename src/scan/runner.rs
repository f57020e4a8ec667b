//! nmap process invocation.
//!
//! Runs the fixed scan profile against one address, writing the XML report
//! into a scoped temporary directory that is removed when the scan returns.

use std::ffi::OsString;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::process::Command;

use super::parse::parse_nmap_xml;
use super::PortScanner;
use crate::config::{Config, MAX_SCANNER_OUTPUT_CHARS, SCAN_OUTPUT_FILE, SCAN_TEMP_PREFIX};
use crate::error_handling::{AnalysisError, ErrorKind};
use crate::models::ServiceRecord;

/// Output markers of a scan that lacked privileges.
const PERMISSION_MARKERS: [&str; 2] = ["Permission denied", "Operation not permitted"];

/// Production `PortScanner` backed by the nmap binary.
#[derive(Debug, Clone)]
pub struct NmapScanner {
    binary: PathBuf,
    ports: String,
    timeout: Duration,
    temp_dir: Option<PathBuf>,
}

/// Exit status and combined stdout/stderr of one scanner run.
struct ScanExecution {
    success: bool,
    exit_code: Option<i32>,
    output: String,
}

impl NmapScanner {
    pub fn new(binary: impl Into<PathBuf>, ports: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            ports: ports.into(),
            timeout,
            temp_dir: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            temp_dir: config.temp_dir.clone(),
            ..Self::new(
                config.nmap_path.clone(),
                config.scan_ports.clone(),
                config.scan_timeout(),
            )
        }
    }

    /// Creates the scoped output directory under `dir` instead of the system temp dir.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Arguments of the fixed profile: TCP connect scan with version
    /// detection, no host discovery, open ports only, XML report to `output`.
    pub fn scan_arguments(&self, ip: &str, output: &Path) -> Vec<OsString> {
        vec![
            "-sT".into(),
            "-sV".into(),
            "-Pn".into(),
            "-p".into(),
            self.ports.clone().into(),
            "--open".into(),
            "-T4".into(),
            "-oX".into(),
            output.as_os_str().to_os_string(),
            ip.into(),
        ]
    }

    fn workspace(&self) -> Result<TempDir, AnalysisError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCAN_TEMP_PREFIX);
        let workspace = match &self.temp_dir {
            Some(dir) => builder.tempdir_in(dir),
            None => builder.tempdir(),
        };
        workspace.map_err(|e| {
            AnalysisError::new(
                ErrorKind::ScannerExecutionError,
                "The scan workspace could not be created",
                e.to_string(),
                "Check that the temporary directory exists and is writable",
            )
        })
    }

    async fn execute(&self, ip: &str, output: &Path) -> Result<ScanExecution, AnalysisError> {
        let mut command = Command::new(&self.binary);
        command
            .args(self.scan_arguments(ip, output))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        log::debug!("Running {} {:?}", self.binary.display(), self.scan_arguments(ip, output));

        let child = command.spawn().map_err(|e| self.spawn_error(e))?;

        // Dropping the wait future on timeout drops the child, which kills it
        let result = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                return Err(AnalysisError::new(
                    ErrorKind::ScannerExecutionError,
                    "The scanner could not be run",
                    e.to_string(),
                    "Check the scanner installation",
                ))
            }
            Err(_) => {
                return Err(AnalysisError::new(
                    ErrorKind::ScannerTimeout,
                    format!(
                        "The scan did not finish within {} seconds",
                        self.timeout.as_secs()
                    ),
                    format!("scanner killed after {:?}", self.timeout),
                    "Retry later; the target may be slow or filtering probes",
                ))
            }
        };

        let mut combined = String::from_utf8_lossy(&result.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&result.stderr));

        Ok(ScanExecution {
            success: result.status.success(),
            exit_code: result.status.code(),
            output: combined,
        })
    }

    fn spawn_error(&self, error: std::io::Error) -> AnalysisError {
        match error.kind() {
            IoErrorKind::NotFound => AnalysisError::new(
                ErrorKind::ScannerNotFound,
                "The network scanner is not installed",
                format!("{}: {}", self.binary.display(), error),
                "Install nmap or set NMAP_PATH to its location",
            ),
            IoErrorKind::PermissionDenied => permission_denied(error.to_string()),
            _ => AnalysisError::new(
                ErrorKind::ScannerExecutionError,
                "The scanner could not be started",
                error.to_string(),
                "Check the scanner installation",
            ),
        }
    }
}

fn permission_denied(detail: String) -> AnalysisError {
    AnalysisError::new(
        ErrorKind::ScannerPermissionDenied,
        "The scanner lacks the privileges it needs",
        detail,
        "Run the service with the privileges nmap requires",
    )
}

fn truncate_output(output: &str) -> String {
    output.trim().chars().take(MAX_SCANNER_OUTPUT_CHARS).collect()
}

#[async_trait]
impl PortScanner for NmapScanner {
    async fn scan(&self, ip: &str) -> Result<Vec<ServiceRecord>, AnalysisError> {
        log::info!("Starting scan of {} (ports {})", ip, self.ports);

        // Removed on drop, whatever the outcome below
        let workspace = self.workspace()?;
        let xml_path = workspace.path().join(SCAN_OUTPUT_FILE);

        let execution = self.execute(ip, &xml_path).await?;

        if !execution.success
            && PERMISSION_MARKERS
                .iter()
                .any(|marker| execution.output.contains(marker))
        {
            return Err(permission_denied(truncate_output(&execution.output)));
        }

        if !execution.success {
            return Err(execution_failed(&execution, "scanner exited unsuccessfully"));
        }

        let xml = tokio::fs::read_to_string(&xml_path)
            .await
            .ok()
            .filter(|xml| !xml.trim().is_empty())
            .ok_or_else(|| execution_failed(&execution, "no XML report was written"))?;

        let services = parse_nmap_xml(&xml).unwrap_or_else(|e| {
            log::error!("Could not parse scanner output for {}: {}", ip, e);
            Vec::new()
        });

        log::info!("Scan of {} found {} open service(s)", ip, services.len());
        Ok(services)
    }
}

fn execution_failed(execution: &ScanExecution, reason: &str) -> AnalysisError {
    AnalysisError::new(
        ErrorKind::ScannerExecutionError,
        "The scan failed",
        format!(
            "exit code {:?}, {}: {}",
            execution.exit_code,
            reason,
            truncate_output(&execution.output)
        ),
        "Check the target address and the scanner installation",
    )
}
