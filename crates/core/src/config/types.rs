use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub report: ReportConfig,
    pub lookup: LookupConfig,
    #[serde(default)]
    pub artifact: ArtifactConfig,
}

/// Report file configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Directory under which `<location>/<institution>/` report folders live.
    pub base_path: PathBuf,
    /// File name prefix, followed by location, institution and date.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    /// chrono format string for the creation date in the file name.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Header line written on chunk index 0 (tab-separated).
    #[serde(default = "default_header")]
    pub header: String,
    /// Skip chunks already recorded in the commit ledger.
    #[serde(default)]
    pub skip_committed_chunks: bool,
    /// SQLite ledger file; in-memory when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_path: Option<PathBuf>,
}

impl ReportConfig {
    /// Report settings with defaults for everything but the base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            file_prefix: default_file_prefix(),
            date_format: default_date_format(),
            header: default_header(),
            skip_committed_chunks: false,
            ledger_path: None,
        }
    }

    /// Enables the commit ledger.
    pub fn with_skip_committed_chunks(mut self, enabled: bool) -> Self {
        self.skip_committed_chunks = enabled;
        self
    }
}

fn default_file_prefix() -> String {
    "AccessionReconciliation".to_string()
}

fn default_date_format() -> String {
    "%Y%m%d".to_string()
}

fn default_header() -> String {
    "AccessionReconciliation\tCustomerCode".to_string()
}

/// Lookup service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LookupConfig {
    /// Lookup service URL (e.g., "http://localhost:9090")
    pub base_url: String,
    /// Path appended to the base URL for reconciliation requests.
    #[serde(default = "default_endpoint_path")]
    pub endpoint_path: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl LookupConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            endpoint_path: default_endpoint_path(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_endpoint_path() -> String {
    "/accessionReconciliationService/startAccessionReconciliation".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Artifact retirement and route release configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtifactConfig {
    /// Marker inserted before the file name of a retired artifact.
    #[serde(default = "default_done_marker")]
    pub done_marker: String,
    /// Suffix appended to `<location><institution>` to form the route id.
    #[serde(default = "default_route_suffix")]
    pub route_suffix: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            done_marker: default_done_marker(),
            route_suffix: default_route_suffix(),
        }
    }
}

fn default_done_marker() -> String {
    ".done".to_string()
}

fn default_route_suffix() -> String {
    "accessionReconciliationFsRoute".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let toml = r#"
[report]
base_path = "/data/reports"

[lookup]
base_url = "http://localhost:9090"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.report.base_path.to_str().unwrap(), "/data/reports");
        assert_eq!(config.report.file_prefix, "AccessionReconciliation");
        assert_eq!(config.report.date_format, "%Y%m%d");
        assert_eq!(config.report.header, "AccessionReconciliation\tCustomerCode");
        assert!(!config.report.skip_committed_chunks);
        assert!(config.report.ledger_path.is_none());
        assert_eq!(config.lookup.timeout_secs, 30);
        assert_eq!(
            config.lookup.endpoint_path,
            "/accessionReconciliationService/startAccessionReconciliation"
        );
        assert_eq!(config.artifact.done_marker, ".done");
        assert_eq!(config.artifact.route_suffix, "accessionReconciliationFsRoute");
    }

    #[test]
    fn test_deserialize_overrides() {
        let toml = r#"
[report]
base_path = "/data/reports"
file_prefix = "Recon"
date_format = "%Y-%m-%d"
skip_committed_chunks = true
ledger_path = "/data/ledger.db"

[lookup]
base_url = "http://solr:9090"
endpoint_path = "/reconcile"
timeout_secs = 5

[artifact]
route_suffix = "deliveryRoute"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.report.file_prefix, "Recon");
        assert!(config.report.skip_committed_chunks);
        assert_eq!(
            config.report.ledger_path.as_deref().and_then(|p| p.to_str()),
            Some("/data/ledger.db")
        );
        assert_eq!(config.lookup.endpoint_path, "/reconcile");
        assert_eq!(config.lookup.timeout_secs, 5);
        assert_eq!(config.artifact.route_suffix, "deliveryRoute");
        assert_eq!(config.artifact.done_marker, ".done");
    }

    #[test]
    fn test_deserialize_missing_lookup_fails() {
        let toml = r#"
[report]
base_path = "/data/reports"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_report_config_builder() {
        let config = ReportConfig::new("/tmp/reports").with_skip_committed_chunks(true);
        assert!(config.skip_committed_chunks);
        assert_eq!(config.file_prefix, "AccessionReconciliation");
    }
}
