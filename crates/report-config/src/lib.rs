//! Layered configuration for the topology report.
//!
//! Values come from an optional YAML file, then from environment variables
//! prefixed with `TOPOLOGY_REPORT` (nested keys separated by `__`, e.g.
//! `TOPOLOGY_REPORT_SERVICE__URL`). Command line flags are applied on top by
//! the binary.
//!
//! # Sample Config
//! ```yaml
//! logging:
//!   max_level: DEBUG
//!   log_file: /var/log/topology-report.log
//! report:
//!   display_name: Network Topology Inventory Report
//! service:
//!   url: https://inventory.example.net/api/v2
//!   token: s3cr3t
//!   timeout_secs: 30
//! snapshot:
//!   path: ./inventory
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing_subscriber::filter::LevelFilter;

pub use config::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "config_data/config.yaml";
pub const ENV_PREFIX: &str = "TOPOLOGY_REPORT";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ReportConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub report: ReportSection,
    #[serde(default)]
    pub service: Option<ServiceConfig>,
    #[serde(default)]
    pub snapshot: Option<SnapshotConfig>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoggingLevel {
    ERROR,
    #[default]
    WARN,
    INFO,
    DEBUG,
    TRACE,
    OFF,
}

impl<'de> Deserialize<'de> for LoggingLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let v = String::deserialize(deserializer)?;

        Ok(match v.to_ascii_uppercase().as_str() {
            "ERROR" => Self::ERROR,
            "WARN" => Self::WARN,
            "INFO" => Self::INFO,
            "DEBUG" => Self::DEBUG,
            "TRACE" => Self::TRACE,
            "OFF" => Self::OFF,
            other => Err(serde::de::Error::custom(format!(
                "Bad logging level specifier {other}"
            )))?,
        })
    }
}

impl From<LoggingLevel> for LevelFilter {
    fn from(value: LoggingLevel) -> Self {
        match value {
            LoggingLevel::ERROR => LevelFilter::ERROR,
            LoggingLevel::WARN => LevelFilter::WARN,
            LoggingLevel::INFO => LevelFilter::INFO,
            LoggingLevel::DEBUG => LevelFilter::DEBUG,
            LoggingLevel::TRACE => LevelFilter::TRACE,
            LoggingLevel::OFF => LevelFilter::OFF,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub log_file: Option<String>,

    #[serde(default)]
    pub max_level: LoggingLevel,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ReportSection {
    /// Overrides the report's display name in the no-data sentence.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Connection settings for the remote inventory service.
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub url: String,

    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl ServiceConfig {
    pub fn new(url: impl Into<String>) -> Self {
        ServiceConfig {
            url: url.into(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SnapshotConfig {
    pub path: PathBuf,
}

/// Loads configuration from `path` (if the file exists) layered under the
/// `TOPOLOGY_REPORT_*` environment.
///
/// A missing file is not an error; every section has a default. A file that
/// exists but does not parse is.
pub fn load(path: impl AsRef<Path>) -> Result<ReportConfig, ConfigError> {
    let path = path.as_ref();

    config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = load("/nonexistent/topology-report/config.yaml").unwrap();

        assert_eq!(config.logging.max_level, LoggingLevel::WARN);
        assert!(config.logging.log_file.is_none());
        assert!(config.report.display_name.is_none());
        assert!(config.service.is_none());
        assert!(config.snapshot.is_none());
    }

    #[test]
    fn full_file() {
        let file = write_config(
            r#"
logging:
  max_level: debug
  log_file: /tmp/report.log
report:
  display_name: Lab Inventory
service:
  url: https://inventory.example.net/api
  token: abc
snapshot:
  path: ./inventory
"#,
        );

        let config = load(file.path()).unwrap();

        assert_eq!(config.logging.max_level, LoggingLevel::DEBUG);
        assert_eq!(config.logging.log_file.as_deref(), Some("/tmp/report.log"));
        assert_eq!(config.report.display_name.as_deref(), Some("Lab Inventory"));

        let service = config.service.unwrap();
        assert_eq!(service.url, "https://inventory.example.net/api");
        assert_eq!(service.token.as_deref(), Some("abc"));
        assert_eq!(service.timeout_secs, 30);

        assert_eq!(config.snapshot.unwrap().path, PathBuf::from("./inventory"));
    }

    #[test]
    fn bad_logging_level_is_rejected() {
        let file = write_config("logging:\n  max_level: LOUD\n");
        assert!(load(file.path()).is_err());
    }

    #[test]
    fn level_filter_conversion() {
        assert_eq!(LevelFilter::from(LoggingLevel::OFF), LevelFilter::OFF);
        assert_eq!(LevelFilter::from(LoggingLevel::TRACE), LevelFilter::TRACE);
    }
}
