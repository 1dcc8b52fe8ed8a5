//! Application configuration management.

use std::path::PathBuf;

use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Report behaviour.
    #[serde(default)]
    pub reporting: ReportingConfig,
    /// Spreadsheet export configuration.
    #[serde(default)]
    pub export: ExportConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5006
}

/// Connection settings for the declaration store.
///
/// Handed to the pool constructor at startup; nothing reads credentials from
/// the process environment after that.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait when acquiring a connection.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Whether sqlx statement logging is enabled.
    #[serde(default)]
    pub sqlx_logging: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    30
}

/// Report behaviour configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportingConfig {
    /// IANA timezone used for "now" and "today".
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Literal reference prefix that marks test declarations.
    #[serde(default = "default_test_prefix")]
    pub test_reference_prefix: String,
    /// Longest range, in days, accepted by the daily volume report.
    #[serde(default = "default_max_daily_span")]
    pub max_daily_span_days: i64,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            test_reference_prefix: default_test_prefix(),
            max_daily_span_days: default_max_daily_span(),
        }
    }
}

impl ReportingConfig {
    /// Parses the configured timezone.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] when the name is not an IANA zone.
    pub fn tz(&self) -> AppResult<Tz> {
        self.timezone.parse::<Tz>().map_err(|_| {
            AppError::Configuration(format!("unknown timezone '{}'", self.timezone))
        })
    }
}

fn default_timezone() -> String {
    "Asia/Shanghai".to_string()
}

fn default_test_prefix() -> String {
    "TEST".to_string()
}

fn default_max_daily_span() -> i64 {
    30
}

/// Spreadsheet export configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Directory the spreadsheet encoder writes into.
    #[serde(default = "default_export_dir")]
    pub directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_export_dir(),
        }
    }
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("exports")
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] if configuration cannot be loaded.
    pub fn load() -> AppResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("DECLSTAT").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_applies_defaults() {
        temp_env::with_vars(
            [
                ("DECLSTAT__DATABASE__URL", Some("postgres://stats@localhost/customs")),
                ("DECLSTAT__SERVER__PORT", None),
                ("RUN_MODE", Some("test")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://stats@localhost/customs");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.server.port, 5006);
                assert_eq!(config.reporting.timezone, "Asia/Shanghai");
                assert_eq!(config.reporting.test_reference_prefix, "TEST");
                assert_eq!(config.reporting.max_daily_span_days, 30);
                assert_eq!(config.export.directory, PathBuf::from("exports"));
            },
        );
    }

    #[test]
    fn test_load_reads_overrides() {
        temp_env::with_vars(
            [
                ("DECLSTAT__DATABASE__URL", Some("postgres://stats@db/customs")),
                ("DECLSTAT__SERVER__PORT", Some("9090")),
                ("DECLSTAT__REPORTING__TIMEZONE", Some("UTC")),
                ("RUN_MODE", Some("test")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.reporting.tz().unwrap(), chrono_tz::UTC);
            },
        );
    }

    #[test]
    fn test_load_requires_database_url() {
        temp_env::with_vars(
            [
                ("DECLSTAT__DATABASE__URL", None::<&str>),
                ("RUN_MODE", Some("test")),
            ],
            || {
                let err = AppConfig::load().unwrap_err();
                assert!(matches!(err, AppError::Configuration(message) if message.contains("url")));
            },
        );
    }

    #[test]
    fn test_unknown_timezone_is_rejected() {
        let reporting = ReportingConfig {
            timezone: "Mars/Olympus".to_string(),
            ..ReportingConfig::default()
        };
        assert!(matches!(reporting.tz(), Err(AppError::Configuration(_))));
    }
}
