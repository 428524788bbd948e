use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::{Validate, ValidationError};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// qTest API access
    #[validate(nested)]
    pub qtest: QTestConfig,

    /// Teams delivery
    #[validate(nested)]
    pub teams: TeamsConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> std::result::Result<Self, config::ConfigError> {
        let config_path = std::env::var("RELAY_CONFIG_PATH")
            .unwrap_or_else(|_| "config/relay.toml".to_string());
        Self::load_from(Path::new(&config_path))
    }

    /// Load configuration, layering `path` (if it exists) over the embedded
    /// defaults and the environment over both.
    pub fn load_from(path: &Path) -> std::result::Result<Self, config::ConfigError> {
        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (e.g. RELAY__QTEST__API_TOKEN)
            .add_source(config::Environment::with_prefix("RELAY").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Validated view of the values the enrichment pipeline needs
    pub fn relay(&self) -> Result<RelayConfig> {
        self.validate()?;
        Ok(RelayConfig {
            api_token: self.qtest.api_token.clone(),
            api_host: self.qtest.manager_url.clone(),
            webhook_url: self.teams.webhook_url.clone(),
        })
    }
}

/// Static inputs of a pipeline run: qTest credentials, qTest host and the
/// Teams webhook. All three are required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub api_token: String,
    pub api_host: String,
    pub webhook_url: String,
}

impl RelayConfig {
    pub fn new(
        api_token: impl Into<String>,
        api_host: impl Into<String>,
        webhook_url: impl Into<String>,
    ) -> Result<Self> {
        let config = Self {
            api_token: api_token.into(),
            api_host: api_host.into(),
            webhook_url: webhook_url.into(),
        };

        if config.api_token.is_empty() {
            return Err(AppError::Configuration("qTest API token is required".to_string()));
        }
        validate_host(&config.api_host)
            .map_err(|_| AppError::Configuration(format!("Invalid qTest host: {:?}", config.api_host)))?;
        if config.webhook_url.is_empty() {
            return Err(AppError::Configuration("Teams webhook URL is required".to_string()));
        }

        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QTestConfig {
    /// Bearer token for the qTest API
    #[validate(length(min = 1, message = "qtest.api_token is required"))]
    #[serde(default)]
    pub api_token: String,

    /// qTest manager domain, without scheme (e.g. `example.qtest.com`)
    #[validate(custom(function = "validate_host"))]
    #[serde(default)]
    pub manager_url: String,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TeamsConfig {
    /// Incoming webhook URL of the Teams channel
    #[validate(url(message = "teams.webhook_url must be a URL"))]
    #[serde(default)]
    pub webhook_url: String,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

fn validate_host(host: &str) -> std::result::Result<(), ValidationError> {
    if host.is_empty() || host.contains("://") || host.contains('/') || host.contains(char::is_whitespace) {
        return Err(ValidationError::new("host"));
    }
    Ok(())
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_values() {
        assert_eq!(default_port(), 8080);
        assert_eq!(default_request_timeout(), 30);
        assert_eq!(default_log_level(), "info");
        assert!(default_true());
    }

    #[test]
    fn test_embedded_defaults_need_credentials() {
        let config = Config::load_from(Path::new("does/not/exist.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
        assert!(config.relay().is_err());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[qtest]
api_token = "secret"
manager_url = "example.qtest.com"

[teams]
webhook_url = "https://example.webhook.office.com/hook"
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        let relay = config.relay().unwrap();
        assert_eq!(relay.api_token, "secret");
        assert_eq!(relay.api_host, "example.qtest.com");
        assert_eq!(relay.webhook_url, "https://example.webhook.office.com/hook");
        assert_eq!(config.qtest.request_timeout_secs, 30);
    }

    #[test]
    fn test_environment_overrides_file() {
        std::env::set_var("RELAY__OBSERVABILITY__LOG_LEVEL", "debug");
        let config = Config::load_from(Path::new("does/not/exist.toml"));
        std::env::remove_var("RELAY__OBSERVABILITY__LOG_LEVEL");

        assert_eq!(config.unwrap().observability.log_level, "debug");
    }

    #[test]
    fn test_host_validation() {
        assert!(validate_host("example.qtest.com").is_ok());
        assert!(validate_host("https://example.qtest.com").is_err());
        assert!(validate_host("example.qtest.com/api").is_err());
        assert!(validate_host("").is_err());
    }

    #[test]
    fn test_relay_config_requires_all_values() {
        assert!(RelayConfig::new("t", "example.qtest.com", "https://hook").is_ok());
        assert!(RelayConfig::new("", "example.qtest.com", "https://hook").is_err());
        assert!(RelayConfig::new("t", "", "https://hook").is_err());
        assert!(RelayConfig::new("t", "example.qtest.com", "").is_err());
    }
}
