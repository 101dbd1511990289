//! Configuration module for the MCP server
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use mcp_server::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod env;
mod merge;
mod validation;
mod yaml;

pub use yaml::YamlConfig;

/// Default bind host
pub const DEFAULT_HOST: &str = "localhost";
/// Default bind port
pub const DEFAULT_PORT: u16 = 8080;
/// Default prefix for the plugin API routes
pub const DEFAULT_API_PREFIX: &str = "/api";
/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Default plugin directory (relative to the working directory)
pub const DEFAULT_PLUGIN_DIR: &str = "plugins";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Plugin system configuration
///
/// The settings provider the registry snapshots at construction.
///
/// # Example YAML
/// ```yaml
/// plugins:
///   plugin_dir: "/var/lib/mcp/plugins"
///   enabled_plugins: ["system_info"]
///   command_timeout_seconds: 30
///   settings:
///     system_info:
///       cpu_sample_interval_ms: 500
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PluginConfig {
    /// Plugin directory. `None` disables discovery entirely.
    pub plugin_dir: Option<PathBuf>,
    /// Allow-list of plugin identities. Empty means every plugin is enabled.
    pub enabled_plugins: Vec<String>,
    /// Plugin-specific configuration (keyed by plugin identity)
    pub settings: HashMap<String, serde_json::Value>,
    /// Per-command timeout. `None` lets commands run to completion.
    pub command_timeout_seconds: Option<f64>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            plugin_dir: Some(PathBuf::from(DEFAULT_PLUGIN_DIR)),
            enabled_plugins: Vec::new(),
            settings: HashMap::new(),
            command_timeout_seconds: None,
        }
    }
}

impl PluginConfig {
    /// Whether the allow-list admits this plugin identity
    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled_plugins.is_empty() || self.enabled_plugins.iter().any(|p| p == name)
    }

    /// Configured command timeout, if any
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_seconds
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .filter(|timeout| !timeout.is_zero())
    }
}

/// Server configuration
///
/// Contains all configuration needed to run the MCP server:
/// - Server settings (host, port, API prefix)
/// - Logging settings
/// - Security settings (CORS, rate limiting)
/// - Plugin settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,
    /// Prefix for the plugin API routes (e.g., "/api")
    pub api_prefix: String,

    // Logging
    /// Default log filter directive, overridden by `RUST_LOG`
    pub log_level: String,
    /// Optional log file, written in addition to stdout
    pub log_file: Option<PathBuf>,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: "*"
    pub cors_allowed_origins: Option<String>,

    // Rate limiting configuration
    /// Maximum requests per second per IP address (0 disables rate limiting)
    /// Default: 100
    pub rate_limit_requests_per_second: u32,
    /// Maximum burst size for rate limiting
    /// Default: 20
    pub rate_limit_burst_size: u32,

    // Plugin configuration
    pub plugins: PluginConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_file: None,
            cors_allowed_origins: Some("*".to_string()),
            rate_limit_requests_per_second: 100,
            rate_limit_burst_size: 20,
            plugins: PluginConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Missing variables fall back to defaults. The `.env` file is loaded in
    /// `main` before this is called.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = merge::merge_config(None)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Re-run validation, e.g. after CLI overrides
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate(self)
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if rate limiting is enabled
    pub fn is_rate_limited(&self) -> bool {
        self.rate_limit_requests_per_second > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    // Helper to clean up environment variables
    fn cleanup_env_vars() {
        unsafe {
            env::remove_var("MCP_HOST");
            env::remove_var("MCP_PORT");
            env::remove_var("MCP_API_PREFIX");
            env::remove_var("MCP_LOG_LEVEL");
            env::remove_var("MCP_LOG_FILE");
            env::remove_var("CORS_ALLOWED_ORIGINS");
            env::remove_var("MCP_RATE_LIMIT");
            env::remove_var("MCP_RATE_LIMIT_BURST");
            env::remove_var("MCP_PLUGINS_DIR");
            env::remove_var("MCP_ENABLED_PLUGINS");
            env::remove_var("MCP_COMMAND_TIMEOUT");
        }
    }

    #[test]
    fn test_plugin_config_allow_list() {
        let all = PluginConfig::default();
        assert!(all.is_enabled("system_info"));
        assert!(all.is_enabled("anything"));

        let restricted = PluginConfig {
            enabled_plugins: vec!["system_info".to_string()],
            ..Default::default()
        };
        assert!(restricted.is_enabled("system_info"));
        assert!(!restricted.is_enabled("clipboard"));
    }

    #[test]
    fn test_plugin_config_command_timeout() {
        let mut config = PluginConfig::default();
        assert_eq!(config.command_timeout(), None);

        config.command_timeout_seconds = Some(1.5);
        assert_eq!(config.command_timeout(), Some(Duration::from_millis(1500)));

        config.command_timeout_seconds = Some(-1.0);
        assert_eq!(config.command_timeout(), None);
    }

    #[test]
    fn test_address() {
        let config = ServerConfig::default();
        assert_eq!(config.address(), "localhost:8080");
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        cleanup_env_vars();

        let config = ServerConfig::from_env().unwrap();

        assert_eq!(config, ServerConfig::default());
        assert!(config.is_rate_limited());
    }

    #[test]
    #[serial]
    fn test_from_file_yaml_only() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let yaml_content = r#"
server:
  host: "127.0.0.1"
  port: 9000
  api_prefix: "/v1"

logging:
  level: "debug"
  file: "/tmp/mcp.log"

plugins:
  plugin_dir: "/tmp/mcp-plugins"
  enabled_plugins: ["system_info"]
  command_timeout_seconds: 30
  settings:
    system_info:
      cpu_sample_interval_ms: 250
"#;

        fs::write(&config_path, yaml_content).unwrap();

        let config = ServerConfig::from_file(&config_path).unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.api_prefix, "/v1");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/mcp.log")));
        assert_eq!(
            config.plugins.plugin_dir,
            Some(PathBuf::from("/tmp/mcp-plugins"))
        );
        assert_eq!(config.plugins.enabled_plugins, vec!["system_info".to_string()]);
        assert_eq!(config.plugins.command_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(
            config.plugins.settings["system_info"]["cpu_sample_interval_ms"],
            serde_json::json!(250)
        );

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_yaml_overrides_env() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let yaml_content = r#"
server:
  host: "127.0.0.1"
"#;

        fs::write(&config_path, yaml_content).unwrap();

        unsafe {
            env::set_var("MCP_HOST", "0.0.0.0");
            env::set_var("MCP_PORT", "3001");
            env::set_var("MCP_ENABLED_PLUGINS", "system_info, clipboard");
        }

        let config = ServerConfig::from_file(&config_path).unwrap();

        // YAML overrides ENV
        assert_eq!(config.host, "127.0.0.1");
        // ENV value
        assert_eq!(config.port, 3001);
        assert_eq!(
            config.plugins.enabled_plugins,
            vec!["system_info".to_string(), "clipboard".to_string()]
        );

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_missing_file() {
        cleanup_env_vars();

        let config_path = PathBuf::from("/nonexistent/config.yaml");
        let result = ServerConfig::from_file(&config_path);

        assert!(matches!(result, Err(ConfigError::Read { .. })));
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_invalid_values_rejected() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        fs::write(&config_path, "server:\n  api_prefix: \"api\"\n").unwrap();

        let result = ServerConfig::from_file(&config_path);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_port() {
        cleanup_env_vars();

        unsafe {
            env::set_var("MCP_PORT", "not-a-port");
        }

        let result = ServerConfig::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnv { name: "MCP_PORT", .. })
        ));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_empty_plugin_dir_disables_discovery() {
        cleanup_env_vars();

        unsafe {
            env::set_var("MCP_PLUGINS_DIR", "");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.plugins.plugin_dir, None);

        cleanup_env_vars();
    }
}
