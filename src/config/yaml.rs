use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use super::ConfigError;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. YAML values take
/// precedence over environment variables.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 8080
///   api_prefix: "/api"
///
/// logging:
///   level: "info"
///   file: "/var/log/mcp-server.log"
///
/// security:
///   cors_allowed_origins: "*"
///   rate_limit_requests_per_second: 100
///   rate_limit_burst_size: 20
///
/// plugins:
///   plugin_dir: "plugins"
///   enabled_plugins: []
///   command_timeout_seconds: 30
///   settings:
///     system_info:
///       cpu_sample_interval_ms: 1000
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub logging: Option<LoggingYaml>,
    pub security: Option<SecurityYaml>,
    pub plugins: Option<PluginsYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub api_prefix: Option<String>,
}

/// Logging configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoggingYaml {
    pub level: Option<String>,
    pub file: Option<String>,
}

/// Security configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    /// CORS allowed origins (comma-separated list or "*" for all)
    pub cors_allowed_origins: Option<String>,
    /// Maximum requests per second per IP address
    pub rate_limit_requests_per_second: Option<u32>,
    /// Maximum burst size for rate limiting
    pub rate_limit_burst_size: Option<u32>,
}

/// Plugin configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PluginsYaml {
    /// Plugin directory; an empty string disables discovery
    pub plugin_dir: Option<String>,
    /// Allow-list of plugin identities
    pub enabled_plugins: Option<Vec<String>>,
    /// Per-command timeout in seconds
    pub command_timeout_seconds: Option<f64>,
    /// Plugin-specific configuration (keyed by plugin identity)
    pub settings: HashMap<String, serde_json::Value>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be read
    /// - The YAML is malformed
    /// - Required fields have invalid types
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: YamlConfig = serde_yaml::from_str(&contents)?;

        Ok(config)
    }
}
