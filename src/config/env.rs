//! Environment variable loading

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use super::ConfigError;

/// Values read from the environment. `None` means the variable is unset.
#[derive(Debug, Default)]
pub(super) struct EnvConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub api_prefix: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub cors_allowed_origins: Option<String>,
    pub rate_limit_requests_per_second: Option<u32>,
    pub rate_limit_burst_size: Option<u32>,
    /// `Some("")` disables discovery
    pub plugin_dir: Option<String>,
    pub enabled_plugins: Option<Vec<String>>,
    pub command_timeout_seconds: Option<f64>,
}

impl EnvConfig {
    pub(super) fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            host: string("MCP_HOST"),
            port: parsed("MCP_PORT")?,
            api_prefix: string("MCP_API_PREFIX"),
            log_level: string("MCP_LOG_LEVEL"),
            log_file: string("MCP_LOG_FILE").map(PathBuf::from),
            cors_allowed_origins: string("CORS_ALLOWED_ORIGINS"),
            rate_limit_requests_per_second: parsed("MCP_RATE_LIMIT")?,
            rate_limit_burst_size: parsed("MCP_RATE_LIMIT_BURST")?,
            plugin_dir: env::var("MCP_PLUGINS_DIR").ok(),
            enabled_plugins: string("MCP_ENABLED_PLUGINS").map(|list| split_list(&list)),
            command_timeout_seconds: parsed("MCP_COMMAND_TIMEOUT")?,
        })
    }
}

/// Non-empty string value of a variable
fn string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parsed<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match string(name) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { name, value }),
        None => Ok(None),
    }
}

/// Split a comma-separated list, dropping empty entries
pub(super) fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(" system_info, clipboard ,,"),
            vec!["system_info".to_string(), "clipboard".to_string()]
        );
        assert!(split_list("").is_empty());
    }
}
