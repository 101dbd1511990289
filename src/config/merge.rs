//! Merging YAML and environment configurations

use std::path::PathBuf;

use super::env::EnvConfig;
use super::yaml::YamlConfig;
use super::{ConfigError, PluginConfig, ServerConfig};

/// Build the final configuration: defaults, then environment, then YAML
pub(super) fn merge_config(yaml: Option<YamlConfig>) -> Result<ServerConfig, ConfigError> {
    let env = EnvConfig::load()?;
    let yaml = yaml.unwrap_or_default();
    let defaults = ServerConfig::default();

    let server = yaml.server.unwrap_or_default();
    let logging = yaml.logging.unwrap_or_default();
    let security = yaml.security.unwrap_or_default();
    let plugins = yaml.plugins.unwrap_or_default();

    let plugin_dir = match plugins.plugin_dir.or(env.plugin_dir) {
        Some(dir) if dir.trim().is_empty() => None,
        Some(dir) => Some(PathBuf::from(dir)),
        None => defaults.plugins.plugin_dir,
    };

    Ok(ServerConfig {
        host: server.host.or(env.host).unwrap_or(defaults.host),
        port: server.port.or(env.port).unwrap_or(defaults.port),
        api_prefix: server
            .api_prefix
            .or(env.api_prefix)
            .unwrap_or(defaults.api_prefix),
        log_level: logging
            .level
            .or(env.log_level)
            .unwrap_or(defaults.log_level),
        log_file: logging.file.map(PathBuf::from).or(env.log_file),
        cors_allowed_origins: security
            .cors_allowed_origins
            .or(env.cors_allowed_origins)
            .or(defaults.cors_allowed_origins),
        rate_limit_requests_per_second: security
            .rate_limit_requests_per_second
            .or(env.rate_limit_requests_per_second)
            .unwrap_or(defaults.rate_limit_requests_per_second),
        rate_limit_burst_size: security
            .rate_limit_burst_size
            .or(env.rate_limit_burst_size)
            .unwrap_or(defaults.rate_limit_burst_size),
        plugins: PluginConfig {
            plugin_dir,
            enabled_plugins: plugins
                .enabled_plugins
                .or(env.enabled_plugins)
                .unwrap_or_default(),
            settings: plugins.settings,
            command_timeout_seconds: plugins
                .command_timeout_seconds
                .or(env.command_timeout_seconds),
        },
    })
}
