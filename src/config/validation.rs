//! Configuration validation logic

use super::{ConfigError, ServerConfig};

/// Validate the merged configuration
pub(super) fn validate(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.port == 0 {
        return Err(ConfigError::Invalid("port must be non-zero".to_string()));
    }

    if !config.api_prefix.starts_with('/') {
        return Err(ConfigError::Invalid(format!(
            "api_prefix must start with '/', got '{}'",
            config.api_prefix
        )));
    }

    if config.is_rate_limited() && config.rate_limit_burst_size == 0 {
        return Err(ConfigError::Invalid(
            "rate_limit_burst_size must be non-zero when rate limiting is enabled".to_string(),
        ));
    }

    if let Some(timeout) = config.plugins.command_timeout_seconds {
        if !(timeout.is_finite() && timeout > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "command_timeout_seconds must be a positive number, got {timeout}"
            )));
        }
    }

    Ok(())
}
