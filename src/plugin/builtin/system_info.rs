//! System Information Plugin
//!
//! Reports host, CPU and memory information through the `sysinfo` crate.
//!
//! # Commands
//!
//! | Command           | Parameters             | Data                                                   |
//! |-------------------|------------------------|--------------------------------------------------------|
//! | `get_system_info` |                        | system, release, version, machine, processor, hostname |
//! | `get_cpu_info`    | `interval_ms` optional | cpu_count, cpu_percent, cpu_freq                       |
//! | `get_memory_info` |                        | total, available, percent, used, free (bytes)          |

use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use sysinfo::System;

use crate::plugin::capabilities::Plugin;
use crate::plugin::command::{PluginCommand, PluginResponse};
use crate::plugin::isolation::PluginError;
use crate::plugin::lifecycle::PluginContext;
use crate::register_plugin;

/// Plugin identity
pub const PLUGIN_NAME: &str = "system_info";

/// Default window over which CPU load is sampled
pub const DEFAULT_CPU_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Upper bound for a caller-supplied sampling window
const MAX_CPU_SAMPLE_INTERVAL: Duration = Duration::from_secs(10);

/// System information plugin
#[derive(Debug)]
pub struct SystemInfoPlugin {
    ready: bool,
    cpu_sample_interval: Duration,
}

impl Default for SystemInfoPlugin {
    fn default() -> Self {
        Self {
            ready: false,
            cpu_sample_interval: DEFAULT_CPU_SAMPLE_INTERVAL,
        }
    }
}

impl SystemInfoPlugin {
    fn sample_interval(&self, command: &PluginCommand) -> Duration {
        command
            .parameter_u64("interval_ms")
            .map(Duration::from_millis)
            .unwrap_or(self.cpu_sample_interval)
            .clamp(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL, MAX_CPU_SAMPLE_INTERVAL)
    }

    fn system_info() -> Value {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        let processor = sys
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .filter(|brand| !brand.is_empty());

        json!({
            "system": System::name(),
            "release": System::kernel_version(),
            "version": System::os_version(),
            "machine": std::env::consts::ARCH,
            "processor": processor,
            "hostname": System::host_name(),
            "long_os_version": System::long_os_version(),
        })
    }

    async fn cpu_info(interval: Duration) -> Value {
        let mut sys = System::new();

        // Usage is computed from the difference between two refreshes
        sys.refresh_cpu_all();
        tokio::time::sleep(interval).await;
        sys.refresh_cpu_all();

        let frequencies: Vec<u64> = sys.cpus().iter().map(|cpu| cpu.frequency()).collect();
        let cpu_freq = if frequencies.is_empty() {
            Value::Null
        } else {
            let current = frequencies.iter().sum::<u64>() as f64 / frequencies.len() as f64;
            json!({
                "current": current,
                "min": frequencies.iter().min(),
                "max": frequencies.iter().max(),
            })
        };

        json!({
            "cpu_count": sys.cpus().len(),
            "cpu_percent": sys.global_cpu_usage(),
            "cpu_freq": cpu_freq,
        })
    }

    fn memory_info() -> Value {
        let mut sys = System::new();
        sys.refresh_memory();

        let total = sys.total_memory();
        let available = sys.available_memory();
        let percent = if total > 0 {
            (total.saturating_sub(available)) as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        json!({
            "total": total,
            "available": available,
            "percent": (percent * 10.0).round() / 10.0,
            "used": sys.used_memory(),
            "free": sys.free_memory(),
        })
    }
}

#[async_trait]
impl Plugin for SystemInfoPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    async fn initialize(&mut self, ctx: &PluginContext) -> Result<(), PluginError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(PluginError::InitializationFailed(format!(
                "{} is not supported on {}",
                ctx.plugin_id,
                std::env::consts::OS
            )));
        }

        if let Some(value) = ctx.config.get("cpu_sample_interval_ms") {
            let ms = value.as_u64().ok_or_else(|| {
                PluginError::Configuration(format!(
                    "cpu_sample_interval_ms must be a non-negative integer, got {value}"
                ))
            })?;
            self.cpu_sample_interval = Duration::from_millis(ms);
        }

        self.ready = true;
        tracing::debug!(
            plugin = %ctx.plugin_id,
            cpu_sample_interval_ms = self.cpu_sample_interval.as_millis() as u64,
            "System info plugin initialized"
        );
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), PluginError> {
        self.ready = false;
        Ok(())
    }

    async fn handle_command(&self, command: PluginCommand) -> Result<PluginResponse, PluginError> {
        if !self.ready {
            return Ok(PluginResponse::not_initialized());
        }

        let data = match command.command.as_str() {
            "get_system_info" => Self::system_info(),
            "get_cpu_info" => Self::cpu_info(self.sample_interval(&command)).await,
            "get_memory_info" => Self::memory_info(),
            other => return Ok(PluginResponse::unknown_command(other)),
        };

        Ok(PluginResponse::from_value(data))
    }
}

register_plugin!(SystemInfoPlugin::default);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::registry::registered_constructors;

    async fn ready_plugin() -> SystemInfoPlugin {
        let mut plugin = SystemInfoPlugin::default();
        let ctx = PluginContext::new(
            PLUGIN_NAME,
            std::env::temp_dir().join(PLUGIN_NAME),
            Value::Null,
        );
        plugin.initialize(&ctx).await.unwrap();
        plugin
    }

    #[test]
    fn test_plugin_is_registered() {
        assert!(
            registered_constructors()
                .any(|constructor| constructor.unit_name() == "system_info")
        );
    }

    #[tokio::test]
    async fn test_commands_before_initialize() {
        let plugin = SystemInfoPlugin::default();
        let response = plugin
            .handle_command(PluginCommand::new("get_memory_info"))
            .await
            .unwrap();
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("Plugin not initialized"));
    }

    #[tokio::test]
    async fn test_commands_after_shutdown() {
        let mut plugin = ready_plugin().await;
        plugin.shutdown().await.unwrap();

        let response = plugin
            .handle_command(PluginCommand::new("get_system_info"))
            .await
            .unwrap();
        assert_eq!(response, PluginResponse::not_initialized());
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let plugin = ready_plugin().await;
        let response = plugin
            .handle_command(PluginCommand::new("reboot"))
            .await
            .unwrap();
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.error.as_deref(), Some("Unknown command: reboot"));
    }

    #[tokio::test]
    async fn test_get_system_info() {
        let plugin = ready_plugin().await;
        let response = plugin
            .handle_command(PluginCommand::new("get_system_info"))
            .await
            .unwrap();

        assert!(response.success);
        let data = response.data.unwrap();
        for key in [
            "system",
            "release",
            "version",
            "machine",
            "processor",
            "hostname",
        ] {
            assert!(data.contains_key(key), "missing {key}");
        }
        assert_eq!(data["machine"], json!(std::env::consts::ARCH));
    }

    #[tokio::test]
    async fn test_sample_interval_setting() {
        let mut plugin = SystemInfoPlugin::default();
        let ctx = PluginContext::new(
            PLUGIN_NAME,
            std::env::temp_dir().join(PLUGIN_NAME),
            json!({"cpu_sample_interval_ms": 250}),
        );
        plugin.initialize(&ctx).await.unwrap();
        assert_eq!(plugin.cpu_sample_interval, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_invalid_sample_interval_setting() {
        let mut plugin = SystemInfoPlugin::default();
        let ctx = PluginContext::new(
            PLUGIN_NAME,
            std::env::temp_dir().join(PLUGIN_NAME),
            json!({"cpu_sample_interval_ms": "fast"}),
        );

        match plugin.initialize(&ctx).await {
            Err(PluginError::Configuration(msg)) => {
                assert!(msg.contains("cpu_sample_interval_ms"))
            }
            other => panic!("Expected Configuration error, got {other:?}"),
        }
        assert!(!plugin.ready);
    }

    #[tokio::test]
    async fn test_get_memory_info() {
        let plugin = ready_plugin().await;
        let response = plugin
            .handle_command(PluginCommand::new("get_memory_info"))
            .await
            .unwrap();

        assert!(response.success);
        let data = response.data.unwrap();
        let total = data["total"].as_u64().unwrap();
        let available = data["available"].as_u64().unwrap();
        let percent = data["percent"].as_f64().unwrap();
        assert!(total > 0);
        assert!(available <= total);
        assert!((0.0..=100.0).contains(&percent));
        assert!(data.contains_key("used"));
        assert!(data.contains_key("free"));
    }

    #[tokio::test]
    async fn test_get_cpu_info() {
        let plugin = ready_plugin().await;
        let response = plugin
            .handle_command(PluginCommand::new("get_cpu_info").with_parameter("interval_ms", 0))
            .await
            .unwrap();

        assert!(response.success);
        let data = response.data.unwrap();
        assert!(data["cpu_count"].as_u64().unwrap() > 0);
        assert!(data["cpu_percent"].is_number());
        assert!(data.contains_key("cpu_freq"));
    }

    #[test]
    fn test_sample_interval_is_clamped() {
        let plugin = SystemInfoPlugin::default();

        let too_short = PluginCommand::new("get_cpu_info").with_parameter("interval_ms", 0);
        assert_eq!(
            plugin.sample_interval(&too_short),
            sysinfo::MINIMUM_CPU_UPDATE_INTERVAL
        );

        let too_long = PluginCommand::new("get_cpu_info").with_parameter("interval_ms", 600_000);
        assert_eq!(plugin.sample_interval(&too_long), MAX_CPU_SAMPLE_INTERVAL);

        let default = PluginCommand::new("get_cpu_info");
        assert_eq!(plugin.sample_interval(&default), DEFAULT_CPU_SAMPLE_INTERVAL);
    }
}
