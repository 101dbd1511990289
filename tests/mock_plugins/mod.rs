//! Mock Plugins
//!
//! Small plugins with scripted behavior for driving the registry and the HTTP
//! API end to end:
//! - `alpha`: echoes parameters, can panic, fail or stall on request
//! - `beta`: registered twice under different units
//! - `stubborn`: fails to shut down
//! - `broken`: fails to initialize

#![allow(dead_code)]

use std::time::Duration;

use mcp_server::plugin::builtin::SystemInfoPlugin;
use mcp_server::plugin::prelude::*;

pub struct ScriptedPlugin {
    name: &'static str,
    ready: bool,
    fail_init: bool,
    fail_shutdown: bool,
}

impl ScriptedPlugin {
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            ready: false,
            fail_init: false,
            fail_shutdown: false,
        }
    }
}

#[async_trait]
impl Plugin for ScriptedPlugin {
    fn name(&self) -> &str {
        self.name
    }

    async fn initialize(&mut self, _ctx: &PluginContext) -> Result<(), PluginError> {
        if self.fail_init {
            return Err(PluginError::InitializationFailed(
                "device unavailable".to_string(),
            ));
        }
        self.ready = true;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), PluginError> {
        self.ready = false;
        if self.fail_shutdown {
            return Err(PluginError::ShutdownFailed("handle still open".to_string()));
        }
        Ok(())
    }

    async fn handle_command(&self, command: PluginCommand) -> Result<PluginResponse, PluginError> {
        if !self.ready {
            return Ok(PluginResponse::not_initialized());
        }

        match command.command.as_str() {
            "echo" => Ok(PluginResponse::ok(command.parameters)),
            "explode" => panic!("scripted panic"),
            "fail" => Err(PluginError::Internal("scripted failure".to_string())),
            "stall" => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(PluginResponse::from_value(json!({"stalled": true})))
            }
            "missing_parameter" => match command.parameter_str("path") {
                Some(path) => Ok(PluginResponse::from_value(json!({ "path": path }))),
                None => Ok(PluginResponse::failure("Missing parameter: path")),
            },
            other => Ok(PluginResponse::unknown_command(other)),
        }
    }
}

pub fn alpha() -> Box<dyn Plugin> {
    Box::new(ScriptedPlugin::named("alpha"))
}

pub fn beta() -> Box<dyn Plugin> {
    Box::new(ScriptedPlugin::named("beta"))
}

pub fn stubborn() -> Box<dyn Plugin> {
    Box::new(ScriptedPlugin {
        fail_shutdown: true,
        ..ScriptedPlugin::named("stubborn")
    })
}

pub fn broken() -> Box<dyn Plugin> {
    Box::new(ScriptedPlugin {
        fail_init: true,
        ..ScriptedPlugin::named("broken")
    })
}

pub fn malformed() -> Box<dyn Plugin> {
    panic!("syntax error in plugin module")
}

pub fn system_info() -> Box<dyn Plugin> {
    Box::new(SystemInfoPlugin::default())
}
