//! Command and Response Envelopes
//!
//! The data contract exchanged with a plugin. Parameters are a loosely typed
//! JSON map; each plugin validates its own parameters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named operation sent to a plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginCommand {
    /// Name of the operation to run (e.g., "get_memory_info")
    pub command: String,

    /// Operation parameters, empty when omitted
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl PluginCommand {
    /// Create a command with no parameters
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            parameters: Map::new(),
        }
    }

    /// Add a parameter
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Get a parameter as a string slice
    pub fn parameter_str(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(Value::as_str)
    }

    /// Get a parameter as an unsigned integer
    pub fn parameter_u64(&self, key: &str) -> Option<u64> {
        self.parameters.get(key).and_then(Value::as_u64)
    }
}

/// Uniform result of a plugin command
///
/// `data` is only meaningful when `success` is true and `error` only when it
/// is false. Use [`PluginResponse::ok`] and [`PluginResponse::failure`] to
/// build responses that keep this invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PluginResponse {
    /// Successful response carrying `data`
    pub fn ok(data: Map<String, Value>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Plugin-reported failure
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Failure for a command name the plugin does not recognize
    pub fn unknown_command(command: &str) -> Self {
        Self::failure(format!("Unknown command: {command}"))
    }

    /// Failure returned while a plugin is not initialized
    pub fn not_initialized() -> Self {
        Self::failure("Plugin not initialized")
    }

    /// Build a successful response from a JSON value.
    ///
    /// Non-object values are wrapped under a `"value"` key.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::ok(map),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                Self::ok(map)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_parameters_default_to_empty() {
        let command: PluginCommand = serde_json::from_value(json!({"command": "bogus"})).unwrap();
        assert_eq!(command.command, "bogus");
        assert!(command.parameters.is_empty());
    }

    #[test]
    fn test_command_requires_name() {
        let result = serde_json::from_value::<PluginCommand>(json!({"parameters": {}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_command_parameter_accessors() {
        let command = PluginCommand::new("sample")
            .with_parameter("interval_ms", 250)
            .with_parameter("unit", "bytes");

        assert_eq!(command.parameter_u64("interval_ms"), Some(250));
        assert_eq!(command.parameter_str("unit"), Some("bytes"));
        assert_eq!(command.parameter_str("interval_ms"), None);
        assert_eq!(command.parameter_u64("missing"), None);
    }

    #[test]
    fn test_success_response_omits_error() {
        let response = PluginResponse::from_value(json!({"total": 1024}));
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value, json!({"success": true, "data": {"total": 1024}}));
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_unknown_command_response() {
        let value = serde_json::to_value(PluginResponse::unknown_command("bogus")).unwrap();
        assert_eq!(value, json!({"success": false, "error": "Unknown command: bogus"}));
    }

    #[test]
    fn test_from_value_wraps_scalars() {
        let response = PluginResponse::from_value(json!(42));
        assert_eq!(response.data.unwrap().get("value"), Some(&json!(42)));
    }
}
