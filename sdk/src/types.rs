//! Command request/result types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{ConsoleErrorExt, EngineError};

/// A command addressed to the console by the host process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    /// Opaque correlation id echoed back in the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,

    pub command: String,

    #[serde(default)]
    pub params: HashMap<String, serde_json::Value>,
}

impl CommandRequest {
    /// Create a new CommandRequest
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            id: None,
            command: command.into(),
            params: HashMap::new(),
        }
    }

    /// Set the correlation id
    pub fn with_id(mut self, id: serde_json::Value) -> Self {
        self.id = Some(id);
        self
    }

    /// Add a parameter
    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Get a string parameter
    pub fn param_str(&self, key: &str) -> Result<String, ParamError> {
        match self.params.get(key) {
            None => Err(ParamError::MissingParameter(key.to_string())),
            Some(v) => v
                .as_str()
                .map(String::from)
                .ok_or_else(|| ParamError::InvalidParameter(format!("{} must be a string", key))),
        }
    }

    /// Get a non-negative integer parameter
    pub fn param_usize(&self, key: &str) -> Result<usize, ParamError> {
        match self.params.get(key) {
            None => Err(ParamError::MissingParameter(key.to_string())),
            Some(v) => v.as_u64().map(|n| n as usize).ok_or_else(|| {
                ParamError::InvalidParameter(format!("{} must be a non-negative integer", key))
            }),
        }
    }

    /// Get an optional non-negative integer parameter
    pub fn param_usize_opt(&self, key: &str) -> Result<Option<usize>, ParamError> {
        if self.params.get(key).map_or(true, |v| v.is_null()) {
            return Ok(None);
        }
        self.param_usize(key).map(Some)
    }

    /// Get an optional bool parameter
    pub fn param_bool_opt(&self, key: &str) -> Result<Option<bool>, ParamError> {
        match self.params.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(v) => v
                .as_bool()
                .map(Some)
                .ok_or_else(|| ParamError::InvalidParameter(format!("{} must be a boolean", key))),
        }
    }

    /// Get a parameter as a JSON value
    pub fn param_json(&self, key: &str) -> Result<&serde_json::Value, ParamError> {
        self.params
            .get(key)
            .ok_or_else(|| ParamError::MissingParameter(key.to_string()))
    }
}

/// Structured result of every console command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl CommandResult {
    /// Successful result carrying a payload
    pub fn ok(payload: serde_json::Value) -> Self {
        Self {
            success: true,
            message: None,
            payload: Some(payload),
            hint: None,
        }
    }

    /// Successful result carrying only a message
    pub fn ok_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            payload: None,
            hint: None,
        }
    }

    /// Failed result with a message
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            payload: None,
            hint: None,
        }
    }

    /// Failed result built from an engine error
    pub fn from_error(error: &EngineError) -> Self {
        Self {
            success: false,
            message: Some(error.to_string()),
            payload: None,
            hint: Some(error.user_hint().to_string()),
        }
    }

    /// Attach a message to a result
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Parameter extraction errors
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl From<ParamError> for EngineError {
    fn from(e: ParamError) -> Self {
        EngineError::InvalidParameter(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_request_new() {
        let request = CommandRequest::new("rank");
        assert_eq!(request.command, "rank");
        assert!(request.params.is_empty());
        assert!(request.id.is_none());
    }

    #[test]
    fn test_request_parses_without_params() {
        let request: CommandRequest =
            serde_json::from_str(r#"{"id": 7, "command": "show_dashboard"}"#).unwrap();
        assert_eq!(request.id, Some(json!(7)));
        assert_eq!(request.command, "show_dashboard");
        assert!(request.params.is_empty());
    }

    #[test]
    fn test_param_str() {
        let request = CommandRequest::new("draft_pitch").with_param("product_name", json!("Mug"));
        assert_eq!(request.param_str("product_name").unwrap(), "Mug");
        assert!(matches!(
            request.param_str("product_link"),
            Err(ParamError::MissingParameter(_))
        ));
    }

    #[test]
    fn test_param_str_wrong_type() {
        let request = CommandRequest::new("rank").with_param("kpi", json!(3));
        assert!(matches!(
            request.param_str("kpi"),
            Err(ParamError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_param_usize_rejects_negative() {
        let request = CommandRequest::new("rank").with_param("count", json!(-2));
        assert!(request.param_usize("count").is_err());

        let request = CommandRequest::new("rank").with_param("count", json!(5));
        assert_eq!(request.param_usize("count").unwrap(), 5);
    }

    #[test]
    fn test_optional_params() {
        let request = CommandRequest::new("rank")
            .with_param("ascending", json!(true))
            .with_param("count", json!(null));

        assert_eq!(request.param_bool_opt("ascending").unwrap(), Some(true));
        assert_eq!(request.param_bool_opt("missing").unwrap(), None);
        assert_eq!(request.param_usize_opt("count").unwrap(), None);
    }

    #[test]
    fn test_result_serialization_skips_empty_fields() {
        let result = CommandResult::ok_message("No user conversations found to analyze.");
        let json = result.to_json();
        assert!(json.contains(r#""success":true"#));
        assert!(!json.contains("payload"));
        assert!(!json.contains("hint"));
    }

    #[test]
    fn test_result_from_error_carries_hint() {
        let result = CommandResult::from_error(&EngineError::FetchFailure("offline".to_string()));
        assert!(!result.success);
        assert_eq!(
            result.message.as_deref(),
            Some("Failed to fetch chats: offline")
        );
        assert!(result.hint.is_some());
    }

    #[test]
    fn test_param_error_into_engine_error() {
        let error: EngineError = ParamError::MissingParameter("kpi".to_string()).into();
        assert!(matches!(error, EngineError::InvalidParameter(_)));
        assert!(error.to_string().contains("kpi"));
    }
}
