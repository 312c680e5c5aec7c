//! Request/response envelope for tool invocations

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sender id stamped on every request
pub const ORCHESTRATOR_ID: &str = "orchestrator";

/// The only operation tools are asked to perform
pub const EXECUTE_OPERATION: &str = "execute";

/// Input plus the flattened outputs of earlier stages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolPayload {
    pub input: Value,
    #[serde(default)]
    pub context: Map<String, Value>,
}

impl ToolPayload {
    pub fn new(input: Value, context: Map<String, Value>) -> Self {
        Self { input, context }
    }

    /// Text view of the input: the string itself, or a `code`/`source`/`text`
    /// field of an object, or the serialized JSON as a last resort
    pub fn input_text(&self) -> String {
        match &self.input {
            Value::String(s) => s.clone(),
            Value::Object(map) => ["code", "source", "text", "content"]
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_str))
                .map(str::to_string)
                .unwrap_or_else(|| self.input.to_string()),
            other => other.to_string(),
        }
    }
}

/// A request to one tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub from_id: String,
    pub tool_id: String,
    pub operation: String,
    pub payload: ToolPayload,
}

impl ToolRequest {
    /// An `execute` request from the orchestrator
    pub fn execute(tool_id: impl Into<String>, payload: ToolPayload) -> Self {
        Self {
            from_id: ORCHESTRATOR_ID.to_string(),
            tool_id: tool_id.into(),
            operation: EXECUTE_OPERATION.to_string(),
            payload,
        }
    }
}

/// A successful tool reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub data: Value,
}

impl ToolResponse {
    pub fn new(data: Value) -> Self {
        Self { data }
    }

    /// Decode a raw reply envelope. A reply without a `data` field is
    /// rejected, as is one carrying an `error` field.
    pub fn from_raw(raw: Value) -> Result<Self, DomainError> {
        let Value::Object(mut map) = raw else {
            return Err(DomainError::InvalidPayload(
                "tool reply is not an object".to_string(),
            ));
        };
        if let Some(error) = map.get("error").filter(|e| !e.is_null()) {
            let message = error.as_str().map(str::to_string).unwrap_or_else(|| error.to_string());
            return Err(DomainError::InvalidPayload(message));
        }
        map.remove("data")
            .map(Self::new)
            .ok_or_else(|| DomainError::InvalidPayload("tool reply has no data field".to_string()))
    }
}
