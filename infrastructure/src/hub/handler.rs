//! Tool handler trait and reply helpers

use async_trait::async_trait;
use conductor_domain::{EXECUTE_OPERATION, ToolPayload, ToolRequest};
use serde_json::{Value, json};

/// A tool served by the hub
///
/// Handlers answer with a raw reply envelope: `{"data": ...}` on success,
/// `{"error": "..."}` on failure. The hub decodes the envelope.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// The tool id requests are addressed to
    fn tool_id(&self) -> &str;

    /// Handle one request and produce the raw reply
    async fn handle(&self, request: &ToolRequest) -> Value;
}

/// Success envelope
pub fn data_reply(data: Value) -> Value {
    json!({ "data": data })
}

/// Failure envelope
pub fn error_reply(message: impl Into<String>) -> Value {
    json!({ "error": message.into() })
}

/// Run `analyze` for an `execute` request and wrap the outcome in an envelope
pub fn execute_reply<F>(request: &ToolRequest, analyze: F) -> Value
where
    F: FnOnce(&ToolPayload) -> Result<Value, String>,
{
    if request.operation != EXECUTE_OPERATION {
        return error_reply(format!("unsupported operation: {}", request.operation));
    }
    match analyze(&request.payload) {
        Ok(data) => data_reply(data),
        Err(message) => error_reply(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_reply_rejects_other_operations() {
        let mut request = ToolRequest::execute("x", ToolPayload::default());
        request.operation = "describe".to_string();
        let reply = execute_reply(&request, |_| Ok(json!(1)));
        assert_eq!(reply["error"], json!("unsupported operation: describe"));
    }

    #[test]
    fn test_execute_reply_wraps_outcome() {
        let request = ToolRequest::execute("x", ToolPayload::default());
        assert_eq!(execute_reply(&request, |_| Ok(json!(1))), json!({"data": 1}));
        assert_eq!(
            execute_reply(&request, |_| Err("bad".to_string())),
            json!({"error": "bad"})
        );
    }
}
