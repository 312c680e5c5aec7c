//! Tool invoker port
//!
//! Defines how the executor reaches analysis tools. The infrastructure
//! layer's channel hub is the production adapter.

use async_trait::async_trait;
use conductor_domain::{ToolRequest, ToolResponse};
use thiserror::Error;

/// Errors that can occur during a single tool invocation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolInvocationError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool {tool} timed out after {after_ms} ms")]
    Timeout { tool: String, after_ms: u64 },

    #[error("Channel to tool {0} is closed")]
    ChannelClosed(String),

    #[error("Malformed response from {tool}: {reason}")]
    MalformedResponse { tool: String, reason: String },

    #[error("Tool {tool} failed: {message}")]
    Failed { tool: String, message: String },
}

impl ToolInvocationError {
    pub fn failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Port for invoking tools
///
/// Implementations apply their own per-call timeout. Retries, backoff and
/// fallback are the executor's business, not the invoker's.
#[async_trait]
pub trait ToolInvokerPort: Send + Sync {
    /// Send one request and wait for its response
    async fn invoke(&self, request: ToolRequest) -> Result<ToolResponse, ToolInvocationError>;

    /// Ids of the tools this invoker can reach
    fn available_tools(&self) -> Vec<String>;

    /// Check if a tool is reachable
    fn has_tool(&self, tool_id: &str) -> bool {
        self.available_tools().iter().any(|t| t == tool_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ToolInvocationError::Timeout {
            tool: "security-auditor".to_string(),
            after_ms: 500,
        };
        assert_eq!(err.to_string(), "Tool security-auditor timed out after 500 ms");
        assert!(err.is_timeout());
        assert!(!ToolInvocationError::failed("a", "b").is_timeout());
    }
}
