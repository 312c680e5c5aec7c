//! Error types for the tool hub

use conductor_application::ToolInvocationError;
use thiserror::Error;

/// Errors raised while registering tools or exchanging messages with them
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HubError {
    #[error("Tool {0} is already registered")]
    DuplicateTool(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Channel to tool {0} is closed")]
    ChannelClosed(String),

    #[error("Tool {tool} timed out after {after_ms} ms")]
    Timeout { tool: String, after_ms: u64 },

    #[error("Reply from {tool} carries correlation id {got}, expected {expected}")]
    CorrelationMismatch { tool: String, expected: u64, got: u64 },

    #[error("Malformed reply from {tool}: {reason}")]
    Malformed { tool: String, reason: String },

    #[error("Tool {tool} reported an error: {message}")]
    ToolFailed { tool: String, message: String },
}

impl From<HubError> for ToolInvocationError {
    fn from(err: HubError) -> Self {
        match err {
            HubError::UnknownTool(tool) => ToolInvocationError::UnknownTool(tool),
            HubError::ChannelClosed(tool) => ToolInvocationError::ChannelClosed(tool),
            HubError::Timeout { tool, after_ms } => ToolInvocationError::Timeout { tool, after_ms },
            HubError::Malformed { tool, reason } => {
                ToolInvocationError::MalformedResponse { tool, reason }
            }
            HubError::CorrelationMismatch {
                tool,
                expected,
                got,
            } => ToolInvocationError::MalformedResponse {
                tool,
                reason: format!("correlation id {got}, expected {expected}"),
            },
            HubError::ToolFailed { tool, message } => ToolInvocationError::Failed { tool, message },
            HubError::DuplicateTool(tool) => ToolInvocationError::failed(tool, "duplicate registration"),
        }
    }
}
