//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Unknown task type: {0}")]
    UnknownTaskType(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid preference value: {0}")]
    InvalidPreference(String),

    #[error("Invalid stage transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

impl DomainError {
    /// Check if this error refers to a tool missing from the catalog
    pub fn is_unknown_tool(&self) -> bool {
        matches!(self, DomainError::UnknownTool(_))
    }
}
