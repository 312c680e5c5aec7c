//! Tool invocation envelope
//!
//! The shapes exchanged with tools across the invocation boundary:
//! a [`ToolRequest`] goes out, a [`ToolResponse`] comes back.

pub mod envelope;

pub use envelope::{ORCHESTRATOR_ID, ToolPayload, ToolRequest, ToolResponse, EXECUTE_OPERATION};
