//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod composite_lifecycle;
pub mod lifecycle;
pub mod tool_invoker;
