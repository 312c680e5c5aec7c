//! Application layer for tool-conductor
//!
//! This crate contains use cases, port definitions, shared state and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod stores;
pub mod use_cases;

// Re-export commonly used types
pub use config::{OrchestrationParams, SpeedMultipliers};
pub use ports::{
    composite_lifecycle::CompositeLifecycle,
    lifecycle::{LifecycleEvent, LifecycleNotifier, NoLifecycle},
    tool_invoker::{ToolInvocationError, ToolInvokerPort},
};
pub use stores::{CapabilityRegistry, HistoryStore};
pub use use_cases::analyze_task::TaskAnalyzer;
pub use use_cases::create_plan::Planner;
pub use use_cases::execute_plan::{CONSENSUS_KEY, ExecutePlanError, Executor};
pub use use_cases::orchestrator::{ActivePlan, Orchestrator, OrchestratorError};
