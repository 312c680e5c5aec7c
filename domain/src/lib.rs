//! Domain layer for tool-conductor
//!
//! This crate contains the core entities, value objects and pure algorithms.
//! It has no dependencies on infrastructure or presentation concerns and
//! performs no I/O.
//!
//! # Core Concepts
//!
//! ## Capabilities
//!
//! Every analysis tool is described by a [`ToolCapability`]: strength and
//! specialization tags, performance statistics, and the tools it depends on.
//!
//! ## Tasks and Plans
//!
//! A [`Task`] is analyzed into a [`TaskAnalysis`], which the planner turns
//! into a [`Plan`]: ordered [`Stage`]s, each running its tools in
//! [`ExecutionMode::Parallel`], [`ExecutionMode::Sequential`] or
//! [`ExecutionMode::Consensus`] mode.
//!
//! ## Consensus
//!
//! When tools in a consensus stage disagree, the [`ConsensusResolver`]
//! reconciles their outputs aspect by aspect.
//!
//! ## Execution and History
//!
//! Running a plan yields an [`ExecutionResult`]; outcomes are kept per
//! [`HistoryKey`] in bounded [`LearningRecord`]s that bias later planning.

pub mod capability;
pub mod consensus;
pub mod core;
pub mod execution;
pub mod history;
pub mod plan;
pub mod task;
pub mod tool;

// Re-export commonly used types
pub use capability::{CapabilityCatalog, PerformanceStats, ToolCapability};
pub use consensus::{
    Conflict, ConsensusResolver, ConsensusResult, ExpertTable, Opinion, ResolutionMethod,
    ResolverSettings, VoteTally,
};
pub use core::error::DomainError;
pub use execution::{
    ExecutionResult, Explanation, Learning, LearningImpact, PerformanceBreakdown, StageReport,
    StageStatus, ToolOutput, derive_learnings,
};
pub use history::{DEFAULT_HISTORY_CAPACITY, HistoryKey, LearningRecord, OutcomeRecord};
pub use plan::{
    AlternativeKind, AlternativePlan, BackoffKind, ExecutionMode, Plan, PlanId, RetryPolicy, Stage,
    Tradeoffs,
};
pub use task::{
    Complexity, Constraint, DepthPreference, Requirements, SpeedPreference, Task, TaskAnalysis,
    TaskContext, TaskId, TaskProfile, TaskProfiles, TaskType,
};
pub use tool::{EXECUTE_OPERATION, ToolPayload, ToolRequest, ToolResponse};
