//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod analyze_task;
pub mod create_plan;
pub mod execute_plan;
pub mod orchestrator;
