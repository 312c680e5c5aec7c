//! Application-level configuration.
//!
//! - [`OrchestrationParams`]: thresholds and tunables used by the analyzer,
//!   planner, executor and history store

pub mod orchestration_params;

pub use orchestration_params::{OrchestrationParams, SpeedMultipliers};
