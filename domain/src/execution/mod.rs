//! Execution domain
//!
//! Value objects produced while a plan runs: per-stage status, per-tool
//! outputs, the overall [`ExecutionResult`] and the [`Learning`]s derived
//! from it.
//!
//! # Stage lifecycle
//!
//! ```text
//! pending ──▶ running ──┬──▶ succeeded   every member produced output
//!                       ├──▶ degraded    a fallback stood in for a member
//!                       └──▶ failed      a member had no usable output
//! ```

pub mod learning;
pub mod outcome;
pub mod result;
pub mod status;

pub use learning::{Learning, LearningImpact, derive_learnings};
pub use outcome::{StageReport, ToolOutput};
pub use result::{ExecutionResult, Explanation, PerformanceBreakdown};
pub use status::StageStatus;
