//! Task domain
//!
//! A [`Task`] is one unit of work that needs several analysis capabilities.
//! The application layer's `TaskAnalyzer` turns it into a [`TaskAnalysis`]
//! (required capabilities, complexity class, constraints) using the
//! per-type [`TaskProfiles`] table.

pub mod analysis;
pub mod entities;
pub mod profile;

pub use analysis::{Complexity, Constraint, TaskAnalysis};
pub use entities::{
    DepthPreference, Requirements, SpeedPreference, Task, TaskContext, TaskId, TaskType,
};
pub use profile::{TaskProfile, TaskProfiles};
