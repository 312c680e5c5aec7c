//! Plan domain
//!
//! A [`Plan`] is an ordered list of [`Stage`]s. Each stage is a set of
//! tools run together under one [`ExecutionMode`], with a timeout and a
//! [`RetryPolicy`]. Plans carry zero or more [`AlternativePlan`]s that the
//! executor can fall back to once when a stage fails.
//!
//! ```text
//! Plan
//!  ├─ Stage 1 [sequential]  quality-checker → refactor-engine
//!  ├─ Stage 2 [consensus]   security-auditor, architecture-mapper
//!  └─ alternatives
//!       ├─ fast      (first two selected tools)
//!       └─ thorough  (selected + up to two extra tools)
//! ```

pub mod entities;
pub mod stage;

pub use entities::{AlternativeKind, AlternativePlan, Plan, PlanId, Tradeoffs};
pub use stage::{BackoffKind, ExecutionMode, RetryPolicy, Stage};
