//! Execution history
//!
//! Outcome records grouped by [`HistoryKey`] (task type and quality tier),
//! bounded per key, with a snapshot of the last successful tool set.

pub mod record;

pub use record::{DEFAULT_HISTORY_CAPACITY, HistoryKey, LearningRecord, OutcomeRecord};
