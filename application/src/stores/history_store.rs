//! History store
//!
//! Per-key bounded outcome history. Written once per finished run by the
//! orchestrator, read by the analyzer when it builds tool preferences.

use conductor_domain::{
    DEFAULT_HISTORY_CAPACITY, ExecutionResult, HistoryKey, LearningRecord, OutcomeRecord, Task,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

pub struct HistoryStore {
    records: Mutex<HashMap<HistoryKey, LearningRecord>>,
    capacity: usize,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Append the outcome of `result` under the task's key.
    ///
    /// The successful-pattern snapshot is replaced only when the run
    /// succeeded and met the task's minimum confidence.
    pub fn record(&self, task: &Task, result: &ExecutionResult) -> OutcomeRecord {
        let outcome = OutcomeRecord {
            plan_id: result.plan_id.to_string(),
            success: result.success,
            met_requirements: result.success
                && task.requirements.accepts_confidence(result.confidence),
            confidence: result.confidence,
            tools_used: result.contributing_tools(),
            total_ms: result.performance.total_ms,
            recorded_at: chrono::Utc::now().timestamp_millis(),
        };

        let key = HistoryKey::for_task(task);
        debug!(key = %key, success = outcome.success, "Recording outcome");

        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records
            .entry(key)
            .or_insert_with(|| LearningRecord::new(self.capacity))
            .push(outcome.clone());
        outcome
    }

    /// Outcomes recorded for the task's key, oldest first
    pub fn query(&self, task: &Task) -> Vec<OutcomeRecord> {
        self.with_record(task, |r| r.outcomes().cloned().collect())
            .unwrap_or_default()
    }

    pub fn successful_pattern(&self, task: &Task) -> Option<BTreeSet<String>> {
        self.with_record(task, |r| r.successful_pattern().cloned())
            .flatten()
    }

    /// Tools present in at least `threshold` of the key's successful runs
    pub fn frequent_tools(&self, task: &Task, threshold: f64) -> Vec<String> {
        self.with_record(task, |r| r.frequent_tools(threshold))
            .unwrap_or_default()
    }

    /// Number of distinct keys with history
    pub fn key_count(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn with_record<T>(&self, task: &Task, f: impl FnOnce(&LearningRecord) -> T) -> Option<T> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records.get(&HistoryKey::for_task(task)).map(f)
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
