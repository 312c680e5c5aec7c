//! History records

use crate::task::entities::{Task, TaskType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Outcomes kept per key before the oldest are evicted
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// History is grouped by task type and requested quality
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HistoryKey {
    pub task_type: TaskType,
    pub quality_tier: String,
}

impl HistoryKey {
    pub fn for_task(task: &Task) -> Self {
        Self {
            task_type: task.task_type,
            quality_tier: task.quality_tier(),
        }
    }
}

impl std::fmt::Display for HistoryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.task_type, self.quality_tier)
    }
}

/// Summary of one finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub plan_id: String,
    pub success: bool,
    /// Success that also satisfied the task's minimum confidence
    pub met_requirements: bool,
    pub confidence: f64,
    /// Tools that produced non-error output
    pub tools_used: Vec<String>,
    pub total_ms: u64,
    /// Unix epoch milliseconds
    pub recorded_at: i64,
}

/// Bounded outcome list for one key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningRecord {
    outcomes: VecDeque<OutcomeRecord>,
    successful_pattern: Option<BTreeSet<String>>,
    capacity: usize,
}

impl LearningRecord {
    pub fn new(capacity: usize) -> Self {
        Self {
            outcomes: VecDeque::new(),
            successful_pattern: None,
            capacity: capacity.max(1),
        }
    }

    /// Append an outcome, evicting the oldest past capacity. A run that
    /// met its requirements replaces the successful pattern snapshot.
    pub fn push(&mut self, outcome: OutcomeRecord) {
        if outcome.success && outcome.met_requirements {
            self.successful_pattern = Some(outcome.tools_used.iter().cloned().collect());
        }
        self.outcomes.push_back(outcome);
        while self.outcomes.len() > self.capacity {
            self.outcomes.pop_front();
        }
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &OutcomeRecord> {
        self.outcomes.iter()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn successful_pattern(&self) -> Option<&BTreeSet<String>> {
        self.successful_pattern.as_ref()
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    /// Tools used in at least `threshold` of the successful runs, most
    /// frequent first (ties alphabetical)
    pub fn frequent_tools(&self, threshold: f64) -> Vec<String> {
        let successes = self.success_count();
        if successes == 0 {
            return Vec::new();
        }

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for outcome in self.outcomes.iter().filter(|o| o.success) {
            let unique: BTreeSet<&str> = outcome.tools_used.iter().map(String::as_str).collect();
            for tool in unique {
                *counts.entry(tool).or_insert(0) += 1;
            }
        }

        let mut frequent: Vec<(&str, usize)> = counts
            .into_iter()
            .filter(|(_, n)| *n as f64 / successes as f64 >= threshold)
            .collect();
        frequent.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        frequent.into_iter().map(|(t, _)| t.to_string()).collect()
    }
}

impl Default for LearningRecord {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(success: bool, tools: &[&str]) -> OutcomeRecord {
        OutcomeRecord {
            plan_id: "plan".to_string(),
            success,
            met_requirements: success,
            confidence: 0.8,
            tools_used: tools.iter().map(|t| t.to_string()).collect(),
            total_ms: 100,
            recorded_at: 0,
        }
    }

    #[test]
    fn test_history_key_tier() {
        let task = Task::new("t", TaskType::Security, serde_json::json!({}));
        assert_eq!(HistoryKey::for_task(&task).quality_tier, "default");
        let task = task.with_quality(95);
        assert_eq!(HistoryKey::for_task(&task).to_string(), "security/95");
    }

    #[test]
    fn test_bounded_eviction() {
        let mut record = LearningRecord::new(3);
        for i in 0..5 {
            let mut o = outcome(true, &["a"]);
            o.plan_id = format!("plan-{i}");
            record.push(o);
        }
        assert_eq!(record.len(), 3);
        assert_eq!(record.outcomes().next().unwrap().plan_id, "plan-2");
    }

    #[test]
    fn test_successful_pattern_overwritten() {
        let mut record = LearningRecord::default();
        record.push(outcome(true, &["a", "b"]));
        record.push(outcome(false, &["c"]));
        assert_eq!(record.successful_pattern().unwrap().len(), 2);

        record.push(outcome(true, &["c"]));
        let pattern = record.successful_pattern().unwrap();
        assert!(pattern.contains("c"));
        assert!(!pattern.contains("a"));
    }

    #[test]
    fn test_unmet_requirements_do_not_snapshot() {
        let mut record = LearningRecord::default();
        let mut o = outcome(true, &["a"]);
        o.met_requirements = false;
        record.push(o);
        assert!(record.successful_pattern().is_none());
    }

    #[test]
    fn test_frequent_tools() {
        let mut record = LearningRecord::default();
        record.push(outcome(true, &["a", "b"]));
        record.push(outcome(true, &["a", "c"]));
        record.push(outcome(true, &["a", "b"]));
        record.push(outcome(false, &["d"]));
        // a: 3/3, b: 2/3, c: 1/3
        assert_eq!(record.frequent_tools(0.7), vec!["a".to_string()]);
        assert_eq!(
            record.frequent_tools(0.6),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_frequent_tools_without_success() {
        let mut record = LearningRecord::default();
        record.push(outcome(false, &["a"]));
        assert!(record.frequent_tools(0.7).is_empty());
    }
}
