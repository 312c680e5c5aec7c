//! Plan entities

use super::stage::{ExecutionMode, Stage};
use crate::task::entities::Task;
use serde::{Deserialize, Serialize};

/// Identifier of a plan (fresh per planning call)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanId(String);

impl PlanId {
    pub fn generate() -> Self {
        Self(format!("plan-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlanId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which kind of alternative a plan variant is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlternativeKind {
    Fast,
    Thorough,
}

impl AlternativeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlternativeKind::Fast => "fast",
            AlternativeKind::Thorough => "thorough",
        }
    }
}

impl std::fmt::Display for AlternativeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pros and cons of an alternative compared to the primary plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tradeoffs {
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

impl Tradeoffs {
    pub fn new<P, C>(pros: P, cons: C) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            pros: pros.into_iter().map(Into::into).collect(),
            cons: cons.into_iter().map(Into::into).collect(),
        }
    }
}

/// A variant of the plan with its own stage list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativePlan {
    pub kind: AlternativeKind,
    pub stages: Vec<Stage>,
    pub estimated_time_ms: u64,
    pub estimated_confidence: f64,
    pub tradeoffs: Tradeoffs,
}

/// An ordered, executable plan for one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    /// The task this plan was created for
    pub task: Task,
    pub stages: Vec<Stage>,
    pub estimated_time_ms: u64,
    /// Estimated confidence (0.0 to 1.0)
    pub estimated_confidence: f64,
    /// Human-readable reasoning trace
    pub reasoning: Vec<String>,
    pub alternatives: Vec<AlternativePlan>,
}

impl Plan {
    pub fn new(task: Task, stages: Vec<Stage>) -> Self {
        Self {
            id: PlanId::generate(),
            task,
            stages,
            estimated_time_ms: 0,
            estimated_confidence: 0.0,
            reasoning: Vec::new(),
            alternatives: Vec::new(),
        }
    }

    pub fn with_estimate(mut self, time_ms: u64, confidence: f64) -> Self {
        self.estimated_time_ms = time_ms;
        self.estimated_confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_alternatives(mut self, alternatives: Vec<AlternativePlan>) -> Self {
        self.alternatives = alternatives;
        self
    }

    pub fn note(&mut self, line: impl Into<String>) {
        self.reasoning.push(line.into());
    }

    /// A plan with no stages executes as an immediate no-op
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Every tool referenced by a stage, in stage order
    pub fn tool_ids(&self) -> Vec<&str> {
        self.stages
            .iter()
            .flat_map(|s| s.tools.iter().map(|t| t.as_str()))
            .collect()
    }

    /// Plan-level timeout: the sum of stage timeouts
    pub fn total_timeout_ms(&self) -> u64 {
        self.stages.iter().map(|s| s.timeout_ms).sum()
    }

    /// Stage structure (tool sets and modes), ignoring identifiers
    pub fn structure(&self) -> Vec<(Vec<String>, ExecutionMode)> {
        self.stages
            .iter()
            .map(|s| (s.tools.clone(), s.mode))
            .collect()
    }

    /// Replace the stage list with the first alternative's.
    ///
    /// Returns the kind of the adopted alternative, or `None` if the plan
    /// has no alternatives left.
    pub fn adopt_first_alternative(&mut self) -> Option<AlternativeKind> {
        if self.alternatives.is_empty() {
            return None;
        }
        let alternative = self.alternatives.remove(0);
        self.stages = alternative.stages;
        self.estimated_time_ms = alternative.estimated_time_ms;
        self.estimated_confidence = alternative.estimated_confidence;
        self.reasoning.push(format!(
            "recovery: switched to the {} alternative",
            alternative.kind
        ));
        Some(alternative.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::stage::RetryPolicy;
    use crate::task::entities::TaskType;

    fn stage(position: usize, tools: &[&str], mode: ExecutionMode) -> Stage {
        Stage {
            position,
            tools: tools.iter().map(|t| t.to_string()).collect(),
            mode,
            input: serde_json::Value::Null,
            expected_aspects: vec![],
            timeout_ms: 500,
            retry: RetryPolicy::default(),
        }
    }

    fn task() -> Task {
        Task::new("t-1", TaskType::Analysis, "fn main() {}")
    }

    #[test]
    fn test_plan_ids_differ() {
        assert_ne!(PlanId::generate(), PlanId::generate());
    }

    #[test]
    fn test_tool_ids_and_timeout() {
        let plan = Plan::new(
            task(),
            vec![
                stage(1, &["a", "b"], ExecutionMode::Sequential),
                stage(2, &["c"], ExecutionMode::Sequential),
            ],
        );
        assert_eq!(plan.tool_ids(), vec!["a", "b", "c"]);
        assert_eq!(plan.total_timeout_ms(), 1000);
        assert!(!plan.is_empty());
    }

    #[test]
    fn test_adopt_first_alternative() {
        let mut plan = Plan::new(task(), vec![stage(1, &["a"], ExecutionMode::Sequential)])
            .with_alternatives(vec![AlternativePlan {
                kind: AlternativeKind::Fast,
                stages: vec![stage(1, &["b"], ExecutionMode::Sequential)],
                estimated_time_ms: 10,
                estimated_confidence: 0.5,
                tradeoffs: Tradeoffs::new(["faster"], ["less coverage"]),
            }]);

        assert_eq!(plan.adopt_first_alternative(), Some(AlternativeKind::Fast));
        assert_eq!(plan.tool_ids(), vec!["b"]);
        assert!(plan.reasoning.last().unwrap().starts_with("recovery"));
        assert_eq!(plan.adopt_first_alternative(), None);
    }

    #[test]
    fn test_estimate_clamped() {
        let plan = Plan::new(task(), vec![]).with_estimate(0, 1.7);
        assert_eq!(plan.estimated_confidence, 1.0);
        assert!(plan.is_empty());
    }
}
