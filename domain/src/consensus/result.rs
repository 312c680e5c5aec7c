//! Consensus result value objects

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// How a conflicting aspect was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    /// The aspect's expert tool decided
    Expert,
    /// The weighted winner held a decisive share of the weight
    WeightedVote,
    /// A strict majority of contributors agreed
    Majority,
    /// Nothing was decisive; the weighted winner was taken anyway
    WeightedFallback,
}

impl ResolutionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionMethod::Expert => "expert",
            ResolutionMethod::WeightedVote => "weighted_vote",
            ResolutionMethod::Majority => "majority",
            ResolutionMethod::WeightedFallback => "weighted_fallback",
        }
    }
}

impl std::fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Disagreement on one aspect and how it was settled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub aspect: String,
    /// tool id → that tool's value
    pub opinions: BTreeMap<String, Value>,
    pub resolution: ResolutionMethod,
    pub resolved: Value,
}

/// Outcome of reconciling several tools' outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    /// (aspects without disagreement) / (total aspects), 0.0 to 1.0
    pub agreement: f64,
    pub conflicts: Vec<Conflict>,
    /// aspect → final value
    pub resolved: BTreeMap<String, Value>,
    /// 0.7 × agreement + 0.3 × min(contributors / 5, 1)
    pub confidence: f64,
    /// Tools whose outputs were reconciled
    pub contributors: Vec<String>,
}

impl ConsensusResult {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// The reconciled value as one JSON object
    pub fn resolved_value(&self) -> Value {
        Value::Object(
            self.resolved
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    pub fn conflict_for(&self, aspect: &str) -> Option<&Conflict> {
        self.conflicts.iter().find(|c| c.aspect == aspect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolved_value_is_object() {
        let mut resolved = BTreeMap::new();
        resolved.insert("severity".to_string(), json!("high"));
        let result = ConsensusResult {
            agreement: 1.0,
            conflicts: vec![],
            resolved,
            confidence: 0.82,
            contributors: vec!["a".to_string(), "b".to_string()],
        };

        assert_eq!(result.resolved_value(), json!({"severity": "high"}));
        assert!(!result.has_conflicts());
        assert!(result.conflict_for("severity").is_none());
    }

    #[test]
    fn test_method_display() {
        assert_eq!(ResolutionMethod::WeightedFallback.to_string(), "weighted_fallback");
    }
}
