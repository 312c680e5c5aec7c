//! Task analysis value objects

use serde::{Deserialize, Serialize};

/// Complexity class derived from input size and requirement strictness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    /// Map a raw complexity score to a class: ≤1 simple, 2-3 moderate, ≥4 complex
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=1 => Complexity::Simple,
            2..=3 => Complexity::Moderate,
            _ => Complexity::Complex,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Complex => "complex",
        }
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Selection constraint derived from task requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Constraint {
    PreferFastTools,
    RequireHighQualityTools,
    UseConsensusForCriticalDecisions,
    UseMultipleTools,
    CrossValidateResults,
}

impl Constraint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Constraint::PreferFastTools => "prefer-fast-tools",
            Constraint::RequireHighQualityTools => "require-high-quality-tools",
            Constraint::UseConsensusForCriticalDecisions => "use-consensus-for-critical-decisions",
            Constraint::UseMultipleTools => "use-multiple-tools",
            Constraint::CrossValidateResults => "cross-validate-results",
        }
    }
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of analyzing a task. Derived per planning run, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskAnalysis {
    pub complexity: Complexity,
    /// Raw score the complexity class was derived from
    pub complexity_score: u32,
    pub required_capabilities: Vec<String>,
    /// Seeded by task type, extended by historically successful tools
    pub preferred_tools: Vec<String>,
    pub constraints: Vec<Constraint>,
}

impl TaskAnalysis {
    pub fn has_constraint(&self, constraint: Constraint) -> bool {
        self.constraints.contains(&constraint)
    }

    /// Constraint tags as strings, in derivation order
    pub fn constraint_tags(&self) -> Vec<&'static str> {
        self.constraints.iter().map(Constraint::as_str).collect()
    }
}
