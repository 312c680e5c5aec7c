//! Capability entities

use serde::{Deserialize, Serialize};

/// Historical performance of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    /// Mean latency of a single invocation in milliseconds
    pub mean_latency_ms: u64,
    /// Historical success rate (0.0 to 1.0)
    pub success_rate: f64,
    /// Output quality score (0 to 100)
    pub quality_score: f64,
}

impl PerformanceStats {
    pub fn new(mean_latency_ms: u64, success_rate: f64, quality_score: f64) -> Self {
        Self {
            mean_latency_ms,
            success_rate: success_rate.clamp(0.0, 1.0),
            quality_score: quality_score.clamp(0.0, 100.0),
        }
    }
}

impl Default for PerformanceStats {
    fn default() -> Self {
        Self::new(1000, 0.9, 75.0)
    }
}

/// A tool and what it is good at.
///
/// # Example
///
/// ```
/// use conductor_domain::capability::{PerformanceStats, ToolCapability};
///
/// let scanner = ToolCapability::new("security-auditor")
///     .with_strengths(["vulnerability-detection", "pattern-matching"])
///     .with_specializations(["security-audit"])
///     .with_performance(PerformanceStats::new(1200, 0.92, 90.0));
///
/// assert!(scanner.specializes_in(&["security-audit".to_string()]));
/// assert!(!scanner.depends_on_tool("quality-checker"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCapability {
    /// Unique tool identifier (e.g., "security-auditor")
    pub tool_id: String,
    /// Things this tool does well
    #[serde(default)]
    pub strengths: Vec<String>,
    /// Things this tool does poorly
    #[serde(default)]
    pub weaknesses: Vec<String>,
    /// Latency / reliability / quality statistics
    #[serde(default)]
    pub performance: PerformanceStats,
    /// Capability tags matched against task requirements
    #[serde(default)]
    pub specializations: Vec<String>,
    /// Tools that must run before this one
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl ToolCapability {
    pub fn new(tool_id: impl Into<String>) -> Self {
        Self {
            tool_id: tool_id.into(),
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            performance: PerformanceStats::default(),
            specializations: Vec::new(),
            depends_on: Vec::new(),
        }
    }

    pub fn with_strengths<I, S>(mut self, strengths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strengths = strengths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_weaknesses<I, S>(mut self, weaknesses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.weaknesses = weaknesses.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_specializations<I, S>(mut self, specializations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.specializations = specializations.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dependencies<I, S>(mut self, depends_on: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = depends_on.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_performance(mut self, performance: PerformanceStats) -> Self {
        self.performance = performance;
        self
    }

    /// Whether any specialization tag appears in `capabilities`
    pub fn specializes_in(&self, capabilities: &[String]) -> bool {
        self.specializations
            .iter()
            .any(|tag| capabilities.contains(tag))
    }

    /// Whether this tool declares a dependency on `tool_id`
    pub fn depends_on_tool(&self, tool_id: &str) -> bool {
        self.depends_on.iter().any(|d| d == tool_id)
    }

    /// Fraction of this tool's strengths that `other` shares (0.0 to 1.0).
    ///
    /// Returns 0.0 when this tool lists no strengths.
    pub fn strength_overlap(&self, other: &ToolCapability) -> f64 {
        if self.strengths.is_empty() {
            return 0.0;
        }
        let shared = self
            .strengths
            .iter()
            .filter(|s| other.strengths.contains(s))
            .count();
        shared as f64 / self.strengths.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_performance_clamping() {
        let stats = PerformanceStats::new(100, 1.4, 140.0);
        assert_eq!(stats.success_rate, 1.0);
        assert_eq!(stats.quality_score, 100.0);
    }

    #[test]
    fn test_specializes_in() {
        let tool = ToolCapability::new("test-analyzer")
            .with_specializations(["test-coverage", "test-generation"]);

        assert!(tool.specializes_in(&["test-coverage".to_string()]));
        assert!(!tool.specializes_in(&["security-audit".to_string()]));
        assert!(!tool.specializes_in(&[]));
    }

    #[test]
    fn test_strength_overlap() {
        let primary = ToolCapability::new("a").with_strengths(["x", "y", "z", "w"]);
        let other = ToolCapability::new("b").with_strengths(["x", "y", "z", "q"]);
        let empty = ToolCapability::new("c");

        assert_eq!(primary.strength_overlap(&other), 0.75);
        assert_eq!(empty.strength_overlap(&primary), 0.0);
        assert_eq!(primary.strength_overlap(&empty), 0.0);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let tool: ToolCapability =
            serde_json::from_str(r#"{"tool_id": "schema-validator"}"#).unwrap();
        assert_eq!(tool.tool_id, "schema-validator");
        assert!(tool.depends_on.is_empty());
        assert_eq!(tool.performance, PerformanceStats::default());
    }
}
