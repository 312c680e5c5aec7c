//! Stage value objects

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the tools of a stage are run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// All tools at once, join on all of them
    Parallel,
    /// One tool at a time, each sees the previous outputs
    Sequential,
    /// All tools independently, then reconcile overlapping outputs
    Consensus,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Parallel => "parallel",
            ExecutionMode::Sequential => "sequential",
            ExecutionMode::Consensus => "consensus",
        }
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Delay growth between retry attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    /// `attempt × base`
    Linear,
    /// `2^attempt × base`
    Exponential,
}

impl BackoffKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackoffKind::Linear => "linear",
            BackoffKind::Exponential => "exponential",
        }
    }

    /// Delay to wait after the failed `attempt` (1-indexed)
    pub fn delay(&self, attempt: u32, base: Duration) -> Duration {
        match self {
            BackoffKind::Linear => base.saturating_mul(attempt),
            BackoffKind::Exponential => base.saturating_mul(2u32.saturating_pow(attempt)),
        }
    }
}

/// Retry behavior for the tools of a stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts per tool (including the first)
    pub max_attempts: u32,
    pub backoff: BackoffKind,
    /// Tool invoked once when a member exhausts its attempts
    pub fallback_tool: Option<String>,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: BackoffKind) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            fallback_tool: None,
        }
    }

    pub fn with_fallback(mut self, tool_id: impl Into<String>) -> Self {
        self.fallback_tool = Some(tool_id.into());
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, BackoffKind::Exponential)
    }
}

/// One node of a plan's execution sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    /// Position in the plan (1-indexed)
    pub position: usize,
    /// Member tools, dependencies first
    pub tools: Vec<String>,
    pub mode: ExecutionMode,
    /// Input payload handed to every member
    pub input: serde_json::Value,
    /// Output aspect names the stage is expected to produce
    pub expected_aspects: Vec<String>,
    pub timeout_ms: u64,
    pub retry: RetryPolicy,
}

impl Stage {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn contains(&self, tool_id: &str) -> bool {
        self.tools.iter().any(|t| t == tool_id)
    }

    /// One-line description, e.g. "Stage 2 [consensus] a, b"
    pub fn label(&self) -> String {
        format!(
            "Stage {} [{}] {}",
            self.position,
            self.mode,
            self.tools.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_backoff() {
        let base = Duration::from_millis(100);
        assert_eq!(BackoffKind::Linear.delay(1, base), Duration::from_millis(100));
        assert_eq!(BackoffKind::Linear.delay(3, base), Duration::from_millis(300));
    }

    #[test]
    fn test_exponential_backoff() {
        let base = Duration::from_millis(100);
        assert_eq!(
            BackoffKind::Exponential.delay(1, base),
            Duration::from_millis(200)
        );
        assert_eq!(
            BackoffKind::Exponential.delay(2, base),
            Duration::from_millis(400)
        );
    }

    #[test]
    fn test_retry_policy_minimum_one_attempt() {
        let policy = RetryPolicy::new(0, BackoffKind::Linear);
        assert_eq!(policy.max_attempts, 1);
        assert!(policy.fallback_tool.is_none());
    }

    #[test]
    fn test_stage_label() {
        let stage = Stage {
            position: 2,
            tools: vec!["a".to_string(), "b".to_string()],
            mode: ExecutionMode::Consensus,
            input: serde_json::Value::Null,
            expected_aspects: vec![],
            timeout_ms: 1000,
            retry: RetryPolicy::default(),
        };
        assert_eq!(stage.label(), "Stage 2 [consensus] a, b");
        assert!(stage.contains("b"));
        assert_eq!(stage.timeout(), Duration::from_secs(1));
    }
}
