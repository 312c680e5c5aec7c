//! Task entities

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Identifier of a task
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of work a task asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Analysis,
    Generation,
    Refactoring,
    Security,
    Testing,
}

impl TaskType {
    pub const ALL: [TaskType; 5] = [
        TaskType::Analysis,
        TaskType::Generation,
        TaskType::Refactoring,
        TaskType::Security,
        TaskType::Testing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Analysis => "analysis",
            TaskType::Generation => "generation",
            TaskType::Refactoring => "refactoring",
            TaskType::Security => "security",
            TaskType::Testing => "testing",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s.to_lowercase())
            .ok_or_else(|| DomainError::UnknownTaskType(s.to_string()))
    }
}

/// How much the caller values speed over thoroughness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedPreference {
    Fast,
    Balanced,
    Thorough,
}

impl SpeedPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedPreference::Fast => "fast",
            SpeedPreference::Balanced => "balanced",
            SpeedPreference::Thorough => "thorough",
        }
    }
}

impl FromStr for SpeedPreference {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(SpeedPreference::Fast),
            "balanced" => Ok(SpeedPreference::Balanced),
            "thorough" => Ok(SpeedPreference::Thorough),
            other => Err(DomainError::InvalidPreference(format!(
                "speed '{}' (valid: fast, balanced, thorough)",
                other
            ))),
        }
    }
}

/// How deep the analysis should go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthPreference {
    Surface,
    Standard,
    Deep,
}

impl DepthPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepthPreference::Surface => "surface",
            DepthPreference::Standard => "standard",
            DepthPreference::Deep => "deep",
        }
    }
}

impl FromStr for DepthPreference {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "surface" => Ok(DepthPreference::Surface),
            "standard" => Ok(DepthPreference::Standard),
            "deep" => Ok(DepthPreference::Deep),
            other => Err(DomainError::InvalidPreference(format!(
                "depth '{}' (valid: surface, standard, deep)",
                other
            ))),
        }
    }
}

/// Caller requirements attached to a task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Requirements {
    /// Quality target (0 to 100)
    pub quality: Option<u8>,
    pub speed: Option<SpeedPreference>,
    pub depth: Option<DepthPreference>,
    /// Minimum acceptable confidence (0.0 to 1.0)
    pub min_confidence: Option<f64>,
}

impl Requirements {
    pub fn quality_above(&self, threshold: u8) -> bool {
        self.quality.is_some_and(|q| q > threshold)
    }

    pub fn is_deep(&self) -> bool {
        self.depth == Some(DepthPreference::Deep)
    }

    /// Whether `confidence` satisfies the minimum confidence (if any)
    pub fn accepts_confidence(&self, confidence: f64) -> bool {
        self.min_confidence.is_none_or(|min| confidence >= min)
    }
}

/// Optional context the task was issued in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskContext {
    /// Originating project (path or name)
    pub project: Option<String>,
    /// Results of earlier runs the caller wants considered
    pub prior_results: Vec<serde_json::Value>,
}

/// A unit of work requiring several analysis capabilities
///
/// # Example
///
/// ```
/// use conductor_domain::task::{Task, TaskType};
///
/// let task = Task::new("t-1", TaskType::Security, "eval(user_input)").with_quality(95);
/// assert_eq!(task.requirements.quality, Some(95));
/// assert_eq!(task.quality_tier(), "95");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    /// Opaque input payload handed to every tool
    #[serde(default)]
    pub input: serde_json::Value,
    #[serde(default)]
    pub requirements: Requirements,
    #[serde(default)]
    pub context: Option<TaskContext>,
}

impl Task {
    pub fn new(
        id: impl Into<TaskId>,
        task_type: TaskType,
        input: impl Into<serde_json::Value>,
    ) -> Self {
        Self {
            id: id.into(),
            task_type,
            input: input.into(),
            requirements: Requirements::default(),
            context: None,
        }
    }

    pub fn with_requirements(mut self, requirements: Requirements) -> Self {
        self.requirements = requirements;
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.requirements.quality = Some(quality.min(100));
        self
    }

    pub fn with_speed(mut self, speed: SpeedPreference) -> Self {
        self.requirements.speed = Some(speed);
        self
    }

    pub fn with_depth(mut self, depth: DepthPreference) -> Self {
        self.requirements.depth = Some(depth);
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.requirements.min_confidence = Some(min_confidence.clamp(0.0, 1.0));
        self
    }

    pub fn with_context(mut self, context: TaskContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Quality tier used as part of the history key ("default" when unset)
    pub fn quality_tier(&self) -> String {
        self.requirements
            .quality
            .map(|q| q.to_string())
            .unwrap_or_else(|| "default".to_string())
    }

    /// Number of prior results carried in the context
    pub fn prior_result_count(&self) -> usize {
        self.context
            .as_ref()
            .map(|c| c.prior_results.len())
            .unwrap_or(0)
    }

    /// Length in characters of the serialized input payload
    pub fn input_size(&self) -> usize {
        serde_json::to_string(&self.input)
            .map(|s| s.chars().count())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_type_parse() {
        assert_eq!("security".parse::<TaskType>().ok(), Some(TaskType::Security));
        assert_eq!("Testing".parse::<TaskType>().ok(), Some(TaskType::Testing));
        assert!("deployment".parse::<TaskType>().is_err());
    }

    #[test]
    fn test_preferences_parse() {
        assert_eq!(
            "fast".parse::<SpeedPreference>().ok(),
            Some(SpeedPreference::Fast)
        );
        assert_eq!(
            "DEEP".parse::<DepthPreference>().ok(),
            Some(DepthPreference::Deep)
        );
        assert!("instant".parse::<SpeedPreference>().is_err());
    }

    #[test]
    fn test_quality_tier() {
        let task = Task::new("t", TaskType::Analysis, json!(null));
        assert_eq!(task.quality_tier(), "default");
        assert_eq!(task.with_quality(80).quality_tier(), "80");
    }

    #[test]
    fn test_accepts_confidence() {
        let reqs = Requirements {
            min_confidence: Some(0.8),
            ..Default::default()
        };
        assert!(reqs.accepts_confidence(0.85));
        assert!(!reqs.accepts_confidence(0.5));
        assert!(Requirements::default().accepts_confidence(0.0));
    }

    #[test]
    fn test_deserialize_task_json() {
        let task: Task = serde_json::from_value(json!({
            "id": "scan-1",
            "type": "security",
            "input": {"source": "eval(x)"},
            "requirements": {"quality": 95, "speed": "thorough"}
        }))
        .unwrap();

        assert_eq!(task.task_type, TaskType::Security);
        assert_eq!(task.requirements.quality, Some(95));
        assert_eq!(task.requirements.speed, Some(SpeedPreference::Thorough));
        assert!(task.context.is_none());
    }

    #[test]
    fn test_input_size_counts_serialized_form() {
        let task = Task::new("t", TaskType::Analysis, "abc");
        // "\"abc\""
        assert_eq!(task.input_size(), 5);
    }

    #[test]
    fn test_input_size_counts_characters_not_bytes() {
        // 'ï' and the lock symbol take 2 and 4 bytes but count once each
        let task = Task::new("t", TaskType::Analysis, "naïve \u{1F512}");
        assert_eq!(task.input_size(), 9);
    }
}
