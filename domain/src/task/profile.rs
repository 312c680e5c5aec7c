//! Per-task-type capability profiles

use super::entities::TaskType;
use std::collections::BTreeMap;

/// Required capabilities and seed tool preferences for one task type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskProfile {
    pub required_capabilities: Vec<String>,
    pub preferred_tools: Vec<String>,
}

impl TaskProfile {
    pub fn new<C, P>(capabilities: C, preferred: P) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            required_capabilities: capabilities.into_iter().map(Into::into).collect(),
            preferred_tools: preferred.into_iter().map(Into::into).collect(),
        }
    }
}

/// Static lookup table: task type → profile.
///
/// The default table has one entry per task type. A table may omit types;
/// analysis of such a task simply yields empty lists.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskProfiles {
    profiles: BTreeMap<TaskType, TaskProfile>,
}

impl TaskProfiles {
    /// A table with no entries
    pub fn empty() -> Self {
        Self {
            profiles: BTreeMap::new(),
        }
    }

    pub fn with_profile(mut self, task_type: TaskType, profile: TaskProfile) -> Self {
        self.profiles.insert(task_type, profile);
        self
    }

    pub fn get(&self, task_type: TaskType) -> Option<&TaskProfile> {
        self.profiles.get(&task_type)
    }
}

impl Default for TaskProfiles {
    fn default() -> Self {
        Self::empty()
            .with_profile(
                TaskType::Analysis,
                TaskProfile::new(
                    ["code-analysis", "quality-metrics", "architecture-review"],
                    ["quality-checker", "architecture-mapper"],
                ),
            )
            .with_profile(
                TaskType::Generation,
                TaskProfile::new(
                    ["code-generation", "documentation", "api-design"],
                    ["doc-writer", "api-designer"],
                ),
            )
            .with_profile(
                TaskType::Refactoring,
                TaskProfile::new(
                    ["refactoring", "code-transformation", "code-analysis"],
                    ["refactor-engine", "quality-checker"],
                ),
            )
            .with_profile(
                TaskType::Security,
                TaskProfile::new(
                    ["security-audit", "vulnerability-detection", "dependency-analysis"],
                    ["security-auditor"],
                ),
            )
            .with_profile(
                TaskType::Testing,
                TaskProfile::new(
                    ["test-coverage", "test-generation", "quality-metrics"],
                    ["test-analyzer"],
                ),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_covers_every_task_type() {
        let profiles = TaskProfiles::default();
        for task_type in TaskType::ALL {
            let profile = profiles.get(task_type).unwrap();
            assert!(!profile.required_capabilities.is_empty());
        }
    }

    #[test]
    fn test_empty_table() {
        assert!(TaskProfiles::empty().get(TaskType::Security).is_none());
    }
}
