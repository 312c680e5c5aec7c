//! Aspect → expert tool table

use std::collections::BTreeMap;

/// Which tool is the authority for which aspect.
///
/// When tools disagree on an aspect and the expert for that aspect
/// contributed an opinion, the expert's opinion wins outright.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpertTable {
    experts: BTreeMap<String, String>,
}

impl ExpertTable {
    pub fn empty() -> Self {
        Self {
            experts: BTreeMap::new(),
        }
    }

    pub fn with_expert(mut self, aspect: impl Into<String>, tool_id: impl Into<String>) -> Self {
        self.experts.insert(aspect.into(), tool_id.into());
        self
    }

    pub fn expert_for(&self, aspect: &str) -> Option<&str> {
        self.experts.get(aspect).map(|s| s.as_str())
    }
}

impl Default for ExpertTable {
    fn default() -> Self {
        Self::empty()
            .with_expert("security", "security-auditor")
            .with_expert("tests", "test-analyzer")
            .with_expert("coverage", "test-analyzer")
            .with_expert("quality", "quality-checker")
            .with_expert("metrics", "quality-checker")
            .with_expert("refactoring", "refactor-engine")
            .with_expert("architecture", "architecture-mapper")
            .with_expert("dependencies", "architecture-mapper")
            .with_expert("documentation", "doc-writer")
            .with_expert("api", "api-designer")
            .with_expert("schema", "schema-validator")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_experts() {
        let table = ExpertTable::default();
        assert_eq!(table.expert_for("coverage"), Some("test-analyzer"));
        assert_eq!(table.expert_for("dependencies"), Some("architecture-mapper"));
        assert_eq!(table.expert_for("severity"), None);
    }
}
