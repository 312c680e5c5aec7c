//! Seed capability entries
//!
//! Every tool named by the default task profiles appears here, together
//! with the dependency edge `refactor-engine -> quality-checker`. Only a
//! subset is served by the built-in hub handlers; the binary trims the
//! catalog to what the hub can actually run.

use conductor_domain::{CapabilityCatalog, PerformanceStats, ToolCapability};

pub const SEED_TOOL_IDS: [&str; 8] = [
    "security-auditor",
    "quality-checker",
    "refactor-engine",
    "test-analyzer",
    "architecture-mapper",
    "doc-writer",
    "api-designer",
    "schema-validator",
];

/// Build the seed catalog
pub fn seed_catalog() -> CapabilityCatalog {
    CapabilityCatalog::new()
        .register(
            ToolCapability::new("security-auditor")
                .with_strengths(["pattern-matching", "vulnerability-detection", "static-analysis"])
                .with_weaknesses(["runtime-behavior"])
                .with_specializations(["security-audit", "vulnerability-detection"])
                .with_performance(PerformanceStats::new(1_500, 0.92, 92.0)),
        )
        .register(
            ToolCapability::new("quality-checker")
                .with_strengths(["static-analysis", "pattern-matching", "style-enforcement"])
                .with_weaknesses(["semantic-understanding"])
                .with_specializations(["code-analysis", "quality-metrics"])
                .with_performance(PerformanceStats::new(800, 0.95, 88.0)),
        )
        .register(
            ToolCapability::new("refactor-engine")
                .with_strengths(["code-transformation", "style-enforcement"])
                .with_weaknesses(["large-inputs"])
                .with_specializations(["refactoring", "code-transformation"])
                .with_dependencies(["quality-checker"])
                .with_performance(PerformanceStats::new(2_500, 0.88, 82.0)),
        )
        .register(
            ToolCapability::new("test-analyzer")
                .with_strengths(["test-discovery", "coverage-estimation"])
                .with_weaknesses(["integration-tests"])
                .with_specializations(["test-coverage", "test-generation"])
                .with_performance(PerformanceStats::new(1_200, 0.90, 86.0)),
        )
        .register(
            ToolCapability::new("architecture-mapper")
                .with_strengths(["dependency-graphs", "module-boundaries"])
                .with_weaknesses(["small-inputs"])
                .with_specializations(["architecture-review", "dependency-analysis"])
                .with_performance(PerformanceStats::new(3_000, 0.85, 80.0)),
        )
        .register(
            ToolCapability::new("doc-writer")
                .with_strengths(["prose", "summarization"])
                .with_weaknesses(["accuracy"])
                .with_specializations(["documentation", "code-generation"])
                .with_performance(PerformanceStats::new(2_000, 0.90, 78.0)),
        )
        .register(
            ToolCapability::new("api-designer")
                .with_strengths(["interface-design", "schema-design"])
                .with_weaknesses(["implementation-detail"])
                .with_specializations(["api-design", "code-generation"])
                .with_performance(PerformanceStats::new(1_800, 0.88, 84.0)),
        )
        .register(
            ToolCapability::new("schema-validator")
                .with_strengths(["schema-design", "validation"])
                .with_weaknesses(["free-form-input"])
                .with_specializations(["schema-validation", "api-design"])
                .with_performance(PerformanceStats::new(600, 0.97, 90.0)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use conductor_domain::{TaskProfiles, TaskType};

    #[test]
    fn test_seed_contains_every_listed_tool() {
        let catalog = seed_catalog();
        assert_eq!(catalog.len(), SEED_TOOL_IDS.len());
        for id in SEED_TOOL_IDS {
            assert!(catalog.contains(id), "{id} missing");
        }
    }

    #[test]
    fn test_preferred_tools_specialize_in_their_profile() {
        let catalog = seed_catalog();
        let profiles = TaskProfiles::default();
        for task_type in TaskType::ALL {
            let profile = profiles.get(task_type).unwrap();
            for preferred in &profile.preferred_tools {
                let tool = catalog.get(preferred).unwrap();
                assert!(
                    tool.specializes_in(&profile.required_capabilities),
                    "{preferred} does not cover {task_type:?}"
                );
            }
        }
    }

    #[test]
    fn test_dependencies_refer_to_seeded_tools() {
        let catalog = seed_catalog();
        for tool in catalog.all() {
            for dep in &tool.depends_on {
                assert!(catalog.contains(dep));
            }
        }
        assert!(catalog.get("refactor-engine").unwrap().depends_on_tool("quality-checker"));
    }

    #[test]
    fn test_quality_checker_can_stand_in_for_security_auditor() {
        let catalog = seed_catalog();
        let auditor = catalog.get("security-auditor").unwrap();
        let checker = catalog.get("quality-checker").unwrap();
        assert!(auditor.strength_overlap(checker) > 0.5);
    }
}
