//! Task analysis use case
//!
//! Turns a [`Task`] into a [`TaskAnalysis`]: required capabilities and seed
//! preferences from the profile table, a complexity class, constraint tags
//! derived from the requirements, and tools that history shows to work.
//! Analysis never fails; missing profiles or history yield empty lists.

use crate::config::OrchestrationParams;
use crate::stores::HistoryStore;
use conductor_domain::{
    Complexity, Constraint, SpeedPreference, Task, TaskAnalysis, TaskProfiles,
};
use std::sync::Arc;
use tracing::debug;

pub struct TaskAnalyzer {
    profiles: TaskProfiles,
    params: OrchestrationParams,
    history: Arc<HistoryStore>,
}

impl TaskAnalyzer {
    pub fn new(profiles: TaskProfiles, params: OrchestrationParams, history: Arc<HistoryStore>) -> Self {
        Self {
            profiles,
            params,
            history,
        }
    }

    pub fn analyze(&self, task: &Task) -> TaskAnalysis {
        let (required_capabilities, mut preferred_tools) = self
            .profiles
            .get(task.task_type)
            .map(|p| (p.required_capabilities.clone(), p.preferred_tools.clone()))
            .unwrap_or_default();

        let complexity_score = self.complexity_score(task);
        let constraints = self.constraints(task);

        for tool in self.history.frequent_tools(task, self.params.history_frequency) {
            if !preferred_tools.contains(&tool) {
                preferred_tools.push(tool);
            }
        }

        let analysis = TaskAnalysis {
            complexity: Complexity::from_score(complexity_score),
            complexity_score,
            required_capabilities,
            preferred_tools,
            constraints,
        };

        debug!(
            task = %task.id,
            complexity = %analysis.complexity,
            score = complexity_score,
            constraints = ?analysis.constraint_tags(),
            "Analyzed task"
        );

        analysis
    }

    fn complexity_score(&self, task: &Task) -> u32 {
        let params = &self.params;
        let requirements = &task.requirements;
        let size = task.input_size();

        [
            size > params.input_size_threshold,
            size > params.large_input_threshold,
            requirements.quality_above(params.complexity_quality_threshold),
            requirements.is_deep(),
            requirements
                .min_confidence
                .is_some_and(|c| c > params.complexity_confidence_threshold),
            task.prior_result_count() > params.prior_results_threshold,
        ]
        .iter()
        .filter(|hit| **hit)
        .count() as u32
    }

    fn constraints(&self, task: &Task) -> Vec<Constraint> {
        let requirements = &task.requirements;
        let mut constraints = Vec::new();

        if requirements.speed == Some(SpeedPreference::Fast) {
            constraints.push(Constraint::PreferFastTools);
        }
        if requirements.quality_above(self.params.critical_quality_threshold) {
            constraints.push(Constraint::RequireHighQualityTools);
            constraints.push(Constraint::UseConsensusForCriticalDecisions);
        }
        if requirements.is_deep() {
            constraints.push(Constraint::UseMultipleTools);
            constraints.push(Constraint::CrossValidateResults);
        }

        constraints
    }
}
