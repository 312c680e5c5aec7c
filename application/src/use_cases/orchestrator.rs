//! Orchestrator facade
//!
//! Wires analyzer, planner and executor around shared registry and
//! history state, and keeps the table of plans that are created but not
//! yet finished. Once a run completes (successfully, after recovery, or
//! with a terminal failure) the plan leaves the table and only its
//! outcome summary survives in the [`HistoryStore`].

use super::analyze_task::TaskAnalyzer;
use super::create_plan::Planner;
use super::execute_plan::{ExecutePlanError, Executor};
use crate::config::OrchestrationParams;
use crate::ports::lifecycle::{LifecycleNotifier, NoLifecycle};
use crate::ports::tool_invoker::ToolInvokerPort;
use crate::stores::{CapabilityRegistry, HistoryStore};
use conductor_domain::{
    CapabilityCatalog, ExecutionResult, Plan, PlanId, Task, TaskAnalysis, TaskId, TaskProfiles,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

/// Errors surfaced by the orchestrator
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error(transparent)]
    Execution(#[from] ExecutePlanError),
}

/// Bookkeeping for a plan between creation and completion
#[derive(Debug, Clone)]
pub struct ActivePlan {
    pub task_id: TaskId,
    pub stages: usize,
    pub created_at: Instant,
}

pub struct Orchestrator {
    analyzer: TaskAnalyzer,
    planner: Planner,
    executor: Executor,
    registry: Arc<CapabilityRegistry>,
    history: Arc<HistoryStore>,
    active: Mutex<HashMap<PlanId, ActivePlan>>,
}

impl Orchestrator {
    pub fn new(
        invoker: Arc<dyn ToolInvokerPort>,
        catalog: CapabilityCatalog,
        profiles: TaskProfiles,
        params: OrchestrationParams,
    ) -> Self {
        let registry = Arc::new(
            CapabilityRegistry::new(catalog)
                .with_feedback_factors(params.success_boost, params.failure_decay),
        );
        let history = Arc::new(HistoryStore::new(params.history_capacity));

        Self {
            analyzer: TaskAnalyzer::new(profiles, params.clone(), Arc::clone(&history)),
            planner: Planner::new(Arc::clone(&registry), params.clone()),
            executor: Executor::new(invoker, Arc::clone(&registry), params),
            registry,
            history,
            active: Mutex::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    pub fn analyze(&self, task: &Task) -> TaskAnalysis {
        self.analyzer.analyze(task)
    }

    /// Analyze `task` and build a plan for it
    pub fn create_plan(&self, task: Task) -> Plan {
        let analysis = self.analyzer.analyze(&task);
        let plan = self.planner.create_plan(task, &analysis);
        self.track(&plan);
        plan
    }

    pub async fn execute(&self, plan: Plan) -> Result<ExecutionResult, OrchestratorError> {
        self.execute_with_progress(plan, &NoLifecycle).await
    }

    /// Execute `plan` and record its outcome in history
    pub async fn execute_with_progress(
        &self,
        plan: Plan,
        progress: &dyn LifecycleNotifier,
    ) -> Result<ExecutionResult, OrchestratorError> {
        self.track(&plan);
        let plan_id = plan.id.clone();
        let task = plan.task.clone();

        let outcome = self.executor.execute_with_progress(plan, progress).await;
        self.untrack(&plan_id);

        match outcome {
            Ok(result) => {
                let record = self.history.record(&task, &result);
                info!(
                    plan = %plan_id,
                    success = record.success,
                    met_requirements = record.met_requirements,
                    "Recorded execution outcome"
                );
                Ok(result)
            }
            Err(err) => {
                let ExecutePlanError::RecoveryFailed { result, .. } = &err;
                self.history.record(&task, result);
                Err(err.into())
            }
        }
    }

    /// Plan and execute in one call
    pub async fn run(&self, task: Task) -> Result<ExecutionResult, OrchestratorError> {
        self.run_with_progress(task, &NoLifecycle).await
    }

    pub async fn run_with_progress(
        &self,
        task: Task,
        progress: &dyn LifecycleNotifier,
    ) -> Result<ExecutionResult, OrchestratorError> {
        let plan = self.create_plan(task);
        self.execute_with_progress(plan, progress).await
    }

    /// Plans created or running that have not finished yet
    pub fn active_plans(&self) -> Vec<(PlanId, ActivePlan)> {
        let active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        active.iter().map(|(id, p)| (id.clone(), p.clone())).collect()
    }

    pub fn is_active(&self, plan_id: &PlanId) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(plan_id)
    }

    /// Drop a plan that will not be executed from the active table.
    /// Returns whether it was tracked.
    pub fn discard_plan(&self, plan_id: &PlanId) -> bool {
        let removed = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(plan_id)
            .is_some();
        if removed {
            debug!(plan = %plan_id, "Discarded plan without executing it");
        }
        removed
    }

    fn track(&self, plan: &Plan) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        active.entry(plan.id.clone()).or_insert_with(|| {
            debug!(plan = %plan.id, "Tracking active plan");
            ActivePlan {
                task_id: plan.task.id.clone(),
                stages: plan.stages.len(),
                created_at: Instant::now(),
            }
        });
    }

    fn untrack(&self, plan_id: &PlanId) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        active.remove(plan_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::tool_invoker::ToolInvocationError;
    use async_trait::async_trait;
    use conductor_domain::{
        ExecutionMode, PerformanceStats, TaskProfile, TaskType, ToolCapability, ToolRequest,
        ToolResponse,
    };
    use serde_json::{Value, json};

    /// Replies with a fixed payload per tool id
    struct EchoInvoker {
        replies: HashMap<String, Value>,
    }

    #[async_trait]
    impl ToolInvokerPort for EchoInvoker {
        async fn invoke(&self, request: ToolRequest) -> Result<ToolResponse, ToolInvocationError> {
            self.replies
                .get(&request.tool_id)
                .cloned()
                .map(ToolResponse::new)
                .ok_or_else(|| ToolInvocationError::UnknownTool(request.tool_id.clone()))
        }

        fn available_tools(&self) -> Vec<String> {
            self.replies.keys().cloned().collect()
        }
    }

    fn capability(id: &str, specs: &[&str], quality: f64) -> ToolCapability {
        ToolCapability::new(id)
            .with_specializations(specs.iter().copied())
            .with_performance(PerformanceStats::new(10, 0.95, quality))
    }

    fn orchestrator(replies: &[(&str, Value)]) -> Orchestrator {
        let catalog = CapabilityCatalog::new()
            .register(capability("security-auditor", &["security-audit"], 95.0))
            .register(
                capability("dependency-scanner", &["dependency-analysis"], 90.0)
                    .with_dependencies(["security-auditor"]),
            )
            .register(capability("quality-checker", &["quality-metrics"], 88.0));
        let profiles = TaskProfiles::empty().with_profile(
            TaskType::Security,
            TaskProfile::new(["security-audit", "dependency-analysis"], ["security-auditor"]),
        );
        let invoker = EchoInvoker {
            replies: replies.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        };
        Orchestrator::new(
            Arc::new(invoker),
            catalog,
            profiles,
            OrchestrationParams::default().with_backoff_base_ms(1),
        )
    }

    #[test]
    fn test_high_quality_security_plan_uses_consensus() {
        let orchestrator = orchestrator(&[]);
        let task = Task::new("sec-1", TaskType::Security, json!({"code": "x"})).with_quality(95);
        let plan = orchestrator.create_plan(task);

        assert!(plan.tool_ids().contains(&"security-auditor"));
        for stage in &plan.stages {
            if stage.tools.len() > 1 && stage.contains("security-auditor") {
                assert_eq!(stage.mode, ExecutionMode::Consensus);
            }
        }
        assert!(orchestrator.is_active(&plan.id));
    }

    #[test]
    fn test_unmapped_task_type_gives_empty_plan() {
        let orchestrator = orchestrator(&[]);
        let plan = orchestrator.create_plan(Task::new("gen-1", TaskType::Generation, "x"));
        assert!(plan.is_empty());
    }

    #[tokio::test]
    async fn test_empty_plan_runs_as_noop() {
        let orchestrator = orchestrator(&[]);
        let result = orchestrator
            .run(Task::new("gen-1", TaskType::Generation, "x"))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.confidence, 0.0);
        assert!(result.outputs.is_empty());
    }

    #[tokio::test]
    async fn test_run_records_history_and_clears_active() {
        let orchestrator = orchestrator(&[
            ("security-auditor", json!({"severity": "low"})),
            ("dependency-scanner", json!({"severity": "low", "outdated": 0})),
        ]);
        let task = Task::new("sec-1", TaskType::Security, json!({"code": "x"}));

        let plan = orchestrator.create_plan(task.clone());
        let plan_id = plan.id.clone();
        let result = orchestrator.execute(plan).await.unwrap();

        assert!(result.success);
        assert!(!orchestrator.is_active(&plan_id));
        assert!(orchestrator.active_plans().is_empty());

        let history = orchestrator.history().query(&task);
        assert_eq!(history.len(), 1);
        assert!(history[0].success);
        let pattern = orchestrator.history().successful_pattern(&task).unwrap();
        assert!(pattern.contains("security-auditor"));
        assert!(pattern.contains("dependency-scanner"));
    }

    #[tokio::test]
    async fn test_history_biases_later_analysis() {
        let orchestrator = orchestrator(&[
            ("security-auditor", json!({"ok": true})),
            ("dependency-scanner", json!({"ok": true})),
        ]);
        let task = Task::new("sec-1", TaskType::Security, json!({"code": "x"}));
        orchestrator.run(task.clone()).await.unwrap();

        let analysis = orchestrator.analyze(&task);
        assert!(analysis.preferred_tools.contains(&"dependency-scanner".to_string()));
    }

    #[tokio::test]
    async fn test_success_feedback_updates_registry() {
        let orchestrator = orchestrator(&[
            ("security-auditor", json!({"ok": true})),
            ("dependency-scanner", json!({"ok": true})),
        ]);
        let before = orchestrator.registry().quality_of("dependency-scanner").unwrap();
        orchestrator
            .run(Task::new("sec-1", TaskType::Security, "x"))
            .await
            .unwrap();
        let after = orchestrator.registry().quality_of("dependency-scanner").unwrap();
        assert!(after > before);
    }

    #[test]
    fn test_create_plan_idempotent_structure() {
        let orchestrator = orchestrator(&[]);
        let task = Task::new("sec-1", TaskType::Security, "x").with_quality(95);
        let a = orchestrator.create_plan(task.clone());
        let b = orchestrator.create_plan(task);
        assert_eq!(a.structure(), b.structure());
        assert_ne!(a.id, b.id);
        assert_eq!(orchestrator.active_plans().len(), 2);
    }

    #[test]
    fn test_discard_unexecuted_plan() {
        let orchestrator = orchestrator(&[]);
        let plan = orchestrator.create_plan(Task::new("sec-1", TaskType::Security, "x"));
        assert!(orchestrator.is_active(&plan.id));

        assert!(orchestrator.discard_plan(&plan.id));
        assert!(!orchestrator.is_active(&plan.id));
        assert!(orchestrator.active_plans().is_empty());
        assert!(!orchestrator.discard_plan(&plan.id));
    }
}
