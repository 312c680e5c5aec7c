//! Lifecycle notification port
//!
//! Observers (progress bars, event logs) hear about plan and stage
//! boundaries through [`LifecycleNotifier`]. Notifications are fire and
//! forget: they never influence control flow.

use conductor_domain::{
    AlternativeKind, ExecutionMode, ExecutionResult, Plan, Stage, StageReport, StageStatus,
};
use serde::{Deserialize, Serialize};

/// Callback for lifecycle events during plan execution
///
/// All methods have empty defaults so adapters implement only what they
/// render.
pub trait LifecycleNotifier: Send + Sync {
    /// Called once before the first stage runs
    fn on_plan_start(&self, _plan: &Plan) {}

    /// Called when a stage starts
    fn on_stage_start(&self, _stage: &Stage, _total_stages: usize) {}

    /// Called before a failed tool call is retried
    fn on_tool_retry(&self, _tool_id: &str, _attempt: u32, _max_attempts: u32, _error: &str) {}

    /// Called when a fallback tool is invoked in place of `tool_id`
    fn on_fallback(&self, _tool_id: &str, _fallback_id: &str) {}

    /// Called when a stage reaches a terminal status
    fn on_stage_complete(&self, _report: &StageReport, _total_stages: usize) {}

    /// Called when an alternative plan is swapped in
    fn on_recovery(&self, _plan: &Plan, _alternative: AlternativeKind, _reason: &str) {}

    /// Called once the run (including any recovery) has produced a result
    fn on_plan_complete(&self, _result: &ExecutionResult) {}
}

/// No-op notifier for when nobody is listening
pub struct NoLifecycle;

impl LifecycleNotifier for NoLifecycle {}

/// Owned, serializable form of a lifecycle notification.
///
/// Adapters that forward notifications across tasks (broadcast bus, event
/// log) convert to this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    PlanStarted {
        plan_id: String,
        task_id: String,
        stages: usize,
        tools: Vec<String>,
    },
    StageStarted {
        position: usize,
        mode: ExecutionMode,
        tools: Vec<String>,
    },
    ToolRetry {
        tool_id: String,
        attempt: u32,
        max_attempts: u32,
        error: String,
    },
    Fallback {
        tool_id: String,
        fallback_id: String,
    },
    StageCompleted {
        position: usize,
        status: StageStatus,
        duration_ms: u64,
    },
    Recovery {
        plan_id: String,
        alternative: AlternativeKind,
        reason: String,
    },
    PlanCompleted {
        plan_id: String,
        success: bool,
        confidence: f64,
        total_ms: u64,
    },
}

impl LifecycleEvent {
    pub fn plan_started(plan: &Plan) -> Self {
        Self::PlanStarted {
            plan_id: plan.id.to_string(),
            task_id: plan.task.id.to_string(),
            stages: plan.stages.len(),
            tools: plan.tool_ids().into_iter().map(str::to_string).collect(),
        }
    }

    pub fn stage_started(stage: &Stage) -> Self {
        Self::StageStarted {
            position: stage.position,
            mode: stage.mode,
            tools: stage.tools.clone(),
        }
    }

    pub fn stage_completed(report: &StageReport) -> Self {
        Self::StageCompleted {
            position: report.position,
            status: report.status,
            duration_ms: report.duration_ms,
        }
    }

    pub fn recovery(plan: &Plan, alternative: AlternativeKind, reason: &str) -> Self {
        Self::Recovery {
            plan_id: plan.id.to_string(),
            alternative,
            reason: reason.to_string(),
        }
    }

    pub fn plan_completed(result: &ExecutionResult) -> Self {
        Self::PlanCompleted {
            plan_id: result.plan_id.to_string(),
            success: result.success,
            confidence: result.confidence,
            total_ms: result.performance.total_ms,
        }
    }

    /// Short name used as the `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PlanStarted { .. } => "plan_started",
            Self::StageStarted { .. } => "stage_started",
            Self::ToolRetry { .. } => "tool_retry",
            Self::Fallback { .. } => "fallback",
            Self::StageCompleted { .. } => "stage_completed",
            Self::Recovery { .. } => "recovery",
            Self::PlanCompleted { .. } => "plan_completed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conductor_domain::{Task, TaskType};

    #[test]
    fn test_event_tagging() {
        let plan = Plan::new(Task::new("t-1", TaskType::Testing, "x"), vec![]);
        let event = LifecycleEvent::plan_started(&plan);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "plan_started");
        assert_eq!(json["task_id"], "t-1");
        assert_eq!(event.kind(), "plan_started");
    }

    #[test]
    fn test_no_lifecycle_is_silent() {
        let plan = Plan::new(Task::new("t-1", TaskType::Testing, "x"), vec![]);
        NoLifecycle.on_plan_start(&plan);
        NoLifecycle.on_fallback("a", "b");
    }
}
