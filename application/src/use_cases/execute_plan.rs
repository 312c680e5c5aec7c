//! Plan execution use case
//!
//! Runs the stages of a [`Plan`] in order through the [`ToolInvokerPort`].
//!
//! # Per-tool invocation
//!
//! ```text
//! attempt 1 ──✗──▶ backoff ──▶ attempt 2 ──✗──▶ ... attempt N ──✗──▶ fallback (once)
//!     │                            │                     │              │
//!     └──✓── output                └──✓── output         └──✓──         ├──✓── output (degraded)
//!                                                                       └──✗── error payload (failed)
//! ```
//!
//! # Modes
//!
//! - parallel: all members at once, join on all of them
//! - sequential: one at a time, each sees the outputs before it
//! - consensus: members in dependency layers, then the resolver reconciles
//!   the outputs into one value stored under `"consensus"`
//!
//! Every slot of a stage shares one deadline. Members that finish before it
//! keep their outputs; the rest are recorded as timed out.
//!
//! A failed stage halts progression. If the plan carries an alternative,
//! it is swapped in and the whole plan runs once more; a second failure is
//! returned as [`ExecutePlanError::RecoveryFailed`].

use crate::config::OrchestrationParams;
use crate::ports::lifecycle::{LifecycleNotifier, NoLifecycle};
use crate::ports::tool_invoker::{ToolInvocationError, ToolInvokerPort};
use crate::stores::CapabilityRegistry;
use conductor_domain::{
    AlternativeKind, ConsensusResolver, ConsensusResult, ExecutionMode, ExecutionResult,
    Explanation, PerformanceBreakdown, Plan, PlanId, Stage, StageReport, StageStatus, ToolOutput,
    ToolPayload, ToolRequest, derive_learnings,
};
use futures::future::join_all;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Output key of the reconciled value of a consensus stage
pub const CONSENSUS_KEY: &str = "consensus";

/// Errors that escape plan execution
#[derive(Error, Debug)]
pub enum ExecutePlanError {
    #[error("Plan {plan_id} failed again after recovery with the {alternative} alternative: {reason}")]
    RecoveryFailed {
        plan_id: PlanId,
        alternative: AlternativeKind,
        reason: String,
        /// What the recovery run produced before it halted
        result: Box<ExecutionResult>,
    },
}

/// Stage reports of one pass over a stage list
struct StageRun {
    reports: Vec<StageReport>,
    planned_stages: usize,
}

impl StageRun {
    fn failed_stage(&self) -> Option<&StageReport> {
        self.reports.iter().find(|r| r.status == StageStatus::Failed)
    }

    fn failure_reason(&self) -> String {
        match self.failed_stage() {
            Some(report) if report.timed_out => {
                format!("stage {} timed out", report.position)
            }
            Some(report) => format!(
                "stage {} failed ({})",
                report.position,
                report.failed_tools().join(", ")
            ),
            None => "no stage failed".to_string(),
        }
    }

    fn completed(&self) -> bool {
        self.failed_stage().is_none() && self.reports.len() == self.planned_stages
    }
}

type Deadline = tokio::time::Instant;

/// Outcome of one tool slot of a stage
struct Slot {
    tool: String,
    output: ToolOutput,
    duration_ms: u64,
    /// The stage deadline passed before the slot produced an outcome
    timed_out: bool,
}

impl Slot {
    fn finished(tool: &str, output: ToolOutput, started: Instant) -> Self {
        Self {
            tool: tool.to_string(),
            output,
            duration_ms: elapsed_ms(started),
            timed_out: false,
        }
    }

    fn timed_out(tool: &str, stage: &Stage, attempts: u32, started: Instant) -> Self {
        debug!(tool = %tool, stage = stage.position, "Stage deadline reached");
        let message = format!("stage timed out after {} ms", stage.timeout_ms);
        Self {
            tool: tool.to_string(),
            output: ToolOutput::failure(tool, message, attempts),
            duration_ms: elapsed_ms(started),
            timed_out: true,
        }
    }
}

pub struct Executor {
    invoker: Arc<dyn ToolInvokerPort>,
    registry: Arc<CapabilityRegistry>,
    resolver: ConsensusResolver,
    params: OrchestrationParams,
}

impl Executor {
    pub fn new(
        invoker: Arc<dyn ToolInvokerPort>,
        registry: Arc<CapabilityRegistry>,
        params: OrchestrationParams,
    ) -> Self {
        Self {
            invoker,
            registry,
            resolver: ConsensusResolver::new(params.resolver_settings()),
            params,
        }
    }

    /// Execute with default (no-op) lifecycle notifications
    pub async fn execute(&self, plan: Plan) -> Result<ExecutionResult, ExecutePlanError> {
        self.execute_with_progress(plan, &NoLifecycle).await
    }

    /// Execute with lifecycle callbacks
    pub async fn execute_with_progress(
        &self,
        mut plan: Plan,
        progress: &dyn LifecycleNotifier,
    ) -> Result<ExecutionResult, ExecutePlanError> {
        let started = Instant::now();
        progress.on_plan_start(&plan);

        if plan.is_empty() {
            info!(plan = %plan.id, "Plan has no stages, nothing to execute");
            let result = ExecutionResult::empty(plan.id.clone(), plan.reasoning.clone());
            progress.on_plan_complete(&result);
            return Ok(result);
        }

        info!(plan = %plan.id, stages = plan.stages.len(), "Executing plan");
        let run = self.run_stages(&plan, progress).await;

        if run.failed_stage().is_some() {
            let reason = run.failure_reason();
            if let Some(alternative) = plan.adopt_first_alternative() {
                warn!(plan = %plan.id, %alternative, %reason, "Recovering with alternative plan");
                progress.on_recovery(&plan, alternative, &reason);

                let retry = self.run_stages(&plan, progress).await;
                let result = self.finish(&plan, &retry, started, true);
                progress.on_plan_complete(&result);

                if !retry.completed() {
                    return Err(ExecutePlanError::RecoveryFailed {
                        plan_id: plan.id.clone(),
                        alternative,
                        reason: retry.failure_reason(),
                        result: Box::new(result),
                    });
                }
                return Ok(result);
            }
            warn!(plan = %plan.id, %reason, "Plan failed with no alternative left");
        }

        let result = self.finish(&plan, &run, started, false);
        progress.on_plan_complete(&result);
        Ok(result)
    }

    // ==================== Stages ====================

    async fn run_stages(&self, plan: &Plan, progress: &dyn LifecycleNotifier) -> StageRun {
        let total = plan.stages.len();
        let mut context = Map::new();
        let mut reports = Vec::with_capacity(total);

        for stage in &plan.stages {
            progress.on_stage_start(stage, total);
            let report = self.run_stage(stage, &context, progress).await;

            if report.mode == ExecutionMode::Consensus {
                if let Some(output) = report.outputs.get(CONSENSUS_KEY) {
                    context.insert(CONSENSUS_KEY.to_string(), output.as_context_value());
                }
            } else {
                for (key, output) in &report.outputs {
                    context.insert(key.clone(), output.as_context_value());
                }
            }

            progress.on_stage_complete(&report, total);
            let halted = report.status == StageStatus::Failed;
            reports.push(report);
            if halted {
                break;
            }
        }

        StageRun {
            reports,
            planned_stages: total,
        }
    }

    async fn run_stage(
        &self,
        stage: &Stage,
        context: &Map<String, Value>,
        progress: &dyn LifecycleNotifier,
    ) -> StageReport {
        let mut status = StageStatus::Pending;
        advance(&mut status, StageStatus::Running, stage.position);
        debug!(stage = stage.position, mode = %stage.mode, "Stage running");

        let started = Instant::now();
        let deadline = tokio::time::Instant::now() + stage.timeout();
        let slots = match stage.mode {
            ExecutionMode::Parallel => {
                self.run_parallel(stage, &stage.tools, context, deadline, progress)
                    .await
            }
            ExecutionMode::Sequential => {
                self.run_sequential(stage, context, deadline, progress).await
            }
            ExecutionMode::Consensus => self.run_layered(stage, context, deadline, progress).await,
        };

        let timed_out = slots.iter().any(|slot| slot.timed_out);
        if timed_out {
            warn!(stage = stage.position, timeout_ms = stage.timeout_ms, "Stage timed out");
        }

        let mut outputs = BTreeMap::new();
        let mut tool_durations_ms = BTreeMap::new();
        for slot in slots {
            tool_durations_ms.insert(slot.tool.clone(), slot.duration_ms);
            outputs.insert(slot.tool, slot.output);
        }

        let consensus = if stage.mode == ExecutionMode::Consensus && !timed_out {
            self.reconcile(stage, &mut outputs)
        } else {
            None
        };

        let terminal = if timed_out {
            StageStatus::Failed
        } else {
            StageReport::status_from_outputs(&outputs)
        };
        advance(&mut status, terminal, stage.position);

        let report = StageReport {
            position: stage.position,
            mode: stage.mode,
            status,
            outputs,
            consensus,
            duration_ms: started.elapsed().as_millis() as u64,
            tool_durations_ms,
            timed_out,
        };
        info!(
            stage = stage.position,
            status = %report.status,
            duration_ms = report.duration_ms,
            "Stage complete"
        );
        report
    }

    async fn run_parallel(
        &self,
        stage: &Stage,
        tools: &[String],
        context: &Map<String, Value>,
        deadline: Deadline,
        progress: &dyn LifecycleNotifier,
    ) -> Vec<Slot> {
        join_all(
            tools
                .iter()
                .map(|tool| self.invoke_slot(tool, stage, context, deadline, progress)),
        )
        .await
    }

    async fn run_sequential(
        &self,
        stage: &Stage,
        context: &Map<String, Value>,
        deadline: Deadline,
        progress: &dyn LifecycleNotifier,
    ) -> Vec<Slot> {
        let mut running = context.clone();
        let mut finished = Vec::with_capacity(stage.tools.len());
        for tool in &stage.tools {
            let slot = self
                .invoke_slot(tool, stage, &running, deadline, progress)
                .await;
            running.insert(slot.tool.clone(), slot.output.as_context_value());
            finished.push(slot);
        }
        finished
    }

    /// Consensus dispatch: dependency layers in order, each layer in parallel
    async fn run_layered(
        &self,
        stage: &Stage,
        context: &Map<String, Value>,
        deadline: Deadline,
        progress: &dyn LifecycleNotifier,
    ) -> Vec<Slot> {
        let mut running = context.clone();
        let mut finished = Vec::with_capacity(stage.tools.len());
        for layer in self.dependency_layers(&stage.tools) {
            let slots = self
                .run_parallel(stage, &layer, &running, deadline, progress)
                .await;
            for slot in &slots {
                running.insert(slot.tool.clone(), slot.output.as_context_value());
            }
            finished.extend(slots);
        }
        finished
    }

    /// Split stage members (already ordered dependencies first) into layers
    /// whose members depend only on earlier layers
    fn dependency_layers(&self, tools: &[String]) -> Vec<Vec<String>> {
        let mut depth: BTreeMap<&str, usize> = BTreeMap::new();
        let mut layers: Vec<Vec<String>> = Vec::new();
        for tool in tools {
            let dependencies = self
                .registry
                .get(tool)
                .map(|c| c.depends_on)
                .unwrap_or_default();
            let level = dependencies
                .iter()
                .filter_map(|d| depth.get(d.as_str()))
                .map(|d| d + 1)
                .max()
                .unwrap_or(0);
            depth.insert(tool.as_str(), level);
            if layers.len() <= level {
                layers.resize_with(level + 1, Vec::new);
            }
            layers[level].push(tool.clone());
        }
        layers
    }

    fn reconcile(
        &self,
        stage: &Stage,
        outputs: &mut BTreeMap<String, ToolOutput>,
    ) -> Option<ConsensusResult> {
        let opinions: Vec<(String, Value)> = stage
            .tools
            .iter()
            .filter_map(|t| {
                let output = outputs.get(t)?;
                Some((output.produced_by.clone(), output.data()?.clone()))
            })
            .collect();
        if opinions.is_empty() {
            return None;
        }

        let consensus = self
            .resolver
            .resolve(&opinions, |tool| self.registry.quality_of(tool));
        debug!(
            stage = stage.position,
            agreement = consensus.agreement,
            conflicts = consensus.conflicts.len(),
            "Consensus resolved"
        );
        outputs.insert(
            CONSENSUS_KEY.to_string(),
            ToolOutput::success(CONSENSUS_KEY, consensus.resolved_value(), 0),
        );
        Some(consensus)
    }

    // ==================== Invocation ====================

    /// Retries, backoff and fallback for one tool slot, all within the
    /// stage deadline
    async fn invoke_slot(
        &self,
        tool_id: &str,
        stage: &Stage,
        context: &Map<String, Value>,
        deadline: Deadline,
        progress: &dyn LifecycleNotifier,
    ) -> Slot {
        let started = Instant::now();
        let policy = &stage.retry;
        let max_attempts = policy.max_attempts.max(1);
        let mut attempts = 0;
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            if expired(deadline) {
                return Slot::timed_out(tool_id, stage, attempts, started);
            }
            attempts = attempt;
            let call = self.invoke_once(tool_id, &stage.input, context);
            match tokio::time::timeout_at(deadline, call).await {
                Err(_) => {
                    self.registry.record_failure(tool_id);
                    return Slot::timed_out(tool_id, stage, attempts, started);
                }
                Ok(Ok(data)) => {
                    self.registry.record_success(tool_id);
                    let output = ToolOutput::success(tool_id, data, attempts);
                    return Slot::finished(tool_id, output, started);
                }
                Ok(Err(e)) => {
                    last_error = e.to_string();
                    debug!(tool = %tool_id, attempt, error = %e, "Tool invocation failed");
                    if attempt < max_attempts {
                        progress.on_tool_retry(tool_id, attempt, max_attempts, &last_error);
                        let delay = policy.backoff.delay(attempt, self.params.backoff_base());
                        tokio::time::sleep_until(deadline.min(tokio::time::Instant::now() + delay))
                            .await;
                    }
                }
            }
        }

        warn!(tool = %tool_id, attempts, error = %last_error, "Tool exhausted its attempts");
        self.registry.record_failure(tool_id);

        if let Some(fallback) = policy.fallback_tool.as_deref()
            && fallback != tool_id
        {
            if expired(deadline) {
                return Slot::timed_out(tool_id, stage, attempts, started);
            }
            progress.on_fallback(tool_id, fallback);
            attempts += 1;
            let call = self.invoke_once(fallback, &stage.input, context);
            match tokio::time::timeout_at(deadline, call).await {
                Err(_) => {
                    self.registry.record_failure(fallback);
                    return Slot::timed_out(tool_id, stage, attempts, started);
                }
                Ok(Ok(data)) => {
                    info!(tool = %tool_id, fallback = %fallback, "Fallback produced output");
                    self.registry.record_success(fallback);
                    let output = ToolOutput::from_fallback(fallback, data, attempts);
                    return Slot::finished(tool_id, output, started);
                }
                Ok(Err(e)) => {
                    warn!(tool = %tool_id, fallback = %fallback, error = %e, "Fallback failed");
                    self.registry.record_failure(fallback);
                    last_error = format!("{last_error}; fallback {fallback}: {e}");
                }
            }
        }

        Slot::finished(tool_id, ToolOutput::failure(tool_id, last_error, attempts), started)
    }

    async fn invoke_once(
        &self,
        tool_id: &str,
        input: &Value,
        context: &Map<String, Value>,
    ) -> Result<Value, ToolInvocationError> {
        let request = ToolRequest::execute(tool_id, ToolPayload::new(input.clone(), context.clone()));
        self.invoker.invoke(request).await.map(|response| response.data)
    }

    // ==================== Result ====================

    fn finish(&self, plan: &Plan, run: &StageRun, started: Instant, recovered: bool) -> ExecutionResult {
        let mut outputs = BTreeMap::new();
        for report in &run.reports {
            outputs.extend(report.outputs.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        let consensus = run.reports.iter().rev().find_map(|r| r.consensus.clone());

        let slots: usize = plan.stages.iter().map(|s| s.tools.len()).sum();
        let usable = run
            .reports
            .iter()
            .flat_map(|r| r.outputs.iter())
            .filter(|(k, o)| k.as_str() != CONSENSUS_KEY && o.success)
            .count();
        let coverage = if slots == 0 {
            0.0
        } else {
            usable as f64 / slots as f64
        };
        let mut confidence = plan.estimated_confidence * coverage;
        if let Some(consensus) = &consensus {
            confidence = (confidence + consensus.confidence) / 2.0;
        }

        let success = run.completed();
        let performance = PerformanceBreakdown::from_reports(elapsed_ms(started), &run.reports);
        let learnings = derive_learnings(&run.reports);

        let stage_notes = run
            .reports
            .iter()
            .map(|r| {
                let mut note = format!("stage {} [{}]: {} in {} ms", r.position, r.mode, r.status, r.duration_ms);
                let substituted = r.substituted_tools();
                if !substituted.is_empty() {
                    note.push_str(&format!("; fallback for {}", substituted.join(", ")));
                }
                let failed = r.failed_tools();
                if !failed.is_empty() {
                    note.push_str(&format!("; no output from {}", failed.join(", ")));
                }
                note
            })
            .collect();

        let mut summary = format!(
            "{} of {} stage(s) completed, {usable} of {slots} tool slot(s) produced output",
            run.reports.iter().filter(|r| r.status.is_usable()).count(),
            plan.stages.len(),
        );
        if recovered {
            summary.push_str(" after recovery");
        }

        info!(
            plan = %plan.id,
            success,
            confidence,
            total_ms = performance.total_ms,
            "Plan execution finished"
        );

        ExecutionResult {
            plan_id: plan.id.clone(),
            success,
            outputs,
            consensus,
            confidence: confidence.clamp(0.0, 1.0),
            performance,
            learnings,
            explanation: Explanation {
                summary,
                reasoning: plan.reasoning.clone(),
                stage_notes,
            },
            stages: run.reports.clone(),
            recovered,
        }
    }
}

fn advance(status: &mut StageStatus, next: StageStatus, position: usize) {
    match status.transition(next) {
        Ok(updated) => *status = updated,
        Err(e) => warn!(stage = position, error = %e, "Ignoring stage transition"),
    }
}

fn expired(deadline: Deadline) -> bool {
    tokio::time::Instant::now() >= deadline
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
