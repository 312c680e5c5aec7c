//! Plan creation use case
//!
//! The [`Planner`] selects tools for an analyzed task, groups them into
//! dependency-respecting stages, estimates time and confidence, and
//! prepares the fast and thorough alternatives used for recovery.
//!
//! ```text
//! TaskAnalysis ──▶ select_tools ──▶ create_stages ──▶ estimate
//!                       │                                 │
//!                       └──────────▶ alternatives ◀───────┘
//! ```
//!
//! All reads go through one registry snapshot per call, so a plan is
//! always consistent with the last completed execution.

use crate::config::OrchestrationParams;
use crate::stores::CapabilityRegistry;
use conductor_domain::{
    AlternativeKind, AlternativePlan, BackoffKind, CapabilityCatalog, Constraint, ExecutionMode,
    PerformanceStats, Plan, RetryPolicy, Stage, Task, TaskAnalysis, Tradeoffs,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct Planner {
    registry: Arc<CapabilityRegistry>,
    params: OrchestrationParams,
}

impl Planner {
    pub fn new(registry: Arc<CapabilityRegistry>, params: OrchestrationParams) -> Self {
        Self { registry, params }
    }

    /// Build a complete plan for `task`.
    ///
    /// An empty tool selection yields a plan with zero stages; the executor
    /// treats it as a no-op.
    pub fn create_plan(&self, task: Task, analysis: &TaskAnalysis) -> Plan {
        let catalog = self.registry.snapshot();
        let mut reasoning = vec![format!(
            "task {} ({}) classified {} (score {})",
            task.id, task.task_type, analysis.complexity, analysis.complexity_score
        )];
        if !analysis.constraints.is_empty() {
            reasoning.push(format!(
                "constraints: {}",
                analysis.constraint_tags().join(", ")
            ));
        }

        let tools = self.select_from(&catalog, analysis, &mut reasoning);
        if tools.is_empty() {
            reasoning.push("no tool matches the required capabilities".to_string());
            info!(task = %task.id, "Created empty plan");
            let mut plan = Plan::new(task, Vec::new());
            plan.reasoning = reasoning;
            return plan;
        }
        reasoning.push(format!("selected {} tool(s): {}", tools.len(), tools.join(", ")));

        let stages = self.stages_from(&catalog, &tools, &task, analysis);
        for stage in &stages {
            let fallback = stage
                .retry
                .fallback_tool
                .as_deref()
                .map(|f| format!(" (fallback {f})"))
                .unwrap_or_default();
            reasoning.push(format!("{}{}", stage.label(), fallback));
        }

        let (time_ms, confidence) = estimate_with(&catalog, &stages);
        reasoning.push(format!(
            "estimated {time_ms} ms at confidence {confidence:.2}"
        ));

        let alternatives = self.alternatives_from(&catalog, &tools, &task, analysis);

        let mut plan = Plan::new(task, stages)
            .with_estimate(time_ms, confidence)
            .with_alternatives(alternatives);
        plan.reasoning = reasoning;

        info!(
            plan = %plan.id,
            stages = plan.stages.len(),
            alternatives = plan.alternatives.len(),
            "Created plan"
        );
        plan
    }

    /// Tools whose specializations match, plus known preferred tools,
    /// filtered by constraints, then closed under dependencies
    pub fn select_tools(&self, analysis: &TaskAnalysis) -> Vec<String> {
        self.select_from(&self.registry.snapshot(), analysis, &mut Vec::new())
    }

    /// Group `tools` into stages for `task`
    pub fn create_stages(&self, tools: &[String], task: &Task, analysis: &TaskAnalysis) -> Vec<Stage> {
        self.stages_from(&self.registry.snapshot(), tools, task, analysis)
    }

    /// Estimated total time (ms) and confidence of `stages`
    pub fn estimate(&self, stages: &[Stage]) -> (u64, f64) {
        estimate_with(&self.registry.snapshot(), stages)
    }

    /// Fast and thorough variants of the selection
    pub fn alternatives(
        &self,
        tools: &[String],
        task: &Task,
        analysis: &TaskAnalysis,
    ) -> Vec<AlternativePlan> {
        self.alternatives_from(&self.registry.snapshot(), tools, task, analysis)
    }

    // ==================== Selection ====================

    fn select_from(
        &self,
        catalog: &CapabilityCatalog,
        analysis: &TaskAnalysis,
        reasoning: &mut Vec<String>,
    ) -> Vec<String> {
        let mut candidates: Vec<String> = catalog
            .all()
            .filter(|c| c.specializes_in(&analysis.required_capabilities))
            .map(|c| c.tool_id.clone())
            .collect();
        for preferred in &analysis.preferred_tools {
            if catalog.contains(preferred) && !candidates.contains(preferred) {
                candidates.push(preferred.clone());
            }
        }

        let prefer_fast = analysis.has_constraint(Constraint::PreferFastTools);
        let high_quality = analysis.has_constraint(Constraint::RequireHighQualityTools);

        candidates.retain(|tool_id| {
            let Some(capability) = catalog.get(tool_id) else {
                return false;
            };
            let stats = &capability.performance;
            if prefer_fast && stats.mean_latency_ms > self.params.fast_latency_ms {
                reasoning.push(format!(
                    "dropped {tool_id}: mean latency {} ms exceeds {} ms",
                    stats.mean_latency_ms, self.params.fast_latency_ms
                ));
                return false;
            }
            if high_quality && stats.quality_score < self.params.quality_floor {
                reasoning.push(format!(
                    "dropped {tool_id}: quality {:.0} below {:.0}",
                    stats.quality_score, self.params.quality_floor
                ));
                return false;
            }
            true
        });

        with_dependencies(catalog, candidates, reasoning)
    }

    // ==================== Staging ====================

    fn stages_from(
        &self,
        catalog: &CapabilityCatalog,
        tools: &[String],
        task: &Task,
        analysis: &TaskAnalysis,
    ) -> Vec<Stage> {
        let mut groups = dependency_groups(catalog, tools);
        if analysis.has_constraint(Constraint::UseMultipleTools) {
            groups = batch_singletons(groups);
        }

        let selected: BTreeSet<&str> = tools.iter().map(String::as_str).collect();
        let critical = task
            .requirements
            .quality_above(self.params.critical_quality_threshold);

        groups
            .into_iter()
            .enumerate()
            .map(|(index, members)| {
                let mode = if members.len() == 1 {
                    ExecutionMode::Sequential
                } else if !has_internal_dependency(catalog, &members) {
                    // Independent tools on the same input: cross-check when critical
                    if critical {
                        ExecutionMode::Consensus
                    } else {
                        ExecutionMode::Parallel
                    }
                } else if critical {
                    ExecutionMode::Consensus
                } else {
                    ExecutionMode::Sequential
                };

                let timeout_ms = self.stage_timeout(catalog, &members, mode, task);
                let retry = self.retry_policy(catalog, &members, &selected, task);
                let expected_aspects = expected_aspects(catalog, &members, analysis);

                debug!(stage = index + 1, %mode, tools = ?members, "Grouped stage");

                Stage {
                    position: index + 1,
                    tools: members,
                    mode,
                    input: task.input.clone(),
                    expected_aspects,
                    timeout_ms,
                    retry,
                }
            })
            .collect()
    }

    fn stage_timeout(
        &self,
        catalog: &CapabilityCatalog,
        members: &[String],
        mode: ExecutionMode,
        task: &Task,
    ) -> u64 {
        let latency = stage_latency(catalog, members, mode);
        let multiplier = self
            .params
            .speed_multipliers
            .for_preference(task.requirements.speed);
        ((latency as f64 * multiplier).round() as u64).max(self.params.min_stage_timeout_ms)
    }

    fn retry_policy(
        &self,
        catalog: &CapabilityCatalog,
        members: &[String],
        selected: &BTreeSet<&str>,
        task: &Task,
    ) -> RetryPolicy {
        let attempts = if task
            .requirements
            .quality_above(self.params.retry_quality_threshold)
        {
            self.params.high_quality_attempts
        } else {
            self.params.default_attempts
        };
        let policy = RetryPolicy::new(attempts, BackoffKind::Exponential);

        let Some(primary) = members.first().and_then(|id| catalog.get(id)) else {
            return policy;
        };

        // Highest strength overlap among unselected tools; first wins ties
        let mut best: Option<(&str, f64)> = None;
        for candidate in catalog.all().filter(|c| !selected.contains(c.tool_id.as_str())) {
            let overlap = primary.strength_overlap(candidate);
            if best.is_none_or(|(_, b)| overlap > b) {
                best = Some((candidate.tool_id.as_str(), overlap));
            }
        }

        match best {
            Some((fallback, overlap)) if overlap > self.params.fallback_similarity => {
                policy.with_fallback(fallback)
            }
            _ => policy,
        }
    }

    // ==================== Alternatives ====================

    fn alternatives_from(
        &self,
        catalog: &CapabilityCatalog,
        tools: &[String],
        task: &Task,
        analysis: &TaskAnalysis,
    ) -> Vec<AlternativePlan> {
        if tools.is_empty() {
            return Vec::new();
        }

        let fast_tools = with_dependencies(
            catalog,
            tools
                .iter()
                .take(self.params.fast_alternative_tools)
                .cloned()
                .collect(),
            &mut Vec::new(),
        );

        // Unselected tools, most shared required capabilities first, then by quality
        let relevance = |c: &conductor_domain::ToolCapability| {
            c.specializations
                .iter()
                .filter(|s| analysis.required_capabilities.contains(s))
                .count()
        };
        let mut extra: Vec<&conductor_domain::ToolCapability> =
            catalog.all().filter(|c| !tools.contains(&c.tool_id)).collect();
        extra.sort_by(|a, b| {
            relevance(b).cmp(&relevance(a)).then(
                b.performance
                    .quality_score
                    .total_cmp(&a.performance.quality_score),
            )
        });
        let mut thorough_tools = tools.to_vec();
        thorough_tools.extend(
            extra
                .into_iter()
                .take(self.params.thorough_extra_tools)
                .map(|c| c.tool_id.clone()),
        );
        let thorough_tools = with_dependencies(catalog, thorough_tools, &mut Vec::new());

        let build = |kind: AlternativeKind, tools: Vec<String>, tradeoffs: Tradeoffs| {
            let stages = self.stages_from(catalog, &tools, task, analysis);
            let (estimated_time_ms, estimated_confidence) = estimate_with(catalog, &stages);
            AlternativePlan {
                kind,
                stages,
                estimated_time_ms,
                estimated_confidence,
                tradeoffs,
            }
        };

        vec![
            build(
                AlternativeKind::Fast,
                fast_tools,
                Tradeoffs::new(["faster", "less resource use"], ["less coverage"]),
            ),
            build(
                AlternativeKind::Thorough,
                thorough_tools,
                Tradeoffs::new(["higher confidence", "broader coverage"], ["slower"]),
            ),
        ]
    }
}

// ==================== Helpers ====================

fn depends(catalog: &CapabilityCatalog, tool: &str, on: &str) -> bool {
    catalog.get(tool).is_some_and(|c| c.depends_on_tool(on))
}

fn stats(catalog: &CapabilityCatalog, tool: &str) -> PerformanceStats {
    catalog
        .get(tool)
        .map(|c| c.performance.clone())
        .unwrap_or_default()
}

/// Append every (transitive) dependency of `tools` that the catalog knows
fn with_dependencies(
    catalog: &CapabilityCatalog,
    tools: Vec<String>,
    reasoning: &mut Vec<String>,
) -> Vec<String> {
    let mut closed = tools;
    let mut index = 0;
    while index < closed.len() {
        let dependencies = catalog
            .get(&closed[index])
            .map(|c| c.depends_on.clone())
            .unwrap_or_default();
        for dependency in dependencies {
            if closed.contains(&dependency) {
                continue;
            }
            if !catalog.contains(&dependency) {
                warn!(tool = %closed[index], %dependency, "Dependency is not registered");
                continue;
            }
            reasoning.push(format!(
                "added {dependency} (dependency of {})",
                closed[index]
            ));
            closed.push(dependency);
        }
        index += 1;
    }
    closed
}

/// Connected components of the depends-on relation, in selection order,
/// each ordered dependencies first
fn dependency_groups(catalog: &CapabilityCatalog, tools: &[String]) -> Vec<Vec<String>> {
    let linked = |a: &str, b: &str| depends(catalog, a, b) || depends(catalog, b, a);
    let mut assigned = vec![false; tools.len()];
    let mut groups = Vec::new();

    for start in 0..tools.len() {
        if assigned[start] {
            continue;
        }
        assigned[start] = true;
        let mut members = vec![start];
        let mut frontier = vec![start];
        while let Some(current) = frontier.pop() {
            for other in 0..tools.len() {
                if !assigned[other] && linked(&tools[current], &tools[other]) {
                    assigned[other] = true;
                    members.push(other);
                    frontier.push(other);
                }
            }
        }
        members.sort_unstable();
        let members = members.into_iter().map(|i| tools[i].clone()).collect();
        groups.push(dependency_order(catalog, members));
    }

    groups
}

/// Topological order inside a group; ties keep selection order
fn dependency_order(catalog: &CapabilityCatalog, members: Vec<String>) -> Vec<String> {
    let mut remaining = members;
    let mut ordered = Vec::with_capacity(remaining.len());
    while !remaining.is_empty() {
        let ready = remaining.iter().position(|tool| {
            remaining
                .iter()
                .all(|other| other == tool || !depends(catalog, tool, other))
        });
        let next = ready.unwrap_or_else(|| {
            warn!(tools = ?remaining, "Dependency cycle, keeping selection order");
            0
        });
        ordered.push(remaining.remove(next));
    }
    ordered
}

/// Merge independent single-tool groups into one group at the position of
/// the first of them
fn batch_singletons(groups: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let singles = groups.iter().filter(|g| g.len() == 1).count();
    if singles < 2 {
        return groups;
    }

    let mut batched: Vec<Vec<String>> = Vec::new();
    let mut batch_index: Option<usize> = None;
    for group in groups {
        if group.len() != 1 {
            batched.push(group);
            continue;
        }
        match batch_index {
            Some(i) => batched[i].extend(group),
            None => {
                batch_index = Some(batched.len());
                batched.push(group);
            }
        }
    }
    batched
}

fn has_internal_dependency(catalog: &CapabilityCatalog, members: &[String]) -> bool {
    members
        .iter()
        .any(|a| members.iter().any(|b| a != b && depends(catalog, a, b)))
}

fn expected_aspects(
    catalog: &CapabilityCatalog,
    members: &[String],
    analysis: &TaskAnalysis,
) -> Vec<String> {
    let aspects: BTreeSet<String> = members
        .iter()
        .filter_map(|id| catalog.get(id))
        .flat_map(|c| c.specializations.iter())
        .filter(|s| analysis.required_capabilities.contains(s))
        .cloned()
        .collect();
    aspects.into_iter().collect()
}

/// Max of member latencies for parallel stages, sum otherwise
fn stage_latency(catalog: &CapabilityCatalog, members: &[String], mode: ExecutionMode) -> u64 {
    let latencies = members.iter().map(|t| stats(catalog, t).mean_latency_ms);
    match mode {
        ExecutionMode::Parallel => latencies.max().unwrap_or(0),
        ExecutionMode::Sequential | ExecutionMode::Consensus => latencies.sum(),
    }
}

fn estimate_with(catalog: &CapabilityCatalog, stages: &[Stage]) -> (u64, f64) {
    if stages.is_empty() {
        return (0, 0.0);
    }
    let time_ms = stages
        .iter()
        .map(|s| stage_latency(catalog, &s.tools, s.mode))
        .sum();
    let confidence = stages
        .iter()
        .map(|s| {
            s.tools
                .iter()
                .map(|t| stats(catalog, t).success_rate)
                .product::<f64>()
        })
        .sum::<f64>()
        / stages.len() as f64;
    (time_ms, confidence)
}
