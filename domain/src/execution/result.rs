//! Execution result

use super::learning::Learning;
use super::outcome::{StageReport, ToolOutput};
use crate::consensus::result::ConsensusResult;
use crate::plan::entities::PlanId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where the time went
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceBreakdown {
    pub total_ms: u64,
    pub per_stage_ms: Vec<u64>,
    pub per_tool_ms: BTreeMap<String, u64>,
}

impl PerformanceBreakdown {
    pub fn from_reports(total_ms: u64, reports: &[StageReport]) -> Self {
        let mut per_tool_ms = BTreeMap::new();
        for report in reports {
            for (tool, ms) in &report.tool_durations_ms {
                *per_tool_ms.entry(tool.clone()).or_insert(0) += ms;
            }
        }
        Self {
            total_ms,
            per_stage_ms: reports.iter().map(|r| r.duration_ms).collect(),
            per_tool_ms,
        }
    }

    pub fn slowest_tool(&self) -> Option<(&str, u64)> {
        self.per_tool_ms
            .iter()
            .max_by_key(|(_, ms)| **ms)
            .map(|(t, ms)| (t.as_str(), *ms))
    }
}

/// Human-readable account of how the result came about
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub summary: String,
    /// Planner reasoning trace (including any recovery note)
    pub reasoning: Vec<String>,
    pub stage_notes: Vec<String>,
}

/// Outcome of executing a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub plan_id: PlanId,
    pub success: bool,
    /// Tool id (or "consensus") → output
    pub outputs: BTreeMap<String, ToolOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consensus: Option<ConsensusResult>,
    pub confidence: f64,
    pub performance: PerformanceBreakdown,
    pub learnings: Vec<Learning>,
    pub explanation: Explanation,
    pub stages: Vec<StageReport>,
    /// Whether an alternative plan had to be swapped in
    #[serde(default)]
    pub recovered: bool,
}

impl ExecutionResult {
    /// Result of a plan without stages: nothing ran, nothing is known
    pub fn empty(plan_id: PlanId, reasoning: Vec<String>) -> Self {
        Self {
            plan_id,
            success: true,
            outputs: BTreeMap::new(),
            consensus: None,
            confidence: 0.0,
            performance: PerformanceBreakdown::default(),
            learnings: Vec::new(),
            explanation: Explanation {
                summary: "no tools were selected; nothing to execute".to_string(),
                reasoning,
                stage_notes: Vec::new(),
            },
            stages: Vec::new(),
            recovered: false,
        }
    }

    pub fn output(&self, key: &str) -> Option<&ToolOutput> {
        self.outputs.get(key)
    }

    /// Tools that produced a non-error output (fallback producers included)
    pub fn contributing_tools(&self) -> Vec<String> {
        let mut tools: Vec<String> = self
            .stages
            .iter()
            .flat_map(|s| s.outputs.values())
            .filter(|o| o.success && o.produced_by != "consensus")
            .map(|o| o.produced_by.clone())
            .collect();
        tools.sort();
        tools.dedup();
        tools
    }

    pub fn failed_tools(&self) -> Vec<String> {
        self.outputs
            .iter()
            .filter(|(_, o)| o.is_error())
            .map(|(k, _)| k.clone())
            .collect()
    }
}
