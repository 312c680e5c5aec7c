//! Learnings derived from one execution

use super::outcome::StageReport;
use super::status::StageStatus;
use serde::{Deserialize, Serialize};

/// Whether an observation argues for or against what was done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningImpact {
    Positive,
    Negative,
    Neutral,
}

/// A recorded observation from one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Learning {
    pub pattern: String,
    pub observation: String,
    pub impact: LearningImpact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl Learning {
    pub fn new(
        pattern: impl Into<String>,
        observation: impl Into<String>,
        impact: LearningImpact,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            observation: observation.into(),
            impact,
            recommendation: None,
        }
    }

    pub fn recommend(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }
}

/// Derive learnings from the stage reports of a finished run.
///
/// Covers exhausted tools, fallback substitutions, consensus conflicts,
/// timed-out stages and, for clean runs, the tool combination used.
pub fn derive_learnings(reports: &[StageReport]) -> Vec<Learning> {
    let mut learnings = Vec::new();

    for report in reports {
        for (key, output) in &report.outputs {
            if output.is_error() {
                learnings.push(
                    Learning::new(
                        format!("tool-exhausted:{key}"),
                        format!(
                            "{key} produced no usable output after {} attempt(s) in stage {}",
                            output.attempts,
                            report.position
                        ),
                        LearningImpact::Negative,
                    )
                    .recommend(format!("configure a fallback for {key} or lower its priority")),
                );
            } else if output.via_fallback {
                learnings.push(
                    Learning::new(
                        format!("fallback:{key}->{}", output.produced_by),
                        format!("{} stood in for {key}", output.produced_by),
                        LearningImpact::Neutral,
                    )
                    .recommend(format!(
                        "consider {} as the primary tool for this task type",
                        output.produced_by
                    )),
                );
            }
        }

        if let Some(consensus) = &report.consensus
            && consensus.has_conflicts()
        {
            let aspects: Vec<&str> = consensus.conflicts.iter().map(|c| c.aspect.as_str()).collect();
            learnings.push(Learning::new(
                format!("consensus-conflict:stage-{}", report.position),
                format!(
                    "tools disagreed on {} (agreement {:.2})",
                    aspects.join(", "),
                    consensus.agreement
                ),
                LearningImpact::Neutral,
            ));
        }

        if report.timed_out {
            learnings.push(
                Learning::new(
                    format!("stage-timeout:stage-{}", report.position),
                    format!(
                        "stage {} exceeded its timeout after {} ms",
                        report.position,
                        report.duration_ms
                    ),
                    LearningImpact::Negative,
                )
                .recommend("raise the stage timeout or prefer faster tools"),
            );
        }
    }

    let clean = !reports.is_empty()
        && reports.iter().all(|r| r.status == StageStatus::Succeeded);
    if clean {
        let mut tools: Vec<&str> = reports
            .iter()
            .flat_map(|r| r.outputs.values())
            .filter(|o| o.produced_by != "consensus")
            .map(|o| o.produced_by.as_str())
            .collect();
        tools.sort_unstable();
        tools.dedup();
        learnings.push(Learning::new(
            format!("combination:{}", tools.join("+")),
            "all stages succeeded without substitution",
            LearningImpact::Positive,
        ));
    }

    learnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::outcome::ToolOutput;
    use crate::plan::stage::ExecutionMode;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn report(outputs: Vec<(&str, ToolOutput)>) -> StageReport {
        let outputs: BTreeMap<String, ToolOutput> =
            outputs.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        StageReport {
            position: 1,
            mode: ExecutionMode::Parallel,
            status: StageReport::status_from_outputs(&outputs),
            outputs,
            consensus: None,
            duration_ms: 10,
            tool_durations_ms: BTreeMap::new(),
            timed_out: false,
        }
    }

    #[test]
    fn test_clean_run_records_combination() {
        let learnings = derive_learnings(&[report(vec![
            ("b", ToolOutput::success("b", json!(1), 1)),
            ("a", ToolOutput::success("a", json!(1), 1)),
        ])]);
        assert_eq!(learnings.len(), 1);
        assert_eq!(learnings[0].pattern, "combination:a+b");
        assert_eq!(learnings[0].impact, LearningImpact::Positive);
    }

    #[test]
    fn test_fallback_and_failure() {
        let learnings = derive_learnings(&[report(vec![
            ("a", ToolOutput::from_fallback("c", json!(1), 4)),
            ("b", ToolOutput::failure("b", "down", 3)),
        ])]);
        assert!(learnings.iter().any(|l| l.pattern == "fallback:a->c"));
        let exhausted = learnings
            .iter()
            .find(|l| l.pattern == "tool-exhausted:b")
            .unwrap();
        assert_eq!(exhausted.impact, LearningImpact::Negative);
        assert!(exhausted.recommendation.is_some());
        assert!(!learnings.iter().any(|l| l.pattern.starts_with("combination:")));
    }

    #[test]
    fn test_timeout_learning() {
        let mut r = report(vec![("a", ToolOutput::failure("a", "timed out", 1))]);
        r.timed_out = true;
        let learnings = derive_learnings(&[r]);
        assert!(learnings.iter().any(|l| l.pattern == "stage-timeout:stage-1"));
    }

    #[test]
    fn test_no_reports_no_learnings() {
        assert!(derive_learnings(&[]).is_empty());
    }
}
