//! Console output formatter for plans and execution results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use conductor_domain::core::string::truncate;
use conductor_domain::{
    ExecutionResult, LearningImpact, Plan, StageReport, StageStatus, ToolOutput,
};

/// Longest rendering of one tool's output
const MAX_OUTPUT_PREVIEW: usize = 160;

/// Formats plans and results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a plan: stages, estimate, alternatives and reasoning
    pub fn format_plan(plan: &Plan) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Execution Plan"));
        output.push('\n');

        output.push_str(&format!(
            "{} {} ({})\n",
            "Task:".cyan().bold(),
            plan.task.id,
            plan.task.task_type
        ));
        output.push_str(&format!("{} {}\n", "Plan:".cyan().bold(), plan.id));
        output.push_str(&format!(
            "{} ~{} ms, confidence {:.2}\n",
            "Estimate:".cyan().bold(),
            plan.estimated_time_ms,
            plan.estimated_confidence
        ));

        output.push_str(&Self::section_header("Stages"));
        if plan.stages.is_empty() {
            output.push_str(&format!("  {}\n", "(no tools selected)".dimmed()));
        }
        for stage in &plan.stages {
            output.push_str(&format!("  {}\n", stage.label().yellow().bold()));
            output.push_str(&format!(
                "    timeout {} ms, {} attempt(s), {} backoff",
                stage.timeout_ms,
                stage.retry.max_attempts,
                stage.retry.backoff.as_str()
            ));
            if let Some(fallback) = &stage.retry.fallback_tool {
                output.push_str(&format!(", fallback {}", fallback));
            }
            output.push('\n');
        }

        if !plan.alternatives.is_empty() {
            output.push_str(&Self::section_header("Alternatives"));
            for alt in &plan.alternatives {
                output.push_str(&format!(
                    "  {} ~{} ms, confidence {:.2}\n",
                    format!("{}:", alt.kind).yellow().bold(),
                    alt.estimated_time_ms,
                    alt.estimated_confidence
                ));
                output.push_str(&format!(
                    "    + {}\n    - {}\n",
                    alt.tradeoffs.pros.join(", "),
                    alt.tradeoffs.cons.join(", ")
                ));
            }
        }

        if !plan.reasoning.is_empty() {
            output.push_str(&Self::section_header("Reasoning"));
            for line in &plan.reasoning {
                output.push_str(&format!("  * {}\n", line));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format the complete execution result
    pub fn format_result(result: &ExecutionResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Execution Result"));
        output.push('\n');

        let verdict = if result.success {
            "succeeded".green().bold()
        } else {
            "failed".red().bold()
        };
        output.push_str(&format!("{} {}\n", "Outcome:".cyan().bold(), verdict));
        output.push_str(&format!(
            "{} {:.2}\n",
            "Confidence:".cyan().bold(),
            result.confidence
        ));
        output.push_str(&format!(
            "{} {} ms\n",
            "Duration:".cyan().bold(),
            result.performance.total_ms
        ));
        if result.recovered {
            output.push_str(&format!("{}\n", "Recovered via an alternative plan".yellow()));
        }
        output.push_str(&format!("\n{}\n", result.explanation.summary));

        for report in &result.stages {
            output.push_str(&Self::format_stage(report));
        }

        if let Some(consensus) = &result.consensus {
            output.push_str(&Self::section_header("Consensus"));
            output.push_str(&format!(
                "  agreement {:.2}, confidence {:.2}, contributors: {}\n",
                consensus.agreement,
                consensus.confidence,
                consensus.contributors.join(", ")
            ));
            for conflict in &consensus.conflicts {
                output.push_str(&format!(
                    "  {} {} -> {} ({})\n",
                    "conflict".yellow(),
                    conflict.aspect,
                    conflict.resolved,
                    conflict.resolution
                ));
            }
        }

        if !result.learnings.is_empty() {
            output.push_str(&Self::section_header("Learnings"));
            for learning in &result.learnings {
                let marker = match learning.impact {
                    LearningImpact::Positive => "+".green(),
                    LearningImpact::Negative => "-".red(),
                    LearningImpact::Neutral => "~".normal(),
                };
                output.push_str(&format!("  {} {}\n", marker, learning.observation));
                if let Some(rec) = &learning.recommendation {
                    output.push_str(&format!("    {}\n", rec.dimmed()));
                }
            }
        }

        output.push_str(&Self::footer());
        output
    }

    fn format_stage(report: &StageReport) -> String {
        let mut output = Self::section_header(&format!(
            "Stage {} [{}] {}",
            report.position,
            report.mode,
            Self::status_label(report.status)
        ));

        for (tool, out) in &report.outputs {
            output.push_str(&format!("  {}\n", Self::format_output(tool, out)));
        }
        if report.timed_out {
            output.push_str(&format!("  {}\n", "stage timed out".red()));
        }
        output
    }

    fn format_output(tool: &str, out: &ToolOutput) -> String {
        let name = if out.via_fallback {
            format!("{} (via {})", tool, out.produced_by)
        } else {
            tool.to_string()
        };

        if out.success {
            let preview = out
                .data
                .as_ref()
                .map(|d| truncate(&d.to_string(), MAX_OUTPUT_PREVIEW))
                .unwrap_or_default();
            format!("{} {} {}", "v".green(), name.bold(), preview.dimmed())
        } else {
            format!(
                "{} {} {}",
                "x".red(),
                name.bold(),
                out.error.as_deref().unwrap_or("Unknown")
            )
        }
    }

    fn status_label(status: StageStatus) -> String {
        match status {
            StageStatus::Succeeded => status.to_string().green().to_string(),
            StageStatus::Degraded => status.to_string().yellow().to_string(),
            StageStatus::Failed => status.to_string().red().to_string(),
            StageStatus::Pending | StageStatus::Running => status.to_string(),
        }
    }

    /// Format as JSON
    pub fn format_json<T: serde::Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_plan(&self, plan: &Plan) -> String {
        Self::format_plan(plan)
    }

    fn format_result(&self, result: &ExecutionResult) -> String {
        Self::format_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conductor_domain::{PlanId, Task, TaskType};
    use serde_json::json;

    #[test]
    fn test_empty_plan_mentions_no_tools() {
        colored::control::set_override(false);
        let plan = Plan::new(Task::new("t-1", TaskType::Security, "x"), vec![]);
        let text = ConsoleFormatter::format_plan(&plan);
        assert!(text.contains("Execution Plan"));
        assert!(text.contains("t-1 (security)"));
        assert!(text.contains("(no tools selected)"));
    }

    #[test]
    fn test_fallback_output_names_producer() {
        colored::control::set_override(false);
        let out = ToolOutput::from_fallback("quality-checker", json!({"ok": true}), 4);
        let line = ConsoleFormatter::format_output("security-auditor", &out);
        assert!(line.contains("security-auditor (via quality-checker)"));
    }

    #[test]
    fn test_failed_output_shows_error() {
        colored::control::set_override(false);
        let out = ToolOutput::failure("a", "timed out", 3);
        let line = ConsoleFormatter::format_output("a", &out);
        assert!(line.starts_with("x a timed out"));
    }

    #[test]
    fn test_result_summary() {
        colored::control::set_override(false);
        let result = ExecutionResult::empty(PlanId::from("plan-1"), vec![]);
        let text = ConsoleFormatter::format_result(&result);
        assert!(text.contains("Outcome: succeeded"));
        assert!(text.contains("Confidence: 0.00"));
    }

    #[test]
    fn test_json_output() {
        let result = ExecutionResult::empty(PlanId::from("plan-1"), vec![]);
        let value: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_json(&result)).unwrap();
        assert_eq!(value["plan_id"], json!("plan-1"));
    }
}
