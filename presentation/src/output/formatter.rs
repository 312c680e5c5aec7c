//! Output formatter trait

use conductor_domain::{ExecutionResult, Plan};

/// Trait for formatting plans and execution results
pub trait OutputFormatter {
    /// Format a plan before execution
    fn format_plan(&self, plan: &Plan) -> String;

    /// Format the outcome of a run
    fn format_result(&self, result: &ExecutionResult) -> String;
}

/// Pretty-printed JSON output
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_plan(&self, plan: &Plan) -> String {
        serde_json::to_string_pretty(plan).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_result(&self, result: &ExecutionResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }
}
