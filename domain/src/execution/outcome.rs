//! Per-tool outputs and per-stage reports

use super::status::StageStatus;
use crate::consensus::result::ConsensusResult;
use crate::plan::stage::ExecutionMode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// What one tool slot of a stage ended up with.
///
/// When a fallback tool stands in, the output is still keyed by the
/// original tool; `produced_by` names the tool that actually answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub produced_by: String,
    /// Invocations made for this slot (retries and fallback included)
    pub attempts: u32,
    #[serde(default)]
    pub via_fallback: bool,
}

impl ToolOutput {
    pub fn success(produced_by: impl Into<String>, data: Value, attempts: u32) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            produced_by: produced_by.into(),
            attempts,
            via_fallback: false,
        }
    }

    pub fn from_fallback(fallback_tool: impl Into<String>, data: Value, attempts: u32) -> Self {
        Self {
            via_fallback: true,
            ..Self::success(fallback_tool, data, attempts)
        }
    }

    pub fn failure(tool_id: impl Into<String>, error: impl Into<String>, attempts: u32) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            produced_by: tool_id.into(),
            attempts,
            via_fallback: false,
        }
    }

    pub fn is_error(&self) -> bool {
        !self.success
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Value handed to downstream stages: the data, or an error payload
    pub fn as_context_value(&self) -> Value {
        match (&self.data, &self.error) {
            (Some(data), _) => data.clone(),
            (None, Some(error)) => serde_json::json!({ "error": error }),
            (None, None) => Value::Null,
        }
    }
}

/// Everything recorded about one stage run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    /// Stage position in the plan (1-indexed)
    pub position: usize,
    pub mode: ExecutionMode,
    pub status: StageStatus,
    /// Output key → output ("consensus" for the reconciled value)
    pub outputs: BTreeMap<String, ToolOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consensus: Option<ConsensusResult>,
    pub duration_ms: u64,
    pub tool_durations_ms: BTreeMap<String, u64>,
    #[serde(default)]
    pub timed_out: bool,
}

impl StageReport {
    /// Keys of tool slots that ended without usable output
    pub fn failed_tools(&self) -> Vec<&str> {
        self.outputs
            .iter()
            .filter(|(_, o)| o.is_error())
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Keys of tool slots filled by a fallback
    pub fn substituted_tools(&self) -> Vec<&str> {
        self.outputs
            .iter()
            .filter(|(_, o)| o.via_fallback)
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Status implied by the outputs: failed > degraded > succeeded
    pub fn status_from_outputs(outputs: &BTreeMap<String, ToolOutput>) -> StageStatus {
        if outputs.values().any(ToolOutput::is_error) {
            StageStatus::Failed
        } else if outputs.values().any(|o| o.via_fallback) {
            StageStatus::Degraded
        } else {
            StageStatus::Succeeded
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_value() {
        let ok = ToolOutput::success("a", json!({"x": 1}), 1);
        assert_eq!(ok.as_context_value(), json!({"x": 1}));

        let failed = ToolOutput::failure("a", "boom", 3);
        assert_eq!(failed.as_context_value(), json!({"error": "boom"}));
        assert!(failed.is_error());
    }

    #[test]
    fn test_status_from_outputs() {
        let mut outputs = BTreeMap::new();
        outputs.insert("a".to_string(), ToolOutput::success("a", json!(1), 1));
        assert_eq!(StageReport::status_from_outputs(&outputs), StageStatus::Succeeded);

        outputs.insert("b".to_string(), ToolOutput::from_fallback("c", json!(2), 4));
        assert_eq!(StageReport::status_from_outputs(&outputs), StageStatus::Degraded);

        outputs.insert("d".to_string(), ToolOutput::failure("d", "x", 2));
        assert_eq!(StageReport::status_from_outputs(&outputs), StageStatus::Failed);
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let json = serde_json::to_value(ToolOutput::success("a", json!(1), 1)).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["produced_by"], json!("a"));
    }
}
