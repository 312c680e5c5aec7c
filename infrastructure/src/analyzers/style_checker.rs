//! `quality-checker`: line-based style checks

use crate::hub::{ToolHandler, execute_reply};
use async_trait::async_trait;
use conductor_domain::{ToolPayload, ToolRequest};
use serde::Serialize;
use serde_json::{Value, json};

pub const QUALITY_CHECKER: &str = "quality-checker";

const DEFAULT_MAX_LINE_LENGTH: usize = 100;

/// Issues beyond this count make the input "medium" severity
const NOISY_ISSUE_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
enum IssueKind {
    LongLine,
    TrailingWhitespace,
    Tab,
    TodoMarker,
}

impl IssueKind {
    fn penalty(self) -> u32 {
        match self {
            IssueKind::LongLine => 2,
            IssueKind::TrailingWhitespace | IssueKind::Tab => 1,
            IssueKind::TodoMarker => 3,
        }
    }
}

#[derive(Debug, Default, Serialize)]
struct StyleMetrics {
    lines: usize,
    long_lines: usize,
    trailing_whitespace: usize,
    tabs: usize,
    todo_markers: usize,
}

/// Style checker
pub struct StyleChecker {
    max_line_length: usize,
}

impl StyleChecker {
    pub fn new() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }

    pub fn with_max_line_length(mut self, max_line_length: usize) -> Self {
        self.max_line_length = max_line_length;
        self
    }

    /// Check `text` and build the tool's output object
    pub fn check(&self, text: &str) -> Value {
        let mut metrics = StyleMetrics::default();
        let mut issues = Vec::new();

        for (index, line) in text.lines().enumerate() {
            metrics.lines += 1;
            let mut found = Vec::new();

            if line.chars().count() > self.max_line_length {
                metrics.long_lines += 1;
                found.push(IssueKind::LongLine);
            }
            if line.ends_with(' ') || line.ends_with('\t') {
                metrics.trailing_whitespace += 1;
                found.push(IssueKind::TrailingWhitespace);
            }
            if line.contains('\t') {
                metrics.tabs += 1;
                found.push(IssueKind::Tab);
            }
            if line.contains("TODO") || line.contains("FIXME") {
                metrics.todo_markers += 1;
                found.push(IssueKind::TodoMarker);
            }

            issues.extend(found.into_iter().map(|kind| (kind, index + 1)));
        }

        let penalty: u32 = issues.iter().map(|(kind, _)| kind.penalty()).sum();
        let quality = 100u32.saturating_sub(penalty);
        let severity = if issues.is_empty() {
            "none"
        } else if metrics.todo_markers > 0 || issues.len() > NOISY_ISSUE_COUNT {
            "medium"
        } else {
            "low"
        };

        json!({
            "issues": issues
                .iter()
                .map(|(kind, line)| json!({"kind": kind, "line": line}))
                .collect::<Vec<_>>(),
            "issue_count": issues.len(),
            "metrics": metrics,
            "quality": quality,
            "severity": severity,
        })
    }

    fn analyze(&self, payload: &ToolPayload) -> Result<Value, String> {
        Ok(self.check(&payload.input_text()))
    }
}

impl Default for StyleChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolHandler for StyleChecker {
    fn tool_id(&self) -> &str {
        QUALITY_CHECKER
    }

    async fn handle(&self, request: &ToolRequest) -> Value {
        execute_reply(request, |payload| self.analyze(payload))
    }
}
