//! `security-auditor`: line-by-line regex scan for risky constructs

use super::severity::Severity;
use crate::hub::{ToolHandler, execute_reply};
use async_trait::async_trait;
use conductor_domain::core::string::truncate;
use conductor_domain::{ToolPayload, ToolRequest};
use regex::Regex;
use serde_json::{Value, json};
use tracing::warn;

pub const SECURITY_AUDITOR: &str = "security-auditor";

/// Longest excerpt kept per finding
const MAX_EXCERPT: usize = 120;

const DEFAULT_RULES: &[(&str, Severity, &str)] = &[
    (
        "hardcoded-secret",
        Severity::Critical,
        r#"(?i)\b(password|passwd|secret|api_?key|token)\s*[:=]\s*["'][^"']+["']"#,
    ),
    (
        "sql-concatenation",
        Severity::High,
        r#"(?i)["'][^"']*\b(select|insert|update|delete)\b[^"']*["']\s*(\+|\|\|)"#,
    ),
    (
        "shell-execution",
        Severity::High,
        r"(Command::new|os\.system|subprocess\.|\bexec\s*\()",
    ),
    ("dynamic-eval", Severity::High, r"\beval\s*\("),
    ("unsafe-block", Severity::Medium, r"\bunsafe\s*\{"),
    ("weak-hash", Severity::Medium, r"(?i)\b(md5|sha1)\b"),
    ("insecure-transport", Severity::Low, r"http://"),
];

struct PatternRule {
    name: String,
    severity: Severity,
    regex: Regex,
}

/// Regex pattern scanner
pub struct PatternScanner {
    rules: Vec<PatternRule>,
}

impl PatternScanner {
    /// Scanner with the built-in rule set
    pub fn new() -> Self {
        Self::with_rules(DEFAULT_RULES.iter().copied())
    }

    /// Scanner over `(name, severity, pattern)` rules; invalid patterns are
    /// skipped with a warning
    pub fn with_rules<'a>(rules: impl IntoIterator<Item = (&'a str, Severity, &'a str)>) -> Self {
        let rules = rules
            .into_iter()
            .filter_map(|(name, severity, pattern)| match Regex::new(pattern) {
                Ok(regex) => Some(PatternRule {
                    name: name.to_string(),
                    severity,
                    regex,
                }),
                Err(e) => {
                    warn!(rule = name, "Invalid regex pattern: {}", e);
                    None
                }
            })
            .collect();
        Self { rules }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Scan `text` and build the tool's output object
    pub fn scan(&self, text: &str) -> Value {
        let mut findings = Vec::new();
        let mut severities = Vec::new();

        for (index, line) in text.lines().enumerate() {
            for rule in &self.rules {
                if rule.regex.is_match(line) {
                    severities.push(rule.severity);
                    findings.push(json!({
                        "rule": rule.name,
                        "severity": rule.severity,
                        "line": index + 1,
                        "excerpt": truncate(line.trim(), MAX_EXCERPT),
                    }));
                }
            }
        }

        let verdict = match severities.iter().max() {
            Some(Severity::High | Severity::Critical) => "fail",
            Some(_) => "warn",
            None => "pass",
        };

        json!({
            "findings": findings,
            "finding_count": findings.len(),
            "severity": Severity::worst_label(severities),
            "security": verdict,
        })
    }

    fn analyze(&self, payload: &ToolPayload) -> Result<Value, String> {
        Ok(self.scan(&payload.input_text()))
    }
}

impl Default for PatternScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolHandler for PatternScanner {
    fn tool_id(&self) -> &str {
        SECURITY_AUDITOR
    }

    async fn handle(&self, request: &ToolRequest) -> Value {
        execute_reply(request, |payload| self.analyze(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_compile() {
        assert_eq!(PatternScanner::new().rule_count(), DEFAULT_RULES.len());
    }

    #[test]
    fn test_clean_input_passes() {
        let out = PatternScanner::new().scan("fn add(a: i32, b: i32) -> i32 {\n    a + b\n}\n");
        assert_eq!(out["security"], json!("pass"));
        assert_eq!(out["severity"], json!("none"));
        assert_eq!(out["finding_count"], json!(0));
    }

    #[test]
    fn test_hardcoded_secret_is_critical() {
        let out = PatternScanner::new().scan("let x = 1;\nlet password = \"hunter2\";\n");
        assert_eq!(out["security"], json!("fail"));
        assert_eq!(out["severity"], json!("critical"));
        assert_eq!(out["findings"][0]["rule"], json!("hardcoded-secret"));
        assert_eq!(out["findings"][0]["line"], json!(2));
    }

    #[test]
    fn test_medium_findings_warn() {
        let out = PatternScanner::new().scan("let digest = md5(data);");
        assert_eq!(out["security"], json!("warn"));
        assert_eq!(out["severity"], json!("medium"));
    }

    #[test]
    fn test_sql_concatenation() {
        let out = PatternScanner::new().scan(r#"query("SELECT * FROM users WHERE id = " + id)"#);
        assert_eq!(out["findings"][0]["rule"], json!("sql-concatenation"));
    }

    #[test]
    fn test_invalid_rule_is_skipped() {
        let scanner = PatternScanner::with_rules([
            ("broken", Severity::Low, "("),
            ("todo", Severity::Low, "TODO"),
        ]);
        assert_eq!(scanner.rule_count(), 1);
    }

    #[tokio::test]
    async fn test_handler_reads_code_field() {
        let request = ToolRequest::execute(
            SECURITY_AUDITOR,
            ToolPayload::new(json!({"code": "unsafe { ptr.read() }"}), Default::default()),
        );
        let reply = PatternScanner::new().handle(&request).await;
        assert_eq!(reply["data"]["severity"], json!("medium"));
    }
}
