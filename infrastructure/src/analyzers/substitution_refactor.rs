//! `refactor-engine`: regex substitution refactoring
//!
//! The input object may carry extra `rules` (`[{"pattern", "replacement"}]`)
//! that run after the built-in ones. The quality checker's report, when
//! present in the context, is echoed as the baseline the edits address.

use crate::hub::{ToolHandler, execute_reply};
use async_trait::async_trait;
use conductor_domain::{ToolPayload, ToolRequest};
use regex::Regex;
use serde_json::{Value, json};

pub const REFACTOR_ENGINE: &str = "refactor-engine";

const UPSTREAM_TOOL: &str = "quality-checker";

const DEFAULT_RULES: &[(&str, &str, &str)] = &[
    ("strip-trailing-whitespace", r"(?m)[ \t]+$", ""),
    ("expand-tabs", r"\t", "    "),
    ("redundant-true-comparison", r"\s*==\s*true\b", ""),
    ("redundant-false-comparison", r"\s*!=\s*false\b", ""),
];

struct Substitution {
    name: String,
    regex: Regex,
    replacement: String,
}

impl Substitution {
    fn compile(name: &str, pattern: &str, replacement: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.to_string(),
            regex: Regex::new(pattern)?,
            replacement: replacement.to_string(),
        })
    }
}

/// Substitution refactoring engine
pub struct SubstitutionRefactor {
    rules: Vec<Substitution>,
}

impl SubstitutionRefactor {
    pub fn new() -> Result<Self, regex::Error> {
        let rules = DEFAULT_RULES
            .iter()
            .map(|(name, pattern, replacement)| Substitution::compile(name, pattern, replacement))
            .collect::<Result<_, _>>()?;
        Ok(Self { rules })
    }

    /// Apply the built-in rules followed by `extra`
    fn rewrite(&self, text: &str, extra: &[Substitution]) -> (String, Vec<Value>, usize) {
        let mut current = text.to_string();
        let mut applied = Vec::new();
        let mut changes = 0;

        for rule in self.rules.iter().chain(extra) {
            let count = rule.regex.find_iter(&current).count();
            if count == 0 {
                continue;
            }
            current = rule
                .regex
                .replace_all(&current, rule.replacement.as_str())
                .into_owned();
            changes += count;
            applied.push(json!({"rule": rule.name, "count": count}));
        }

        (current, applied, changes)
    }

    fn analyze(&self, payload: &ToolPayload) -> Result<Value, String> {
        let extra = custom_rules(&payload.input)?;
        let (refactored, applied, changes) = self.rewrite(&payload.input_text(), &extra);

        let baseline_issues = payload
            .context
            .get(UPSTREAM_TOOL)
            .and_then(|report| report.get("issue_count"))
            .cloned()
            .unwrap_or(Value::Null);

        Ok(json!({
            "refactored": refactored,
            "changes": changes,
            "applied": applied,
            "baseline_issues": baseline_issues,
        }))
    }
}

fn custom_rules(input: &Value) -> Result<Vec<Substitution>, String> {
    let Some(rules) = input.get("rules").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    rules
        .iter()
        .enumerate()
        .map(|(index, rule)| {
            let pattern = rule
                .get("pattern")
                .and_then(Value::as_str)
                .ok_or_else(|| format!("rule {index} has no pattern"))?;
            let replacement = rule.get("replacement").and_then(Value::as_str).unwrap_or("");
            Substitution::compile(&format!("custom-{index}"), pattern, replacement)
                .map_err(|e| format!("Invalid regex pattern: {}", e))
        })
        .collect()
}

#[async_trait]
impl ToolHandler for SubstitutionRefactor {
    fn tool_id(&self) -> &str {
        REFACTOR_ENGINE
    }

    async fn handle(&self, request: &ToolRequest) -> Value {
        execute_reply(request, |payload| self.analyze(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn payload(input: Value) -> ToolPayload {
        ToolPayload::new(input, Map::new())
    }

    #[test]
    fn test_builtin_rules() {
        let engine = SubstitutionRefactor::new().unwrap();
        let out = engine
            .analyze(&payload(json!("if ready == true {  \n\tgo();\n}")))
            .unwrap();
        assert_eq!(out["refactored"], json!("if ready {\n    go();\n}"));
        assert_eq!(out["changes"], json!(3));
        assert_eq!(out["baseline_issues"], Value::Null);
    }

    #[test]
    fn test_custom_rules_run_after_builtins() {
        let engine = SubstitutionRefactor::new().unwrap();
        let input = json!({
            "code": "let x = foo.unwrap();",
            "rules": [{"pattern": r"\.unwrap\(\)", "replacement": "?"}]
        });
        let out = engine.analyze(&payload(input)).unwrap();
        assert_eq!(out["refactored"], json!("let x = foo?;"));
        assert_eq!(out["applied"][0]["rule"], json!("custom-0"));
    }

    #[test]
    fn test_invalid_custom_rule_is_an_error() {
        let engine = SubstitutionRefactor::new().unwrap();
        let input = json!({"code": "x", "rules": [{"pattern": "("}]});
        let err = engine.analyze(&payload(input)).unwrap_err();
        assert!(err.starts_with("Invalid regex pattern"));
    }

    #[test]
    fn test_upstream_report_is_echoed() {
        let engine = SubstitutionRefactor::new().unwrap();
        let mut context = Map::new();
        context.insert(UPSTREAM_TOOL.to_string(), json!({"issue_count": 4}));
        let out = engine
            .analyze(&ToolPayload::new(json!("clean"), context))
            .unwrap();
        assert_eq!(out["baseline_issues"], json!(4));
        assert_eq!(out["changes"], json!(0));
    }
}
