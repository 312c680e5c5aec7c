use serde::{Deserialize, Serialize};

/// Finding severity, ordered from least to most serious
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Label for the most serious of `severities`, or `"none"`
    pub fn worst_label(severities: impl IntoIterator<Item = Severity>) -> &'static str {
        severities
            .into_iter()
            .max()
            .map(|s| s.as_str())
            .unwrap_or("none")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worst_label() {
        assert_eq!(Severity::worst_label([]), "none");
        assert_eq!(
            Severity::worst_label([Severity::Low, Severity::High, Severity::Medium]),
            "high"
        );
    }
}
