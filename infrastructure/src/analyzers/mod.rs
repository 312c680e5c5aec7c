//! Built-in analysis tools served by the hub
//!
//! | Tool id | Handler | Technique |
//! |---------|---------|-----------|
//! | `security-auditor` | [`PatternScanner`] | regex rules per line |
//! | `quality-checker` | [`StyleChecker`] | line-based style checks |
//! | `refactor-engine` | [`SubstitutionRefactor`] | regex substitutions |
//! | `test-analyzer` | [`CoverageProbe`] | test marker counting |

mod coverage_probe;
mod pattern_scanner;
mod severity;
mod style_checker;
mod substitution_refactor;

pub use coverage_probe::{CoverageProbe, TEST_ANALYZER};
pub use pattern_scanner::{PatternScanner, SECURITY_AUDITOR};
pub use severity::Severity;
pub use style_checker::{QUALITY_CHECKER, StyleChecker};
pub use substitution_refactor::{REFACTOR_ENGINE, SubstitutionRefactor};

use crate::hub::ToolHandler;
use std::sync::Arc;

/// All built-in handlers, ready to register with the hub
pub fn builtin_handlers() -> Result<Vec<Arc<dyn ToolHandler>>, regex::Error> {
    Ok(vec![
        Arc::new(PatternScanner::new()),
        Arc::new(StyleChecker::new()),
        Arc::new(SubstitutionRefactor::new()?),
        Arc::new(CoverageProbe::new()?),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::seed_catalog;

    #[test]
    fn test_builtin_handlers_are_seeded_tools() {
        let catalog = seed_catalog();
        let handlers = builtin_handlers().unwrap();
        assert_eq!(handlers.len(), 4);
        for handler in handlers {
            assert!(catalog.contains(handler.tool_id()));
        }
    }
}
