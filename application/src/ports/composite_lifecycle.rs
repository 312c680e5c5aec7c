//! Composite lifecycle notifier: delegates to multiple notifiers.
//!
//! Used to fan out lifecycle events to both the progress reporter and the
//! broadcast bus.

use super::lifecycle::LifecycleNotifier;
use conductor_domain::{AlternativeKind, ExecutionResult, Plan, Stage, StageReport};

/// A notifier that delegates to multiple inner notifiers.
///
/// ```text
/// Executor.execute_with_progress(plan, &composite)
///                                       |
///               +-----------------------+----------------------+
///               |                                              |
///       ProgressReporter (console)                   LifecycleBus (broadcast)
/// ```
pub struct CompositeLifecycle<'a> {
    delegates: Vec<&'a dyn LifecycleNotifier>,
}

impl<'a> CompositeLifecycle<'a> {
    pub fn new(delegates: Vec<&'a dyn LifecycleNotifier>) -> Self {
        Self { delegates }
    }
}

/// Macro to delegate a method call to all inner notifiers.
macro_rules! delegate {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        for d in &$self.delegates {
            d.$method($($arg),*);
        }
    };
}

impl LifecycleNotifier for CompositeLifecycle<'_> {
    fn on_plan_start(&self, plan: &Plan) {
        delegate!(self, on_plan_start, plan);
    }

    fn on_stage_start(&self, stage: &Stage, total_stages: usize) {
        delegate!(self, on_stage_start, stage, total_stages);
    }

    fn on_tool_retry(&self, tool_id: &str, attempt: u32, max_attempts: u32, error: &str) {
        delegate!(self, on_tool_retry, tool_id, attempt, max_attempts, error);
    }

    fn on_fallback(&self, tool_id: &str, fallback_id: &str) {
        delegate!(self, on_fallback, tool_id, fallback_id);
    }

    fn on_stage_complete(&self, report: &StageReport, total_stages: usize) {
        delegate!(self, on_stage_complete, report, total_stages);
    }

    fn on_recovery(&self, plan: &Plan, alternative: AlternativeKind, reason: &str) {
        delegate!(self, on_recovery, plan, alternative, reason);
    }

    fn on_plan_complete(&self, result: &ExecutionResult) {
        delegate!(self, on_plan_complete, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        fallbacks: AtomicUsize,
    }

    impl LifecycleNotifier for Counting {
        fn on_fallback(&self, _tool_id: &str, _fallback_id: &str) {
            self.fallbacks.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_delegates_to_all() {
        let a = Counting {
            fallbacks: AtomicUsize::new(0),
        };
        let b = Counting {
            fallbacks: AtomicUsize::new(0),
        };
        let composite = CompositeLifecycle::new(vec![&a, &b]);
        composite.on_fallback("x", "y");
        composite.on_fallback("x", "z");
        assert_eq!(a.fallbacks.load(Ordering::SeqCst), 2);
        assert_eq!(b.fallbacks.load(Ordering::SeqCst), 2);
    }
}
