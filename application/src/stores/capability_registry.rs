//! Capability registry
//!
//! Lock-guarded [`CapabilityCatalog`]. Planning reads clones; the executor
//! applies success/failure feedback as a single read-modify-write under
//! the write lock so concurrent stages never lose an update.

use conductor_domain::{CapabilityCatalog, ToolCapability};
use conductor_domain::capability::catalog::{DEFAULT_FAILURE_DECAY, DEFAULT_SUCCESS_BOOST};
use std::sync::{PoisonError, RwLock};
use tracing::debug;

pub struct CapabilityRegistry {
    catalog: RwLock<CapabilityCatalog>,
    success_boost: f64,
    failure_decay: f64,
}

impl CapabilityRegistry {
    pub fn new(catalog: CapabilityCatalog) -> Self {
        Self {
            catalog: RwLock::new(catalog),
            success_boost: DEFAULT_SUCCESS_BOOST,
            failure_decay: DEFAULT_FAILURE_DECAY,
        }
    }

    pub fn with_feedback_factors(mut self, success_boost: f64, failure_decay: f64) -> Self {
        self.success_boost = success_boost;
        self.failure_decay = failure_decay;
        self
    }

    pub fn get(&self, tool_id: &str) -> Option<ToolCapability> {
        self.read(|c| c.get(tool_id).cloned())
    }

    /// All capabilities, ordered by tool id
    pub fn all(&self) -> Vec<ToolCapability> {
        self.read(|c| c.all().cloned().collect())
    }

    pub fn contains(&self, tool_id: &str) -> bool {
        self.read(|c| c.contains(tool_id))
    }

    pub fn ids(&self) -> Vec<String> {
        self.read(|c| c.ids().map(str::to_string).collect())
    }

    pub fn len(&self) -> usize {
        self.read(|c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.read(|c| c.is_empty())
    }

    pub fn quality_of(&self, tool_id: &str) -> Option<f64> {
        self.read(|c| c.get(tool_id).map(|t| t.performance.quality_score))
    }

    /// Consistent copy of the whole catalog
    pub fn snapshot(&self) -> CapabilityCatalog {
        self.read(|c| c.clone())
    }

    /// Raise a tool's quality score after a successful invocation
    pub fn record_success(&self, tool_id: &str) -> Option<f64> {
        let updated = self.write(|c| c.record_success(tool_id, self.success_boost));
        if let Some(quality) = updated {
            debug!(tool = %tool_id, quality, "Recorded tool success");
        }
        updated
    }

    /// Decay a tool's success rate after it exhausted its attempts
    pub fn record_failure(&self, tool_id: &str) -> Option<f64> {
        let updated = self.write(|c| c.record_failure(tool_id, self.failure_decay));
        if let Some(rate) = updated {
            debug!(tool = %tool_id, success_rate = rate, "Recorded tool failure");
        }
        updated
    }

    fn read<T>(&self, f: impl FnOnce(&CapabilityCatalog) -> T) -> T {
        let guard = self.catalog.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write<T>(&self, f: impl FnOnce(&mut CapabilityCatalog) -> T) -> T {
        let mut guard = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new(CapabilityCatalog::new())
    }
}
