//! Capability catalog: the tool id → capability table

use super::entities::ToolCapability;
use std::collections::BTreeMap;

/// Default multiplier applied to a tool's quality score after a success
pub const DEFAULT_SUCCESS_BOOST: f64 = 1.02;

/// Default multiplier applied to a tool's success rate after a failure
pub const DEFAULT_FAILURE_DECAY: f64 = 0.95;

/// Catalog of known tools, ordered by tool id.
///
/// Ordering is deterministic so that planning the same task twice against
/// an unchanged catalog yields the same tool order. Entries are never
/// removed; the only mutations after loading are the two feedback paths.
#[derive(Debug, Clone, Default)]
pub struct CapabilityCatalog {
    tools: BTreeMap<String, ToolCapability>,
}

impl CapabilityCatalog {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Add (or replace) a capability entry (builder pattern)
    pub fn register(mut self, capability: ToolCapability) -> Self {
        self.insert(capability);
        self
    }

    /// Add (or replace) a capability entry
    pub fn insert(&mut self, capability: ToolCapability) {
        self.tools.insert(capability.tool_id.clone(), capability);
    }

    pub fn get(&self, tool_id: &str) -> Option<&ToolCapability> {
        self.tools.get(tool_id)
    }

    pub fn contains(&self, tool_id: &str) -> bool {
        self.tools.contains_key(tool_id)
    }

    /// All capabilities in tool id order
    pub fn all(&self) -> impl Iterator<Item = &ToolCapability> {
        self.tools.values()
    }

    /// All tool ids in order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Keep only the tools for which `keep` returns true
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.tools.retain(|id, _| keep(id));
    }

    /// Multiply the tool's quality score by `boost`, capped at 100.
    ///
    /// Returns the new score, or `None` if the tool is unknown.
    pub fn record_success(&mut self, tool_id: &str, boost: f64) -> Option<f64> {
        let tool = self.tools.get_mut(tool_id)?;
        let score = (tool.performance.quality_score * boost).min(100.0);
        tool.performance.quality_score = score;
        Some(score)
    }

    /// Multiply the tool's success rate by `decay`.
    ///
    /// Returns the new rate, or `None` if the tool is unknown.
    pub fn record_failure(&mut self, tool_id: &str, decay: f64) -> Option<f64> {
        let tool = self.tools.get_mut(tool_id)?;
        let rate = (tool.performance.success_rate * decay).clamp(0.0, 1.0);
        tool.performance.success_rate = rate;
        Some(rate)
    }
}

impl FromIterator<ToolCapability> for CapabilityCatalog {
    fn from_iter<T: IntoIterator<Item = ToolCapability>>(iter: T) -> Self {
        let mut catalog = CapabilityCatalog::new();
        for capability in iter {
            catalog.insert(capability);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::entities::PerformanceStats;

    fn catalog() -> CapabilityCatalog {
        CapabilityCatalog::new()
            .register(
                ToolCapability::new("quality-checker")
                    .with_performance(PerformanceStats::new(400, 0.9, 99.0)),
            )
            .register(
                ToolCapability::new("architecture-mapper")
                    .with_performance(PerformanceStats::new(2500, 0.8, 60.0)),
            )
    }

    #[test]
    fn test_ordered_by_id() {
        let ids: Vec<_> = catalog().ids().map(String::from).collect();
        assert_eq!(ids, vec!["architecture-mapper", "quality-checker"]);
    }

    #[test]
    fn test_record_success_caps_at_100() {
        let mut catalog = catalog();
        let score = catalog
            .record_success("quality-checker", DEFAULT_SUCCESS_BOOST)
            .unwrap();
        assert_eq!(score, 100.0);

        let score = catalog
            .record_success("architecture-mapper", DEFAULT_SUCCESS_BOOST)
            .unwrap();
        assert!((score - 61.2).abs() < 1e-9);
    }

    #[test]
    fn test_record_failure_decays() {
        let mut catalog = catalog();
        let rate = catalog
            .record_failure("architecture-mapper", DEFAULT_FAILURE_DECAY)
            .unwrap();
        assert!((rate - 0.76).abs() < 1e-9);
        assert!(catalog.record_failure("missing", DEFAULT_FAILURE_DECAY).is_none());
    }

    #[test]
    fn test_retain() {
        let mut catalog = catalog();
        catalog.retain(|id| id == "quality-checker");
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains("quality-checker"));
    }
}
