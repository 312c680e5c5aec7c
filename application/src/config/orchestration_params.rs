//! Orchestration parameters: analysis, planning and execution tunables.
//!
//! [`OrchestrationParams`] groups every threshold the use cases consult.
//! Defaults reproduce the documented behavior; the infrastructure layer
//! overrides them from the `[orchestration]` config section.

use conductor_domain::{ResolverSettings, SpeedPreference};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Stage-timeout multipliers per speed preference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedMultipliers {
    pub fast: f64,
    pub balanced: f64,
    pub thorough: f64,
    /// Used when the task states no speed preference
    pub unset: f64,
}

impl Default for SpeedMultipliers {
    fn default() -> Self {
        Self {
            fast: 0.8,
            balanced: 1.2,
            thorough: 2.0,
            unset: 1.5,
        }
    }
}

impl SpeedMultipliers {
    pub fn for_preference(&self, speed: Option<SpeedPreference>) -> f64 {
        match speed {
            Some(SpeedPreference::Fast) => self.fast,
            Some(SpeedPreference::Balanced) => self.balanced,
            Some(SpeedPreference::Thorough) => self.thorough,
            None => self.unset,
        }
    }
}

/// Orchestration tunables.
///
/// # Thresholds
///
/// | Field | Default | Used by |
/// |-------|---------|---------|
/// | `input_size_threshold` | 10,000 | analyzer (complexity +1) |
/// | `large_input_threshold` | 50,000 | analyzer (complexity +1) |
/// | `complexity_quality_threshold` | 85 | analyzer (complexity +1) |
/// | `complexity_confidence_threshold` | 0.9 | analyzer (complexity +1) |
/// | `prior_results_threshold` | 3 | analyzer (complexity +1) |
/// | `critical_quality_threshold` | 90 | analyzer constraints, consensus mode |
/// | `fast_latency_ms` | 2,000 | planner (prefer-fast-tools) |
/// | `quality_floor` | 85 | planner (require-high-quality-tools) |
/// | `retry_quality_threshold` | 80 | planner (retry attempts) |
/// | `fallback_similarity` | 0.5 | planner (fallback tool) |
/// | `history_frequency` | 0.7 | analyzer (history preferences) |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestrationParams {
    // ==================== Analysis ====================
    /// Serialized input length (characters) above which complexity grows
    pub input_size_threshold: usize,
    /// Second, larger size threshold
    pub large_input_threshold: usize,
    pub complexity_quality_threshold: u8,
    pub complexity_confidence_threshold: f64,
    pub prior_results_threshold: usize,
    /// Quality target above which high-quality tools and consensus are required
    pub critical_quality_threshold: u8,
    /// Share of successful runs a tool must appear in to become preferred
    pub history_frequency: f64,

    // ==================== Planning ====================
    pub fast_latency_ms: u64,
    pub quality_floor: f64,
    pub retry_quality_threshold: u8,
    pub high_quality_attempts: u32,
    pub default_attempts: u32,
    /// Minimum strength overlap for a fallback tool
    pub fallback_similarity: f64,
    pub speed_multipliers: SpeedMultipliers,
    pub min_stage_timeout_ms: u64,
    /// Tools kept by the fast alternative
    pub fast_alternative_tools: usize,
    /// Extra tools added by the thorough alternative
    pub thorough_extra_tools: usize,

    // ==================== Execution ====================
    pub backoff_base_ms: u64,
    /// Quality multiplier applied on success (capped at 100)
    pub success_boost: f64,
    /// Success-rate multiplier applied on failure
    pub failure_decay: f64,

    // ==================== Consensus ====================
    pub decisive_share: f64,
    pub default_tool_quality: f64,

    // ==================== History ====================
    pub history_capacity: usize,
}

impl Default for OrchestrationParams {
    fn default() -> Self {
        Self {
            input_size_threshold: 10_000,
            large_input_threshold: 50_000,
            complexity_quality_threshold: 85,
            complexity_confidence_threshold: 0.9,
            prior_results_threshold: 3,
            critical_quality_threshold: 90,
            history_frequency: 0.7,
            fast_latency_ms: 2_000,
            quality_floor: 85.0,
            retry_quality_threshold: 80,
            high_quality_attempts: 3,
            default_attempts: 2,
            fallback_similarity: 0.5,
            speed_multipliers: SpeedMultipliers::default(),
            min_stage_timeout_ms: 1_000,
            fast_alternative_tools: 2,
            thorough_extra_tools: 2,
            backoff_base_ms: 100,
            success_boost: 1.02,
            failure_decay: 0.95,
            decisive_share: 0.7,
            default_tool_quality: 50.0,
            history_capacity: 100,
        }
    }
}

impl OrchestrationParams {
    // ==================== Builder Methods ====================

    pub fn with_backoff_base_ms(mut self, ms: u64) -> Self {
        self.backoff_base_ms = ms;
        self
    }

    pub fn with_min_stage_timeout_ms(mut self, ms: u64) -> Self {
        self.min_stage_timeout_ms = ms;
        self
    }

    pub fn with_size_thresholds(mut self, small: usize, large: usize) -> Self {
        self.input_size_threshold = small;
        self.large_input_threshold = large;
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    // ==================== Derived Values ====================

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    /// Resolver settings derived from the consensus tunables
    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            decisive_share: self.decisive_share,
            default_quality: self.default_tool_quality,
            ..ResolverSettings::default()
        }
    }
}
