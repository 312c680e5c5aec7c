//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Tuning parameters deserialize straight into the application's
//! [`OrchestrationParams`].

use conductor_application::OrchestrationParams;
use conductor_domain::{CapabilityCatalog, PerformanceStats, ToolCapability};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("hub.call_timeout_ms cannot be 0")]
    InvalidCallTimeout,

    #[error("hub.channel_capacity cannot be 0")]
    InvalidChannelCapacity,

    #[error("orchestration.min_stage_timeout_ms cannot be 0")]
    InvalidStageTimeout,

    #[error("orchestration.{name} must be within {range}, got {value}")]
    OutOfRange {
        name: &'static str,
        range: &'static str,
        value: f64,
    },

    #[error(
        "orchestration.large_input_threshold ({large}) must not be below input_size_threshold ({small})"
    )]
    InvertedSizeThresholds { small: usize, large: usize },

    #[error("tool id cannot be empty")]
    EmptyToolId,
}

/// Raw hub configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileHubConfig {
    /// Per-call timeout for a single tool request
    pub call_timeout_ms: u64,
    /// Bounded queue length of each tool's request channel
    pub channel_capacity: usize,
}

impl Default for FileHubConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: 5_000,
            channel_capacity: 32,
        }
    }
}

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL lifecycle event log; disabled when unset
    pub event_log: Option<PathBuf>,
    /// Directory for the daily rolling tracing log; disabled when unset
    pub log_dir: Option<PathBuf>,
}

/// A `[[tools]]` entry
///
/// An entry whose id matches a seeded tool replaces it; any other id
/// extends the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileToolConfig {
    pub id: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub specializations: Vec<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default = "default_latency")]
    pub mean_latency_ms: u64,
    #[serde(default = "default_success_rate")]
    pub success_rate: f64,
    #[serde(default = "default_quality")]
    pub quality_score: f64,
}

fn default_latency() -> u64 {
    1_000
}

fn default_success_rate() -> f64 {
    0.9
}

fn default_quality() -> f64 {
    50.0
}

impl FileToolConfig {
    pub fn to_capability(&self) -> ToolCapability {
        ToolCapability::new(self.id.clone())
            .with_strengths(self.strengths.iter().cloned())
            .with_weaknesses(self.weaknesses.iter().cloned())
            .with_specializations(self.specializations.iter().cloned())
            .with_dependencies(self.depends_on.iter().cloned())
            .with_performance(PerformanceStats::new(
                self.mean_latency_ms,
                self.success_rate,
                self.quality_score,
            ))
    }
}

/// Complete file configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub orchestration: OrchestrationParams,
    pub hub: FileHubConfig,
    pub logging: FileLoggingConfig,
    pub tools: Vec<FileToolConfig>,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.hub.call_timeout_ms == 0 {
            return Err(ConfigValidationError::InvalidCallTimeout);
        }
        if self.hub.channel_capacity == 0 {
            return Err(ConfigValidationError::InvalidChannelCapacity);
        }

        let params = &self.orchestration;
        if params.min_stage_timeout_ms == 0 {
            return Err(ConfigValidationError::InvalidStageTimeout);
        }
        if params.large_input_threshold < params.input_size_threshold {
            return Err(ConfigValidationError::InvertedSizeThresholds {
                small: params.input_size_threshold,
                large: params.large_input_threshold,
            });
        }

        check_range("complexity_quality_threshold", params.complexity_quality_threshold as f64, 0.0, 100.0)?;
        check_range("critical_quality_threshold", params.critical_quality_threshold as f64, 0.0, 100.0)?;
        check_range("retry_quality_threshold", params.retry_quality_threshold as f64, 0.0, 100.0)?;
        check_range("quality_floor", params.quality_floor, 0.0, 100.0)?;
        check_range("default_tool_quality", params.default_tool_quality, 0.0, 100.0)?;
        check_range("complexity_confidence_threshold", params.complexity_confidence_threshold, 0.0, 1.0)?;
        check_range("history_frequency", params.history_frequency, 0.0, 1.0)?;
        check_range("fallback_similarity", params.fallback_similarity, 0.0, 1.0)?;
        check_range("decisive_share", params.decisive_share, 0.0, 1.0)?;
        check_range("failure_decay", params.failure_decay, 0.0, 1.0)?;

        if self.tools.iter().any(|tool| tool.id.trim().is_empty()) {
            return Err(ConfigValidationError::EmptyToolId);
        }

        Ok(())
    }

    /// Apply `[[tools]]` entries on top of a seed catalog
    pub fn apply_tools(&self, mut catalog: CapabilityCatalog) -> CapabilityCatalog {
        for tool in &self.tools {
            catalog.insert(tool.to_capability());
        }
        catalog
    }
}

fn check_range(
    name: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ConfigValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigValidationError::OutOfRange {
            name,
            range: if max > 1.0 { "[0, 100]" } else { "[0, 1]" },
            value,
        })
    }
}
