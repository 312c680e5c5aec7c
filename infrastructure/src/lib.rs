//! Infrastructure layer for tool-conductor
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the channel-based tool hub with its built-in
//! analysis tools, the lifecycle broadcast bus and JSONL event log, and
//! configuration file loading.

pub mod analyzers;
pub mod capabilities;
pub mod config;
pub mod events;
pub mod hub;
pub mod logging;

// Re-export commonly used types
pub use analyzers::builtin_handlers;
pub use capabilities::{SEED_TOOL_IDS, seed_catalog};
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileHubConfig, FileLoggingConfig,
    FileToolConfig,
};
pub use events::LifecycleBus;
pub use hub::{ChannelToolHub, HubError, HubSettings, ToolHandler};
pub use logging::JsonlEventLogger;
