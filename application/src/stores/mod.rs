//! Shared mutable state used by the use cases
//!
//! - [`CapabilityRegistry`]: tool capabilities with atomic feedback updates
//! - [`HistoryStore`]: bounded per-key outcome history

pub mod capability_registry;
pub mod history_store;

pub use capability_registry::CapabilityRegistry;
pub use history_store::HistoryStore;
