//! Logging infrastructure: the JSONL lifecycle event log.
//!
//! [`JsonlEventLogger`] writes events either directly or by following a
//! [`LifecycleBus`](crate::events::LifecycleBus) subscription.

mod jsonl_logger;

pub use jsonl_logger::JsonlEventLogger;
