//! Lifecycle broadcast bus
//!
//! [`LifecycleBus`] implements the application's `LifecycleNotifier` port by
//! publishing owned [`LifecycleEvent`](conductor_application::LifecycleEvent)s
//! on a `tokio::sync::broadcast` channel. Any number of subscribers (the
//! JSONL event log, for instance) can follow a run without the executor
//! knowing about them.

mod lifecycle_bus;

pub use lifecycle_bus::{DEFAULT_BUS_CAPACITY, LifecycleBus};
