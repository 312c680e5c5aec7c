//! Capability domain
//!
//! Describes what each analysis tool is good (and bad) at, how fast and how
//! reliable it has been, and which other tools it must run after.
//!
//! ```text
//! ┌────────────────────┐      ┌──────────────────────┐
//! │ CapabilityCatalog  │─────▶│ ToolCapability       │
//! │ (tool id → entry)  │      │  strengths/weakness  │
//! └────────────────────┘      │  PerformanceStats    │
//!                             │  specializations     │
//!                             │  depends_on          │
//!                             └──────────────────────┘
//! ```
//!
//! The catalog is plain data. Shared, lock-guarded access lives in the
//! application layer's `CapabilityRegistry`, which is the only place the
//! feedback mutations ([`CapabilityCatalog::record_success`] and
//! [`CapabilityCatalog::record_failure`]) are called from.

pub mod catalog;
pub mod entities;

pub use catalog::CapabilityCatalog;
pub use entities::{PerformanceStats, ToolCapability};
