//! In-process tool hub
//!
//! The adapter behind the application's `ToolInvokerPort`: requests travel
//! to per-tool worker tasks over channels and replies come back as raw
//! envelopes that the hub decodes.

mod channel_hub;
mod error;
mod handler;

pub use channel_hub::{ChannelToolHub, ChannelToolHubBuilder, HubSettings};
pub use error::HubError;
pub use handler::{ToolHandler, data_reply, error_reply, execute_reply};
