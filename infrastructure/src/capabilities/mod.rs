//! Built-in capability table

mod seed;

pub use seed::{SEED_TOOL_IDS, seed_catalog};
