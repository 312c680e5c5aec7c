//! Presentation layer for tool-conductor
//!
//! This crate contains CLI definitions, output formatters
//! and progress reporters.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, OutputFormat, TaskArgs};
pub use cli::task_input::TaskInputError;
pub use output::console::ConsoleFormatter;
pub use output::formatter::{JsonFormatter, OutputFormatter};
pub use progress::reporter::{ProgressReporter, SimpleProgress};
