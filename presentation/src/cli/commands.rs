//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use conductor_domain::{DepthPreference, SpeedPreference, TaskType};
use std::path::PathBuf;

/// Output format for plans and results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

/// CLI arguments for tool-conductor
#[derive(Parser, Debug)]
#[command(name = "tool-conductor")]
#[command(author, version, about = "Plan and run multi-tool analysis tasks")]
#[command(long_about = r#"
tool-conductor decomposes a task into stages of analysis tools, runs them
with retries, fallbacks and consensus, and reports what it learned.

A task comes from a JSON file or is built inline from --type and --input:

  {"id": "t-1", "type": "security", "input": "...", "requirements": {"quality": 95}}

Configuration files are loaded from (in priority order):
1. --config <path>        Explicit config file
2. ./conductor.toml       Project-level config
3. ~/.config/tool-conductor/config.toml   Global config

Example:
  tool-conductor plan task.json
  tool-conductor run --type security --quality 95 --input-file src/auth.rs
  tool-conductor -o json run task.json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build and print an execution plan without running it
    Plan(TaskArgs),
    /// Plan and execute a task
    Run(TaskArgs),
}

impl Command {
    pub fn task_args(&self) -> &TaskArgs {
        match self {
            Command::Plan(args) | Command::Run(args) => args,
        }
    }
}

/// Where the task comes from, plus inline overrides
#[derive(Args, Debug, Default, Clone)]
pub struct TaskArgs {
    /// JSON task file
    #[arg(value_name = "TASK_FILE")]
    pub file: Option<PathBuf>,

    /// Task type (analysis, generation, refactoring, security, testing)
    #[arg(long = "type", value_name = "TYPE")]
    pub task_type: Option<TaskType>,

    /// Task id for inline tasks
    #[arg(long, value_name = "ID")]
    pub id: Option<String>,

    /// Quality target (0-100)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub quality: Option<u8>,

    /// Speed preference (fast, balanced, thorough)
    #[arg(long, value_name = "SPEED")]
    pub speed: Option<SpeedPreference>,

    /// Depth preference (surface, standard, deep)
    #[arg(long, value_name = "DEPTH")]
    pub depth: Option<DepthPreference>,

    /// Minimum acceptable confidence (0.0-1.0)
    #[arg(long, value_name = "C")]
    pub min_confidence: Option<f64>,

    /// Input text handed to every tool
    #[arg(long, value_name = "TEXT", conflicts_with = "input_file")]
    pub input: Option<String>,

    /// Read the input text from a file
    #[arg(long, value_name = "PATH")]
    pub input_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_file() {
        let cli = Cli::parse_from(["tool-conductor", "-o", "json", "run", "task.json"]);
        assert_eq!(cli.output, OutputFormat::Json);
        let Some(Command::Run(args)) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.file, Some(PathBuf::from("task.json")));
    }

    #[test]
    fn test_parse_inline_task() {
        let cli = Cli::parse_from([
            "tool-conductor",
            "plan",
            "--type",
            "security",
            "--quality",
            "95",
            "--speed",
            "fast",
            "--input",
            "eval(x)",
            "-vv",
        ]);
        assert_eq!(cli.verbose, 2);
        let args = cli.command.unwrap().task_args().clone();
        assert_eq!(args.task_type, Some(TaskType::Security));
        assert_eq!(args.quality, Some(95));
        assert_eq!(args.speed, Some(SpeedPreference::Fast));
        assert_eq!(args.input.as_deref(), Some("eval(x)"));
    }

    #[test]
    fn test_quality_out_of_range_rejected() {
        let result = Cli::try_parse_from(["tool-conductor", "plan", "--quality", "150"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_show_config_without_command() {
        let cli = Cli::parse_from(["tool-conductor", "--show-config"]);
        assert!(cli.show_config);
        assert!(cli.command.is_none());
    }
}
