//! CLI entrypoint for tool-conductor
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use conductor_application::{
    CompositeLifecycle, ExecutePlanError, LifecycleNotifier, NoLifecycle, Orchestrator,
    OrchestratorError, ToolInvokerPort,
};
use conductor_domain::{CapabilityCatalog, TaskProfiles};
use conductor_infrastructure::{
    ChannelToolHub, ConfigLoader, FileConfig, HubSettings, JsonlEventLogger, LifecycleBus,
    builtin_handlers, seed_catalog,
};
use conductor_presentation::{
    Cli, Command, ConsoleFormatter, JsonFormatter, OutputFormat, OutputFormatter,
    ProgressReporter,
};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(ExitCode::SUCCESS);
    }

    let config = ConfigLoader::load(cli.config.as_ref())
        .map_err(|e| anyhow!("Failed to load configuration: {e}"))?;
    config.validate().context("Invalid configuration")?;

    // Keep the guard alive so the file writer flushes on exit
    let _log_guard = init_tracing(cli.verbose, config.logging.log_dir.as_deref());

    info!("Starting tool-conductor");

    let Some(command) = &cli.command else {
        bail!("No command given. Use `plan` or `run` (see --help).");
    };
    let task = command.task_args().build_task()?;

    // === Dependency Injection ===
    // Tool hub with the built-in analyzers
    let mut builder = ChannelToolHub::builder(HubSettings::from(&config.hub));
    for handler in builtin_handlers().context("Failed to compile built-in analyzers")? {
        builder = builder.register(handler)?;
    }
    let hub = Arc::new(builder.start());

    let orchestrator = Orchestrator::new(
        hub.clone(),
        served_catalog(&config, hub.as_ref()),
        TaskProfiles::default(),
        config.orchestration.clone(),
    );

    let formatter: &dyn OutputFormatter = match cli.output {
        OutputFormat::Text => &ConsoleFormatter,
        OutputFormat::Json => &JsonFormatter,
    };

    let exit = match command {
        Command::Plan(_) => {
            let plan = orchestrator.create_plan(task);
            println!("{}", formatter.format_plan(&plan));
            orchestrator.discard_plan(&plan.id);
            ExitCode::SUCCESS
        }
        Command::Run(_) => {
            let bus = LifecycleBus::default();
            let event_log = config
                .logging
                .event_log
                .as_deref()
                .and_then(|path| match JsonlEventLogger::create(path) {
                    Ok(logger) => Some(logger),
                    Err(e) => {
                        warn!("Could not open event log {}: {}", path.display(), e);
                        None
                    }
                })
                .map(|logger| Arc::new(logger).follow(bus.subscribe()));

            let progress: Box<dyn LifecycleNotifier> = if cli.quiet {
                Box::new(NoLifecycle)
            } else {
                Box::new(ProgressReporter::new())
            };
            let lifecycle = CompositeLifecycle::new(vec![&*progress, &bus]);

            let plan = orchestrator.create_plan(task);
            let outcome = orchestrator.execute_with_progress(plan, &lifecycle).await;

            drop(lifecycle);
            drop(bus);
            if let Some(handle) = event_log {
                handle.await.context("Event log task panicked")?;
            }

            match outcome {
                Ok(result) => {
                    println!("{}", formatter.format_result(&result));
                    if result.success {
                        ExitCode::SUCCESS
                    } else {
                        ExitCode::FAILURE
                    }
                }
                Err(err) => {
                    let OrchestratorError::Execution(ExecutePlanError::RecoveryFailed {
                        result,
                        ..
                    }) = &err;
                    println!("{}", formatter.format_result(result));
                    eprintln!("Error: {err}");
                    ExitCode::FAILURE
                }
            }
        }
    };

    drop(orchestrator);
    if let Ok(hub) = Arc::try_unwrap(hub) {
        hub.shutdown().await;
    }

    Ok(exit)
}

/// Seed table plus `[[tools]]` entries, restricted to tools the hub serves
fn served_catalog(config: &FileConfig, hub: &ChannelToolHub) -> CapabilityCatalog {
    let mut catalog = config.apply_tools(seed_catalog());
    let unserved: Vec<String> = catalog
        .ids()
        .filter(|id| !hub.has_tool(id))
        .map(str::to_string)
        .collect();
    catalog.retain(|id| hub.has_tool(id));
    debug!(?unserved, served = catalog.len(), "Capability registry restricted to served tools");
    catalog
}

/// Console logging by verbosity, plus a daily rolling file when configured
fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let console = fmt::layer().with_target(false).with_writer(std::io::stderr);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "tool-conductor.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(EnvFilter::new(level))
                .with(console)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(EnvFilter::new(level))
                .with(console)
                .init();
            None
        }
    }
}
