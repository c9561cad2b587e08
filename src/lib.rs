// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod host;
pub mod launch;
pub mod logging;
pub mod net;
pub mod sink;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info, warn};

use crate::cli::{CliArgs, CliCommand, LaunchArgs};
use crate::config::{ConfigLookup, LayeredConfig, MapConfig, load_or_default};
use crate::engine::{Launcher, ShutdownOutcome, shutdown};
use crate::errors::BenchrunError;
use crate::exec::{DrainReport, ProcessSupervisor};
use crate::host::{HostRuntime, SystemHost};
use crate::launch::{CommandSpec, ResourceBudget};
use crate::net::PortProbe;
use crate::sink::TracingSink;
use crate::types::RunId;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file + `--set` overrides)
/// - the host facts provider
/// - the launcher / supervisor for the chosen subcommand
/// - Ctrl-C handling while a runner is supervised
pub async fn run(args: CliArgs) -> Result<()> {
    let config = build_config(&args)?;
    let host: Arc<dyn HostRuntime> = Arc::new(SystemHost::new());

    match args.command {
        CliCommand::Launch(launch) => run_launch(host, config, launch).await,
        CliCommand::Budget => {
            let launcher = Launcher::new(host, config, Arc::new(TracingSink));
            print_budget(&launcher.budget())
        }
        CliCommand::Alive { pid } => {
            let supervisor = ProcessSupervisor::new(Arc::new(TracingSink));
            let alive = supervisor.is_alive(pid).await?;
            println!("{pid} {}", if alive { "alive" } else { "dead" });
            Ok(())
        }
        CliCommand::Kill { pid, force } => {
            let supervisor = ProcessSupervisor::new(Arc::new(TracingSink));
            supervisor.kill_pid(pid, force)?;
            println!("{} sent to {pid}", if force { "kill" } else { "terminate" });
            Ok(())
        }
        CliCommand::Port { port, host } => {
            let probe = PortProbe::from_config(config.as_ref());
            let free = probe.is_available(&host, port).await;
            println!("{host}:{port} {}", if free { "available" } else { "in use" });
            Ok(())
        }
    }
}

/// `--set` overrides on top of the config file.
fn build_config(args: &CliArgs) -> Result<Arc<dyn ConfigLookup>> {
    let file = load_or_default(args.config.as_deref())
        .with_context(|| format!("loading configuration {:?}", args.config))?;
    let overrides = MapConfig::from_pairs(&args.overrides).map_err(BenchrunError::ConfigError)?;

    if !overrides.is_empty() {
        debug!(count = args.overrides.len(), "applying configuration overrides");
    }

    Ok(Arc::new(LayeredConfig::new().push(overrides).push(file)))
}

async fn run_launch(
    host: Arc<dyn HostRuntime>,
    config: Arc<dyn ConfigLookup>,
    args: LaunchArgs,
) -> Result<()> {
    let launcher = Launcher::new(host, config, Arc::new(TracingSink));

    if args.dry_run {
        let (budget, spec) = launcher.prepare(&args.entry_point, &args.args);
        print_dry_run(&args.run_id, &budget, &spec);
        return Ok(());
    }

    if let Some(port) = args.port {
        launcher.ensure_port_free(port).await?;
    }

    let run_id = RunId::new(args.run_id);
    let mut handle = launcher.launch(run_id.clone(), &args.entry_point, &args.args)?;
    let drain = handle
        .take_drain()
        .ok_or_else(|| anyhow!("drain task for run {run_id} already taken"))?;

    let drained = drain.join();
    tokio::pin!(drained);

    let report = tokio::select! {
        report = &mut drained => report?,
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for Ctrl+C")?;
            info!(run_id = %run_id, "Ctrl+C received; stopping benchmark runner");

            let grace = Duration::from_secs(args.grace_period);
            match shutdown(launcher.supervisor(), &handle, grace).await? {
                ShutdownOutcome::StillAlive => {
                    bail!("benchmark runner {} (pid {}) could not be stopped", run_id, handle.pid())
                }
                outcome => debug!(?outcome, "shutdown finished"),
            }
            drained.await?
        }
    };

    finish(report)
}

fn finish(report: DrainReport) -> Result<()> {
    if let Some(err) = &report.read_error {
        warn!(run_id = %report.run_id, error = %err, "runner output was cut short");
    }

    match report.exit_code {
        Some(0) => {
            info!(run_id = %report.run_id, lines = report.lines, "benchmark run finished");
            Ok(())
        }
        Some(code) => bail!("benchmark runner for run {} exited with code {code}", report.run_id),
        None => bail!("benchmark runner for run {} was terminated by a signal", report.run_id),
    }
}

/// The budget rendered as TOML.
fn print_budget(budget: &ResourceBudget) -> Result<()> {
    let rendered = toml::to_string(budget).context("rendering budget")?;
    print!("{rendered}");
    Ok(())
}

/// Dry-run output: budget, command line and environment overlay.
fn print_dry_run(run_id: &str, budget: &ResourceBudget, spec: &CommandSpec) {
    println!("benchrun dry-run (run {run_id})");
    println!("  budget: {} MB ({})", budget.limit_mb, budget.source);
    println!("  command: {}", spec.command_line());
    for (key, value) in &spec.env {
        println!("  env: {key}={value}");
    }

    debug!("dry-run complete (no execution)");
}
