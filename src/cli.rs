// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `benchrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "benchrun",
    version,
    about = "Launch, monitor and tear down benchmark runner processes.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the benchmark config file (TOML).
    ///
    /// Default: `benchmark.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Override a configuration key, e.g. `--set runner.max-memory=4g`.
    ///
    /// May be repeated; overrides win over the config file.
    #[arg(long = "set", value_name = "KEY=VALUE", global = true)]
    pub overrides: Vec<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BENCHRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Launch a benchmark runner and supervise it until it exits.
    Launch(LaunchArgs),

    /// Print the memory budget a runner would get.
    Budget,

    /// Report whether a process is alive.
    Alive {
        pid: u32,
    },

    /// Terminate a process.
    Kill {
        pid: u32,

        /// Kill unconditionally instead of requesting shutdown.
        #[arg(long)]
        force: bool,
    },

    /// Report whether a TCP port is free.
    Port {
        port: u16,

        #[arg(long, default_value = "localhost")]
        host: String,
    },
}

#[derive(Debug, Clone, Args)]
pub struct LaunchArgs {
    /// Identifier of this benchmark execution.
    #[arg(long, value_name = "ID")]
    pub run_id: String,

    /// Entry point handed to the runtime (e.g. a main class).
    #[arg(long, value_name = "NAME")]
    pub entry_point: String,

    /// Refuse to launch if this localhost port is already taken.
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Seconds to wait after a graceful shutdown request before killing.
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub grace_period: u64,

    /// Build and print the command, but don't launch anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Positional arguments for the runner.
    #[arg(last = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
