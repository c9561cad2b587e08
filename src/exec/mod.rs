// src/exec/mod.rs

//! Process execution layer.
//!
//! This module owns the runner process once it exists, using
//! `tokio::process::Command`:
//!
//! - [`supervisor`] spawns runners, keeps the one-runner-per-run-id registry
//!   and exposes terminate / liveness operations.
//! - [`monitor`] runs the per-runner drain task that forwards output to the
//!   log sink and reaps the process.
//! - [`output`] builds the combined stdout + stderr pipe.
//! - [`platform`] hides how signals and probes are delivered on this host.

pub mod monitor;
pub mod output;
pub mod platform;
pub mod supervisor;

pub use monitor::{DrainHandle, DrainReport, OutputMonitor};
pub use platform::TerminationAdapter;
pub use supervisor::{ProcessHandle, ProcessSupervisor};
