// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Only conditions that must abort a benchmark run are surfaced here. Bad or
//! missing configuration values never reach the caller: the component that
//! reads them logs a warning and falls back to its default.

use thiserror::Error;

use crate::types::RunId;

#[derive(Error, Debug)]
pub enum BenchrunError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to spawn benchmark runner `{program}`: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Liveness of process {pid} could not be determined: {reason}")]
    LivenessUndetermined { pid: u32, reason: String },

    #[error("Run {0} already has a live benchmark runner")]
    AlreadyRunning(RunId),

    #[error("Failed to terminate process {pid}: {reason}")]
    TerminateFailed { pid: u32, reason: String },

    #[error("Port {port} on {host} is already in use")]
    PortInUse { host: String, port: u16 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BenchrunError {
    /// True for errors that abort the whole benchmark run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BenchrunError::SpawnFailed { .. } | BenchrunError::LivenessUndetermined { .. }
        )
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, BenchrunError>;
