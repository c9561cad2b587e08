// src/types.rs

use std::fmt;

/// Identifier of one benchmark execution.
///
/// Tags every forwarded runner line and the drain task that produces it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(String);

impl RunId {
    pub fn new(id: impl Into<String>) -> Self {
        RunId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RunId {
    fn from(s: &str) -> Self {
        RunId(s.to_string())
    }
}

impl From<String> for RunId {
    fn from(s: String) -> Self {
        RunId(s)
    }
}

/// Lifecycle state of a launched runner process.
///
/// - `Starting`: registered, spawn in progress.
/// - `Running`: spawned; output is being drained.
/// - `Exited`: output closed and the process has been reaped.
/// - `Unknown`: a liveness probe could not tell. Callers treat this as fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessStatus {
    #[default]
    Starting,
    Running,
    Exited,
    Unknown,
}

impl ProcessStatus {
    /// Whether a new launch for the same run id is allowed.
    pub fn is_terminal(self) -> bool {
        matches!(self, ProcessStatus::Exited | ProcessStatus::Unknown)
    }
}

/// Result of a zero-effect liveness probe against a pid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    Dead,
    Undetermined(String),
}
