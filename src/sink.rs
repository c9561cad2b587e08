// src/sink.rs

//! Destination for runner output lines.

use std::fmt::Debug;

use tracing::info;

use crate::types::RunId;

/// Append-only line sink keyed by run id.
///
/// Appends are best-effort: there is no backpressure and no error path.
pub trait LogSink: Send + Sync + Debug {
    fn append(&self, run_id: &RunId, line: &str);
}

/// Forwards runner lines into the `tracing` pipeline under the
/// `benchrun::runner` target.
#[derive(Debug, Clone, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn append(&self, run_id: &RunId, line: &str) {
        info!(target: "benchrun::runner", run_id = %run_id, "[Runner {}] => {}", run_id, line);
    }
}
