// src/engine/shutdown.rs

//! Caller-side teardown policy: ask nicely, then kill.
//!
//! The supervisor only offers fire-and-forget termination and liveness
//! probes; this module sequences them.

use std::time::Duration;

use tracing::{info, warn};

use crate::errors::Result;
use crate::exec::{ProcessHandle, ProcessSupervisor};

/// How often liveness is polled while waiting for a runner to go away.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long to wait for the runner to disappear after a forceful kill.
pub const KILL_WAIT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// The runner was already gone or left after the graceful request.
    Graceful,
    /// The runner had to be killed.
    Forced,
    /// The runner was still alive after the forceful kill window.
    StillAlive,
}

/// Poll until the runner is gone or `window` elapsed. Returns whether it is
/// gone. An undetermined probe aborts the wait with an error.
pub async fn wait_gone(
    supervisor: &ProcessSupervisor,
    handle: &ProcessHandle,
    window: Duration,
) -> Result<bool> {
    let deadline = tokio::time::Instant::now() + window;
    loop {
        if !supervisor.check(handle).await? {
            return Ok(true);
        }
        if tokio::time::Instant::now() >= deadline {
            return Ok(false);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Graceful termination, escalated to a forceful kill after `grace`.
pub async fn shutdown(
    supervisor: &ProcessSupervisor,
    handle: &ProcessHandle,
    grace: Duration,
) -> Result<ShutdownOutcome> {
    supervisor.terminate(handle, false)?;
    if wait_gone(supervisor, handle, grace).await? {
        info!(run_id = %handle.run_id(), pid = handle.pid(), "benchmark runner stopped");
        return Ok(ShutdownOutcome::Graceful);
    }

    warn!(
        run_id = %handle.run_id(),
        pid = handle.pid(),
        grace_secs = grace.as_secs(),
        "benchmark runner ignored shutdown request; killing"
    );
    supervisor.terminate(handle, true)?;
    if wait_gone(supervisor, handle, KILL_WAIT).await? {
        Ok(ShutdownOutcome::Forced)
    } else {
        warn!(run_id = %handle.run_id(), pid = handle.pid(), "benchmark runner still alive after kill");
        Ok(ShutdownOutcome::StillAlive)
    }
}
