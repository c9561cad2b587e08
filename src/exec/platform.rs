// src/exec/platform.rs

//! Platform termination adapter.
//!
//! Sending signals and probing liveness differ between hosts:
//!
//! - `PosixSignal` talks to the kernel directly through `kill(2)`
//!   (`SIGTERM`, `SIGKILL`, and signal `0` for probing).
//! - `TaskUtility` shells out to the platform task utilities
//!   (`taskkill`, `tasklist`).
//!
//! The variant is chosen once, when the supervisor is built.

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::errors::{BenchrunError, Result};
use crate::types::Liveness;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationAdapter {
    PosixSignal,
    TaskUtility,
}

impl TerminationAdapter {
    /// Pick the adapter for the host this binary was built for.
    pub fn detect() -> Self {
        if cfg!(unix) {
            TerminationAdapter::PosixSignal
        } else {
            TerminationAdapter::TaskUtility
        }
    }

    /// Request termination of `pid`. Fire-and-forget: the caller polls
    /// liveness to learn when the process is gone.
    ///
    /// Returns `Ok(())` when the process no longer exists.
    pub fn terminate(self, pid: u32, forceful: bool) -> Result<()> {
        match self {
            TerminationAdapter::PosixSignal => posix::terminate(pid, forceful),
            TerminationAdapter::TaskUtility => task_utility_terminate(pid, forceful),
        }
    }

    /// Zero-effect liveness probe of `pid`.
    pub async fn probe(self, pid: u32) -> Liveness {
        match self {
            TerminationAdapter::PosixSignal => posix::probe(pid),
            TerminationAdapter::TaskUtility => task_utility_probe(pid).await,
        }
    }
}

#[cfg(unix)]
mod posix {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;
    use tracing::{debug, warn};

    use crate::errors::{BenchrunError, Result};
    use crate::types::Liveness;

    fn to_pid(pid: u32) -> std::result::Result<Pid, String> {
        let raw = i32::try_from(pid).map_err(|_| format!("pid {pid} out of range"))?;
        if raw <= 0 {
            // 0 and negatives address process groups, never a single runner.
            return Err(format!("refusing to signal pid {pid}"));
        }
        Ok(Pid::from_raw(raw))
    }

    pub(super) fn terminate(pid: u32, forceful: bool) -> Result<()> {
        let target = to_pid(pid).map_err(|reason| BenchrunError::TerminateFailed { pid, reason })?;
        let signal = if forceful { Signal::SIGKILL } else { Signal::SIGTERM };

        if forceful {
            warn!(pid, "terminating process forcibly ({signal})");
        } else {
            debug!(pid, "requesting process shutdown ({signal})");
        }

        match kill(target, signal) {
            Ok(()) => Ok(()),
            Err(Errno::ESRCH) => {
                debug!(pid, "process already gone");
                Ok(())
            }
            Err(e) => Err(BenchrunError::TerminateFailed {
                pid,
                reason: e.to_string(),
            }),
        }
    }

    pub(super) fn probe(pid: u32) -> Liveness {
        let target = match to_pid(pid) {
            Ok(p) => p,
            Err(reason) => return Liveness::Undetermined(reason),
        };

        match kill(target, None) {
            Ok(()) => Liveness::Alive,
            Err(Errno::ESRCH) => Liveness::Dead,
            Err(e) => Liveness::Undetermined(e.to_string()),
        }
    }
}

#[cfg(not(unix))]
mod posix {
    use crate::errors::{BenchrunError, Result};
    use crate::types::Liveness;

    pub(super) fn terminate(pid: u32, _forceful: bool) -> Result<()> {
        Err(BenchrunError::TerminateFailed {
            pid,
            reason: "POSIX signals are not available on this platform".to_string(),
        })
    }

    pub(super) fn probe(_pid: u32) -> Liveness {
        Liveness::Undetermined("POSIX signals are not available on this platform".to_string())
    }
}

fn task_utility_terminate(pid: u32, forceful: bool) -> Result<()> {
    let mut cmd = Command::new("taskkill");
    if forceful {
        cmd.arg("/F");
    }
    cmd.arg("/PID").arg(pid.to_string());
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    if forceful {
        warn!(pid, "executing \"taskkill /F /PID {pid}\"");
    } else {
        debug!(pid, "executing \"taskkill /PID {pid}\"");
    }

    // Spawned and left alone; tokio reaps the utility in the background.
    cmd.spawn()
        .map(|_child| ())
        .map_err(|e| BenchrunError::TerminateFailed {
            pid,
            reason: format!("failed to run taskkill: {e}"),
        })
}

async fn task_utility_probe(pid: u32) -> Liveness {
    let output = Command::new("tasklist")
        .arg("/FI")
        .arg(format!("PID eq {pid}"))
        .arg("/FO")
        .arg("CSV")
        .arg("/NH")
        .stdin(Stdio::null())
        .output()
        .await;

    match output {
        Ok(out) if out.status.success() => {
            let stdout = String::from_utf8_lossy(&out.stdout);
            if tasklist_lists_pid(&stdout, pid) {
                Liveness::Alive
            } else {
                Liveness::Dead
            }
        }
        Ok(out) => Liveness::Undetermined(format!("tasklist exited with {}", out.status)),
        Err(e) => Liveness::Undetermined(format!("failed to run tasklist: {e}")),
    }
}

/// `tasklist /FO CSV /NH` prints `"image","pid",...` per match, or an
/// informational line when nothing matches.
fn tasklist_lists_pid(stdout: &str, pid: u32) -> bool {
    let needle = format!("\"{pid}\"");
    stdout
        .lines()
        .any(|line| line.split(',').nth(1).map(str::trim) == Some(needle.as_str()))
}
