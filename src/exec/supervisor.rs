// src/exec/supervisor.rs

//! Spawning, terminating and probing benchmark runner processes.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::anyhow;
use tokio::process::Command;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::errors::{BenchrunError, Result};
use crate::exec::monitor::{DrainHandle, OutputMonitor};
use crate::exec::output::combined_pipe;
use crate::exec::platform::TerminationAdapter;
use crate::launch::CommandSpec;
use crate::sink::LogSink;
use crate::types::{Liveness, ProcessStatus, RunId};

/// A launched runner.
///
/// The status is written only by the supervisor (`Running`, `Unknown`) and by
/// the drain task (`Exited`); the holder of the handle just observes it.
#[derive(Debug)]
pub struct ProcessHandle {
    run_id: RunId,
    pid: u32,
    command_line: String,
    status: Arc<watch::Sender<ProcessStatus>>,
    drain: Option<DrainHandle>,
}

impl ProcessHandle {
    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    pub fn status(&self) -> ProcessStatus {
        *self.status.borrow()
    }

    /// Take the drain task's completion handle, to await a clean shutdown.
    ///
    /// Returns `None` on the second call.
    pub fn take_drain(&mut self) -> Option<DrainHandle> {
        self.drain.take()
    }

    /// Resolve once the status is terminal (`Exited` or `Unknown`).
    pub async fn wait_terminal(&self) -> ProcessStatus {
        let mut rx = self.status.subscribe();
        match rx.wait_for(|s| s.is_terminal()).await {
            Ok(status) => *status,
            // The sender lives in `self`, so it cannot be dropped while we wait.
            Err(_) => self.status(),
        }
    }
}

/// Owns the lifecycle of runner processes.
///
/// At most one live runner per [`RunId`]: a second launch for the same id is
/// rejected until the first one reached a terminal status.
#[derive(Debug)]
pub struct ProcessSupervisor {
    adapter: TerminationAdapter,
    monitor: OutputMonitor,
    live: Mutex<HashMap<RunId, watch::Receiver<ProcessStatus>>>,
}

impl ProcessSupervisor {
    /// Supervisor for the current host, draining output into `sink`.
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self::with_adapter(sink, TerminationAdapter::detect())
    }

    pub fn with_adapter(sink: Arc<dyn LogSink>, adapter: TerminationAdapter) -> Self {
        debug!(?adapter, "process supervisor created");
        Self {
            adapter,
            monitor: OutputMonitor::new(sink),
            live: Mutex::new(HashMap::new()),
        }
    }

    pub fn adapter(&self) -> TerminationAdapter {
        self.adapter
    }

    /// Spawn the runner described by `spec` and start draining its output.
    ///
    /// Returns as soon as the process exists; readiness is not awaited.
    /// Must be called from within a Tokio runtime. A spawn failure is fatal
    /// for the benchmark run and is never retried.
    pub fn launch(&self, run_id: RunId, spec: CommandSpec) -> Result<ProcessHandle> {
        let status = Arc::new(watch::Sender::new(ProcessStatus::Starting));
        self.register(&run_id, &status)?;

        match self.spawn(&run_id, spec, &status) {
            Ok(handle) => Ok(handle),
            Err(e) => {
                self.unregister(&run_id);
                Err(e)
            }
        }
    }

    fn spawn(
        &self,
        run_id: &RunId,
        spec: CommandSpec,
        status: &Arc<watch::Sender<ProcessStatus>>,
    ) -> Result<ProcessHandle> {
        let command_line = spec.command_line();
        let spawn_failed = |source| BenchrunError::SpawnFailed {
            program: spec.program.clone(),
            source,
        };

        let (output, child_output) = combined_pipe().map_err(spawn_failed)?;

        // `cmd` keeps the parent's copies of the pipe's write end; it is
        // dropped at the end of this block so the drain task can see EOF.
        let child = {
            let mut cmd = Command::new(&spec.program);
            cmd.args(&spec.args)
                .envs(&spec.env)
                .stdin(Stdio::null())
                .stdout(child_output.stdout)
                .stderr(child_output.stderr);
            cmd.spawn()
        };

        let child = child.map_err(|source| {
            error!(run_id = %run_id, command = %command_line, error = %source, "failed to spawn benchmark runner");
            spawn_failed(source)
        })?;

        let pid = child
            .id()
            .ok_or_else(|| anyhow!("benchmark runner for run {run_id} exited before its pid was read"))?;

        status.send_replace(ProcessStatus::Running);
        info!(run_id = %run_id, pid, command = %command_line, "benchmark runner started");

        let drain = self
            .monitor
            .attach(run_id.clone(), output, child, Arc::clone(status));

        Ok(ProcessHandle {
            run_id: run_id.clone(),
            pid,
            command_line,
            status: Arc::clone(status),
            drain: Some(drain),
        })
    }

    fn register(&self, run_id: &RunId, status: &watch::Sender<ProcessStatus>) -> Result<()> {
        let mut live = self.live.lock().unwrap_or_else(PoisonError::into_inner);
        prune_finished(&mut live);
        if let Some(existing) = live.get(run_id) {
            if !existing.borrow().is_terminal() {
                return Err(BenchrunError::AlreadyRunning(run_id.clone()));
            }
        }
        live.insert(run_id.clone(), status.subscribe());
        Ok(())
    }

    fn unregister(&self, run_id: &RunId) {
        let mut live = self.live.lock().unwrap_or_else(PoisonError::into_inner);
        live.remove(run_id);
    }

    /// Run ids with a runner that has not reached a terminal status, sorted.
    ///
    /// Finished runs are dropped from the registry on the way.
    pub fn live_runs(&self) -> Vec<RunId> {
        let mut live = self.live.lock().unwrap_or_else(PoisonError::into_inner);
        prune_finished(&mut live);
        let mut ids: Vec<RunId> = live.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Whether `run_id` currently has a runner that has not reached a
    /// terminal status.
    pub fn is_running(&self, run_id: &RunId) -> bool {
        let live = self.live.lock().unwrap_or_else(PoisonError::into_inner);
        live.get(run_id)
            .is_some_and(|status| !status.borrow().is_terminal())
    }

    /// Ask the runner to stop. Fire-and-forget: poll [`is_alive`] or await
    /// the drain handle to learn when it is gone.
    ///
    /// - graceful: cooperative shutdown request (`SIGTERM` / `taskkill`).
    /// - forceful: unconditional kill (`SIGKILL` / `taskkill /F`).
    ///
    /// A handle already in a terminal state is left alone, so a recycled pid
    /// is never signalled.
    ///
    /// [`is_alive`]: ProcessSupervisor::is_alive
    pub fn terminate(&self, handle: &ProcessHandle, forceful: bool) -> Result<()> {
        let status = handle.status();
        if status.is_terminal() {
            debug!(run_id = %handle.run_id, pid = handle.pid, ?status, "runner already finished; nothing to terminate");
            return Ok(());
        }
        info!(run_id = %handle.run_id, pid = handle.pid, forceful, "terminating benchmark runner");
        self.adapter.terminate(handle.pid, forceful)
    }

    /// Terminate a process this supervisor did not launch.
    pub fn kill_pid(&self, pid: u32, forceful: bool) -> Result<()> {
        self.adapter.terminate(pid, forceful)
    }

    /// Tri-state liveness probe.
    pub async fn probe(&self, pid: u32) -> Liveness {
        self.adapter.probe(pid).await
    }

    /// Whether `pid` still exists.
    ///
    /// A probe that cannot decide is an error, never a guess: the benchmark
    /// run has to be aborted.
    pub async fn is_alive(&self, pid: u32) -> Result<bool> {
        match self.probe(pid).await {
            Liveness::Alive => Ok(true),
            Liveness::Dead => Ok(false),
            Liveness::Undetermined(reason) => {
                error!(pid, reason = %reason, "failed to determine if a process is alive");
                Err(BenchrunError::LivenessUndetermined { pid, reason })
            }
        }
    }

    /// Liveness of a launched runner.
    ///
    /// A reaped runner is reported dead without probing its (possibly
    /// recycled) pid. An undetermined probe marks the handle `Unknown`.
    pub async fn check(&self, handle: &ProcessHandle) -> Result<bool> {
        if handle.status() == ProcessStatus::Exited {
            return Ok(false);
        }
        self.is_alive(handle.pid).await.inspect_err(|_| {
            handle.status.send_replace(ProcessStatus::Unknown);
        })
    }

    /// Poll [`is_alive`](ProcessSupervisor::is_alive) until the process is
    /// gone or `attempts` polls have been made. Returns whether it is gone.
    pub async fn wait_for_exit(&self, pid: u32, interval: Duration, attempts: u32) -> Result<bool> {
        for attempt in 0..attempts {
            if !self.is_alive(pid).await? {
                debug!(pid, attempt, "process is gone");
                return Ok(true);
            }
            tokio::time::sleep(interval).await;
        }
        Ok(!self.is_alive(pid).await?)
    }
}

fn prune_finished(live: &mut HashMap<RunId, watch::Receiver<ProcessStatus>>) {
    live.retain(|_, status| !status.borrow().is_terminal());
}
