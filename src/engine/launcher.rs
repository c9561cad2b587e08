// src/engine/launcher.rs

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ConfigLookup;
use crate::errors::{BenchrunError, Result};
use crate::exec::{ProcessHandle, ProcessSupervisor};
use crate::host::HostRuntime;
use crate::launch::{CommandBuilder, CommandSpec, ResourceBudget, ResourceBudgetCalculator};
use crate::net::PortProbe;
use crate::sink::LogSink;
use crate::types::RunId;

/// The orchestrator-facing entry point: budget → command → launch.
///
/// All collaborators are handed in; nothing is read from ambient state.
#[derive(Debug)]
pub struct Launcher {
    host: Arc<dyn HostRuntime>,
    config: Arc<dyn ConfigLookup>,
    budget: ResourceBudgetCalculator,
    commands: CommandBuilder,
    supervisor: ProcessSupervisor,
    ports: PortProbe,
}

impl Launcher {
    pub fn new(
        host: Arc<dyn HostRuntime>,
        config: Arc<dyn ConfigLookup>,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self::with_supervisor(host, config, ProcessSupervisor::new(sink))
    }

    pub fn with_supervisor(
        host: Arc<dyn HostRuntime>,
        config: Arc<dyn ConfigLookup>,
        supervisor: ProcessSupervisor,
    ) -> Self {
        let ports = PortProbe::from_config(config.as_ref());
        Self {
            budget: ResourceBudgetCalculator::new(Arc::clone(&host)),
            commands: CommandBuilder::new(Arc::clone(&host)),
            host,
            config,
            supervisor,
            ports,
        }
    }

    pub fn supervisor(&self) -> &ProcessSupervisor {
        &self.supervisor
    }

    /// Budget for a launch made now. Recomputed on every call.
    pub fn budget(&self) -> ResourceBudget {
        self.budget.compute_limit(self.config.as_ref())
    }

    /// Resolve the budget and the command for one launch without spawning.
    pub fn prepare(&self, entry_point: &str, args: &[String]) -> (ResourceBudget, CommandSpec) {
        let budget = self.budget();
        let spec = self
            .commands
            .build(entry_point, args, &budget, self.config.as_ref());
        (budget, spec)
    }

    /// Compute the budget, build the command and spawn the runner.
    pub fn launch(&self, run_id: RunId, entry_point: &str, args: &[String]) -> Result<ProcessHandle> {
        let (budget, spec) = self.prepare(entry_point, args);
        info!(
            run_id = %run_id,
            limit_mb = budget.limit_mb,
            source = %budget.source,
            "{}",
            self.host.memory_stats()
        );
        debug!(run_id = %run_id, orchestrator_pid = self.host.current_pid(), "launching runner");
        self.supervisor.launch(run_id, spec)
    }

    /// Fail with [`BenchrunError::PortInUse`] if `localhost:port` is taken.
    pub async fn ensure_port_free(&self, port: u16) -> Result<()> {
        if self.ports.is_local_port_available(port).await {
            Ok(())
        } else {
            Err(BenchrunError::PortInUse {
                host: "localhost".to_string(),
                port,
            })
        }
    }
}
