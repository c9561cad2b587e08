// src/net/probe.rs

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::{ConfigLookup, LookupError, keys};

/// Connect timeout used when none is configured.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(500);

/// Checks whether something is already listening on a TCP port, before a
/// port is handed to a benchmark component.
#[derive(Debug, Clone, Copy)]
pub struct PortProbe {
    timeout: Duration,
}

impl Default for PortProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

impl PortProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Probe with the timeout from `runner.port-probe-timeout-ms`, or the
    /// default when unset or invalid.
    pub fn from_config(config: &dyn ConfigLookup) -> Self {
        match config.get_u64(keys::PORT_PROBE_TIMEOUT_MS) {
            Ok(ms) if ms > 0 => Self::new(Duration::from_millis(ms)),
            Ok(_) => {
                warn!(key = keys::PORT_PROBE_TIMEOUT_MS, "zero probe timeout; using default");
                Self::default()
            }
            Err(LookupError::Missing(_)) => Self::default(),
            Err(e) => {
                warn!(key = keys::PORT_PROBE_TIMEOUT_MS, error = %e, "using default probe timeout");
                Self::default()
            }
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `false` if a connection to `(host, port)` succeeds, `true` if it is
    /// refused, times out, or the host cannot be reached or resolved.
    pub async fn is_available(&self, host: &str, port: u16) -> bool {
        match timeout(self.timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(_stream)) => {
                debug!(host, port, "port is in use");
                false
            }
            Ok(Err(e)) => {
                debug!(host, port, error = %e, "port is available");
                true
            }
            Err(_elapsed) => {
                debug!(host, port, timeout_ms = self.timeout.as_millis() as u64, "connect timed out; port treated as available");
                true
            }
        }
    }

    /// [`is_available`](PortProbe::is_available) against `localhost`.
    pub async fn is_local_port_available(&self, port: u16) -> bool {
        self.is_available("localhost", port).await
    }
}
