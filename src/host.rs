// src/host.rs

//! Facts about the orchestrating process and its host.
//!
//! The launcher never reads ambient process state directly; it is handed a
//! [`HostRuntime`] so the memory fallback, runtime executable and classpath
//! can be pinned in tests.

use std::fmt::Debug;
use std::path::PathBuf;

use sysinfo::System;

const MIB: f64 = 1024.0 * 1024.0;

/// Share of physical memory the orchestrator's own heap ceiling is taken to
/// be (the usual default heap ergonomics: a quarter of physical memory).
const DEFAULT_HEAP_FRACTION: f64 = 0.25;

pub trait HostRuntime: Send + Sync + Debug {
    /// The orchestrator's own maximum heap size, in megabytes.
    fn max_heap_mb(&self) -> u64;

    /// Human-readable memory summary, logged at launch.
    fn memory_stats(&self) -> String;

    /// Runtime executable used when `runner.runtime` is not configured.
    fn runtime_executable(&self) -> PathBuf;

    /// The orchestrator's resolved classpath, if it has one.
    fn classpath(&self) -> Option<String>;

    fn current_pid(&self) -> u32 {
        std::process::id()
    }
}

/// [`HostRuntime`] backed by the real machine.
#[derive(Debug, Clone, Default)]
pub struct SystemHost;

impl SystemHost {
    pub fn new() -> Self {
        Self
    }

    fn memory() -> System {
        let mut sys = System::new();
        sys.refresh_memory();
        sys
    }

    fn heap_ceiling_bytes(sys: &System) -> f64 {
        sys.total_memory() as f64 * DEFAULT_HEAP_FRACTION
    }
}

impl HostRuntime for SystemHost {
    fn max_heap_mb(&self) -> u64 {
        let sys = Self::memory();
        (Self::heap_ceiling_bytes(&sys) / MIB).round() as u64
    }

    fn memory_stats(&self) -> String {
        let sys = Self::memory();
        format_memory_stats(
            sys.available_memory() as f64 / MIB,
            sys.total_memory() as f64 / MIB,
            Self::heap_ceiling_bytes(&sys) / MIB,
        )
    }

    fn runtime_executable(&self) -> PathBuf {
        match std::env::var_os("JAVA_HOME") {
            Some(home) if !home.is_empty() => {
                PathBuf::from(home).join("bin").join(java_binary_name())
            }
            _ => PathBuf::from(java_binary_name()),
        }
    }

    fn classpath(&self) -> Option<String> {
        std::env::var("CLASSPATH").ok().filter(|cp| !cp.is_empty())
    }
}

fn java_binary_name() -> &'static str {
    if cfg!(windows) { "java.exe" } else { "java" }
}

/// `Memory (free/total/max) = 1.00M / 2.00M / 3.00M`
pub fn format_memory_stats(free_mb: f64, total_mb: f64, max_mb: f64) -> String {
    format!("Memory (free/total/max) = {free_mb:.2}M / {total_mb:.2}M / {max_mb:.2}M")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_stats_format() {
        assert_eq!(
            format_memory_stats(1.0, 2.5, 1024.126),
            "Memory (free/total/max) = 1.00M / 2.50M / 1024.13M"
        );
    }

    #[test]
    fn system_host_reports_its_own_pid() {
        assert_eq!(SystemHost::new().current_pid(), std::process::id());
    }
}
