// src/launch/command.rs

//! Assembly of the benchmark runner invocation.
//!
//! The resulting command line always has the shape
//! `<runtime> <runtime-flags...> -Xmx<memory> <entry-point> <args...>`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{ConfigLookup, LookupError, keys};
use crate::host::HostRuntime;
use crate::launch::budget::ResourceBudget;

/// Flag emitted when `runner.use-membar` is true or unreadable.
pub const USE_MEMBAR_FLAG: &str = "-XX:+UseMembar";

/// Logging configuration file used when `runner.log-config-file` is unset.
pub const DEFAULT_LOG_CONFIG_FILE: &str = "config/log4j2.xml";

/// Environment variable carrying the classpath to the runner.
pub const CLASSPATH_ENV: &str = "CLASSPATH";

/// A fully resolved runner invocation. Built once per launch and consumed by
/// [`ProcessSupervisor::launch`](crate::exec::ProcessSupervisor::launch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Variables set on top of the inherited environment.
    pub env: BTreeMap<String, String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Program followed by its arguments, space separated.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Builds [`CommandSpec`]s from configuration and a memory budget.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    host: Arc<dyn HostRuntime>,
}

impl CommandBuilder {
    pub fn new(host: Arc<dyn HostRuntime>) -> Self {
        Self { host }
    }

    pub fn build(
        &self,
        entry_point: &str,
        args: &[String],
        budget: &ResourceBudget,
        config: &dyn ConfigLookup,
    ) -> CommandSpec {
        let spec = CommandSpec::new(self.runtime(config))
            .args(runtime_flags(config))
            .arg(memory_flag(budget))
            .arg(entry_point)
            .args(args.iter().cloned())
            .env(CLASSPATH_ENV, self.classpath(config));

        debug!(command = %spec, "built runner command");
        spec
    }

    fn runtime(&self, config: &dyn ConfigLookup) -> String {
        match config.get_string(keys::RUNTIME) {
            Ok(runtime) if !runtime.trim().is_empty() => runtime.trim().to_string(),
            _ => self.host.runtime_executable().to_string_lossy().into_owned(),
        }
    }

    fn classpath(&self, config: &dyn ConfigLookup) -> String {
        if let Ok(cp) = config.get_string(keys::CLASSPATH) {
            if !cp.trim().is_empty() {
                return cp;
            }
        }
        self.host.classpath().unwrap_or_else(|| {
            warn!("orchestrator has no classpath; runner gets an empty {CLASSPATH_ENV}");
            String::new()
        })
    }
}

/// `-Xmx<value>` for the given budget.
pub fn memory_flag(budget: &ResourceBudget) -> String {
    format!("-Xmx{}", budget.flag_value)
}

/// Runtime flags read from configuration, in a fixed order.
///
/// Unreadable values are logged and replaced by their defaults.
pub fn runtime_flags(config: &dyn ConfigLookup) -> Vec<String> {
    let mut flags = Vec::new();

    match config.get_bool(keys::USE_MEMBAR) {
        Ok(true) => flags.push(USE_MEMBAR_FLAG.to_string()),
        Ok(false) => {}
        Err(e) => {
            warn!(key = keys::USE_MEMBAR, error = %e, "using default runtime flag {USE_MEMBAR_FLAG}");
            flags.push(USE_MEMBAR_FLAG.to_string());
        }
    }

    let log_config = match config.get_string(keys::LOG_CONFIG_FILE) {
        Ok(path) if !path.trim().is_empty() => path.trim().to_string(),
        Ok(_) => {
            warn!(
                key = keys::LOG_CONFIG_FILE,
                "empty log configuration path; using {DEFAULT_LOG_CONFIG_FILE}"
            );
            DEFAULT_LOG_CONFIG_FILE.to_string()
        }
        Err(e) => {
            warn!(
                key = keys::LOG_CONFIG_FILE,
                error = %e,
                "using default log configuration {DEFAULT_LOG_CONFIG_FILE}"
            );
            DEFAULT_LOG_CONFIG_FILE.to_string()
        }
    };
    flags.push(format!("-Dlog4j.configurationFile={log_config}"));

    match config.get_string(keys::EXTRA_FLAGS) {
        Ok(extra) => flags.extend(extra.split_whitespace().map(str::to_string)),
        Err(LookupError::Missing(_)) => {}
        Err(e) => warn!(key = keys::EXTRA_FLAGS, error = %e, "ignoring extra runtime flags"),
    }

    flags
}
