// src/config/keys.rs

//! Configuration keys consumed by the launcher.
//!
//! Every key is optional. Readers fall back to a hardcoded default and log a
//! warning when a key is missing or malformed.

/// Memory ceiling for the runner, e.g. `"2g"`, `"512m"`, `"1048576k"`.
pub const MAX_MEMORY: &str = "runner.max-memory";

/// Boolean toggle for the `-XX:+UseMembar` runtime flag.
pub const USE_MEMBAR: &str = "runner.use-membar";

/// Path of the logging configuration file handed to the runner.
pub const LOG_CONFIG_FILE: &str = "runner.log-config-file";

/// Additional runtime flags, whitespace separated (or a TOML array).
pub const EXTRA_FLAGS: &str = "runner.extra-flags";

/// Runtime executable overriding the host default.
pub const RUNTIME: &str = "runner.runtime";

/// Classpath overriding the orchestrator's own.
pub const CLASSPATH: &str = "runner.classpath";

/// Connect timeout used by the port probe, in milliseconds.
pub const PORT_PROBE_TIMEOUT_MS: &str = "runner.port-probe-timeout-ms";
