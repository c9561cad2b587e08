// src/net/mod.rs

//! Network pre-flight checks.

pub mod probe;

pub use probe::{DEFAULT_PROBE_TIMEOUT, PortProbe};
