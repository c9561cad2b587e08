// src/engine/mod.rs

//! Orchestration on top of the launch and exec layers.
//!
//! - [`launcher`] wires budget, command building, port pre-flight and the
//!   supervisor into one `Launcher`.
//! - [`shutdown`] sequences graceful and forceful termination.

pub mod launcher;
pub mod shutdown;

pub use launcher::Launcher;
pub use shutdown::{ShutdownOutcome, shutdown};
