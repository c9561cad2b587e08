// src/config/mod.rs

//! Configuration loading and lookup for benchrun.
//!
//! Responsibilities:
//! - Expose configuration as a key → string lookup (`lookup.rs`).
//! - Provide the TOML-backed and in-memory implementations (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Name the keys the launcher reads (`keys.rs`).

pub mod keys;
pub mod loader;
pub mod lookup;
pub mod model;

pub use loader::{default_config_path, load_from_path, load_or_default};
pub use lookup::{ConfigLookup, LookupError};
pub use model::{LayeredConfig, MapConfig, TomlConfig};
