// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::model::TomlConfig;
use crate::errors::Result;

/// Load a TOML configuration file from a given path.
///
/// This only performs TOML deserialization; individual keys are interpreted
/// (and defaulted) by the components that read them.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<TomlConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let config = TomlConfig::from_toml_str(&contents)?;
    debug!(path = %path.display(), "loaded benchmark configuration");
    Ok(config)
}

/// Load the configuration the CLI asked for.
///
/// - An explicit path must exist and parse.
/// - Without one, [`default_config_path`] is tried; if it does not exist every
///   key falls back to its default, which is a warning, not an error.
pub fn load_or_default(explicit: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }

    let path = default_config_path();
    if path.is_file() {
        load_from_path(&path)
    } else {
        warn!(
            path = %path.display(),
            "no benchmark configuration found; using defaults for every key"
        );
        Ok(TomlConfig::empty())
    }
}

/// Default config location: `benchmark.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("benchmark.toml")
}
