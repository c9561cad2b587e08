#![allow(dead_code)]

use benchrun::config::{MapConfig, keys};

/// Builder for runner configuration to simplify test setup.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: MapConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_memory(mut self, value: &str) -> Self {
        self.config.insert(keys::MAX_MEMORY, value);
        self
    }

    pub fn use_membar(mut self, value: &str) -> Self {
        self.config.insert(keys::USE_MEMBAR, value);
        self
    }

    pub fn log_config_file(mut self, path: &str) -> Self {
        self.config.insert(keys::LOG_CONFIG_FILE, path);
        self
    }

    pub fn extra_flags(mut self, flags: &str) -> Self {
        self.config.insert(keys::EXTRA_FLAGS, flags);
        self
    }

    pub fn runtime(mut self, runtime: &str) -> Self {
        self.config.insert(keys::RUNTIME, runtime);
        self
    }

    pub fn classpath(mut self, classpath: &str) -> Self {
        self.config.insert(keys::CLASSPATH, classpath);
        self
    }

    pub fn set(mut self, key: &str, value: &str) -> Self {
        self.config.insert(key, value);
        self
    }

    pub fn build(self) -> MapConfig {
        self.config
    }
}
