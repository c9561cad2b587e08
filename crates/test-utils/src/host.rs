use std::path::PathBuf;

use benchrun::host::{HostRuntime, format_memory_stats};

/// A [`HostRuntime`] with pinned answers.
#[derive(Debug, Clone)]
pub struct FixedHost {
    pub max_heap_mb: u64,
    pub runtime: PathBuf,
    pub classpath: Option<String>,
}

impl FixedHost {
    pub fn new(max_heap_mb: u64) -> Self {
        Self {
            max_heap_mb,
            runtime: PathBuf::from("java"),
            classpath: Some("/opt/bench/lib/core.jar".to_string()),
        }
    }

    pub fn with_runtime(mut self, runtime: impl Into<PathBuf>) -> Self {
        self.runtime = runtime.into();
        self
    }

    pub fn with_classpath(mut self, classpath: Option<&str>) -> Self {
        self.classpath = classpath.map(str::to_string);
        self
    }
}

impl HostRuntime for FixedHost {
    fn max_heap_mb(&self) -> u64 {
        self.max_heap_mb
    }

    fn memory_stats(&self) -> String {
        let max = self.max_heap_mb as f64;
        format_memory_stats(max, max, max)
    }

    fn runtime_executable(&self) -> PathBuf {
        self.runtime.clone()
    }

    fn classpath(&self) -> Option<String> {
        self.classpath.clone()
    }
}
