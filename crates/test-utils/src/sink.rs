use std::sync::{Arc, Mutex};

use benchrun::sink::LogSink;
use benchrun::types::RunId;

/// A sink that records every appended line, in order.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<(RunId, String)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything appended so far.
    pub fn entries(&self) -> Vec<(RunId, String)> {
        self.lines.lock().unwrap().clone()
    }

    /// Lines appended for one run, in arrival order.
    pub fn lines_for(&self, run_id: &RunId) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == run_id)
            .map(|(_, line)| line.clone())
            .collect()
    }
}

impl LogSink for MemorySink {
    fn append(&self, run_id: &RunId, line: &str) {
        self.lines
            .lock()
            .unwrap()
            .push((run_id.clone(), line.to_string()));
    }
}
