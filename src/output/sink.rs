//! Report sinks
//!
//! A sink receives finished report blocks. Each `emit` call carries one whole
//! block and must be written without interleaving with other blocks.

use std::io::Write;
use std::sync::Mutex;

use tracing::warn;

/// Destination for report blocks
pub trait ReportSink: Send + Sync {
    fn emit(&self, block: &str);
}

/// Writes blocks to standard error
#[derive(Clone, Copy, Debug, Default)]
pub struct StderrSink;

impl ReportSink for StderrSink {
    fn emit(&self, block: &str) {
        let mut stderr = std::io::stderr().lock();
        if let Err(e) = stderr.write_all(block.as_bytes()).and_then(|_| stderr.flush()) {
            warn!("Failed to write report block: {}", e);
        }
    }
}

/// Keeps blocks in memory, in emission order
#[derive(Debug, Default)]
pub struct MemorySink {
    blocks: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> Vec<String> {
        self.blocks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// All blocks concatenated
    pub fn text(&self) -> String {
        self.blocks().concat()
    }

    pub fn clear(&self) {
        self.blocks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl ReportSink for MemorySink {
    fn emit(&self, block: &str) {
        self.blocks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(block.to_string());
    }
}
