use crate::domain::ports::Writer;
use crate::utils::error::Result;
use std::sync::{Mutex, MutexGuard};

/// 把所有 payload 留在記憶體，測試時用來檢查輸出
#[derive(Debug, Default)]
pub struct MemoryWriter {
    messages: Mutex<Vec<String>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<String>> {
        self.messages.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn messages(&self) -> Vec<String> {
        self.guard().clone()
    }

    /// Last payload written, or an empty string when nothing was written.
    pub fn last_line(&self) -> String {
        self.guard().last().cloned().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    pub fn clear(&self) {
        self.guard().clear();
        tracing::debug!("MemoryWriter cleared messages");
    }
}

impl Writer for MemoryWriter {
    fn write(&self, payload: &str) -> Result<()> {
        tracing::debug!("MemoryWriter writing: {}", payload);
        self.guard().push(payload.to_string());
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.clear();
        tracing::debug!("MemoryWriter closed");
        Ok(())
    }
}
