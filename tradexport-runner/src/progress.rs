//! Progress reporting.
//!
//! The pipeline emits short human-readable lines. Where they go (a channel
//! to a UI thread, stdout, the log) is up to the sink.

use std::sync::mpsc::Sender;
use std::sync::Mutex;

/// Receiver of progress lines. Must never fail the pipeline.
pub trait ProgressSink: Send + Sync {
    fn report(&self, message: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, message: &str) {
        self(message)
    }
}

/// Forwards lines to another thread. A dropped receiver is ignored.
impl ProgressSink for Sender<String> {
    fn report(&self, message: &str) {
        let _ = self.send(message.to_string());
    }
}

/// Keeps every line in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    messages: Mutex<Vec<String>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl ProgressSink for CollectingSink {
    fn report(&self, message: &str) {
        let mut messages = self.messages.lock().unwrap_or_else(|p| p.into_inner());
        messages.push(message.to_string());
    }
}

/// Emits each line as an `info` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn report(&self, message: &str) {
        tracing::info!(target: "tradexport::progress", "{message}");
    }
}
