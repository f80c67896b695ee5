//! Logging collaborator handed to every probe.
//!
//! Probes never reach for the global `log` macros themselves. They hold an
//! `Arc<dyn EventSink>` so a run can be observed (or silenced) by whoever
//! builds it. The binary wires [`LogSink`], which forwards to `log` and from
//! there to `env_logger`.

use std::sync::{Arc, Mutex};

pub trait EventSink: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn info(&self, message: &str) {
        log::info!("{}", message);
    }

    fn warn(&self, message: &str) {
        log::warn!("{}", message);
    }

    fn error(&self, message: &str) {
        log::error!("{}", message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Info,
    Warn,
    Error,
}

/// Keeps every event in memory. Used by tests to check what a probe logged.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<(EventLevel, String)>>,
}

impl MemorySink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<(EventLevel, String)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, level: EventLevel) -> usize {
        self.events().iter().filter(|(l, _)| *l == level).count()
    }

    fn push(&self, level: EventLevel, message: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push((level, message.to_string()));
        }
    }
}

impl EventSink for MemorySink {
    fn info(&self, message: &str) {
        self.push(EventLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(EventLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(EventLevel::Error, message);
    }
}

pub fn log_sink() -> Arc<dyn EventSink> {
    Arc::new(LogSink)
}
