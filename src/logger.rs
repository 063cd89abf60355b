//! Multi-sink logger used for user-facing error reporting.
//!
//! Every message goes to each registered sink. The default sink forwards to
//! the `log` facade; the browser adds an [`AlertSink`] so errors also raise a
//! blocking alert.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => f.write_str("error"),
            Level::Warning => f.write_str("warning"),
            Level::Info => f.write_str("info"),
        }
    }
}

pub trait LogSink {
    fn write(&self, level: Level, message: &str);
}

pub struct Logger {
    sinks: Vec<Box<dyn LogSink>>,
}

impl Logger {
    /// A logger with no sinks; messages are dropped until one is added.
    pub fn empty() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Facade output plus a blocking alert for errors.
    #[cfg(target_arch = "wasm32")]
    pub fn browser() -> Self {
        Self::default().with_sink(AlertSink)
    }

    pub fn log(&self, level: Level, message: &str) {
        for sink in &self.sinks {
            sink.write(level, message);
        }
    }

    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(Level::Warning, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::empty().with_sink(FacadeSink)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

/// Forwards to the `log` crate under the `dominique` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct FacadeSink;

impl LogSink for FacadeSink {
    fn write(&self, level: Level, message: &str) {
        match level {
            Level::Error => log::error!(target: "dominique", "{message}"),
            Level::Warning => log::warn!(target: "dominique", "{message}"),
            Level::Info => log::info!(target: "dominique", "{message}"),
        }
    }
}

/// Raises `window.alert` for error messages.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertSink;

#[cfg(target_arch = "wasm32")]
impl LogSink for AlertSink {
    fn write(&self, level: Level, message: &str) {
        if level != Level::Error {
            return;
        }
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: Level,
    pub message: String,
}

/// Keeps every message in memory. Clones share the same record list.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    pub fn count(&self, level: Level) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|record| record.level == level)
            .count()
    }
}

impl LogSink for MemorySink {
    fn write(&self, level: Level, message: &str) {
        self.records.lock().push(LogRecord {
            level,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_sink_receives_every_message() {
        let first = MemorySink::new();
        let second = MemorySink::new();
        let logger = Logger::empty()
            .with_sink(first.clone())
            .with_sink(second.clone());

        logger.error("boom");
        logger.warn("careful");
        logger.info("hello");

        for sink in [&first, &second] {
            assert_eq!(sink.records().len(), 3);
            assert_eq!(sink.count(Level::Error), 1);
            assert_eq!(sink.records()[0].message, "boom");
        }
    }

    #[test]
    fn empty_logger_drops_messages() {
        let logger = Logger::empty();
        logger.error("nobody hears this");
        assert_eq!(format!("{logger:?}"), "Logger { sinks: 0 }");
    }
}
