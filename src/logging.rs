//! Logging handle
//!
//! Channel components never log through the process-wide `log` facade
//! directly. They receive a [`Logger`] at construction and write through the
//! sink it wraps, which can be a global facade forwarder, a stderr printer or
//! an in-memory recorder.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Cloneable leveled logging handle
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn Log>,
    target: &'static str,
}

impl Logger {
    pub fn new(sink: Arc<dyn Log>, target: &'static str) -> Self {
        Logger { sink, target }
    }

    /// Forward to whatever logger the host process installed with `log`
    pub fn facade(target: &'static str) -> Self {
        Logger::new(Arc::new(Facade), target)
    }

    /// Drop every record
    pub fn discard() -> Self {
        Logger::new(Arc::new(Discard), "icmp_channel")
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn enabled(&self, level: Level) -> bool {
        let metadata = Metadata::builder().level(level).target(self.target).build();
        self.sink.enabled(&metadata)
    }

    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        self.sink.log(
            &Record::builder()
                .args(args)
                .level(level)
                .target(self.target)
                .build(),
        );
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("target", &self.target).finish()
    }
}

struct Facade;

impl Log for Facade {
    fn enabled(&self, metadata: &Metadata) -> bool {
        log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record) {
        log::logger().log(record);
    }

    fn flush(&self) {
        log::logger().flush();
    }
}

struct Discard;

impl Log for Discard {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        false
    }

    fn log(&self, _record: &Record) {}

    fn flush(&self) {}
}

/// Prints `LEVEL: [ROLE] message` lines to stderr
pub struct StderrLog {
    role: String,
    max_level: LevelFilter,
}

impl StderrLog {
    pub fn new(role: &str, max_level: LevelFilter) -> Self {
        StderrLog {
            role: role.to_uppercase(),
            max_level,
        }
    }
}

impl Log for StderrLog {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let _ = writeln!(
            std::io::stderr().lock(),
            "{}: [{}] {}",
            record.level(),
            self.role,
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Keeps every record in memory
#[derive(Default)]
pub struct MemoryLog {
    records: Mutex<Vec<(Level, String)>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<(Level, String)> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Messages logged at exactly `level`
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message)
            .collect()
    }
}

impl Log for MemoryLog {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let entry = (record.level(), record.args().to_string());
        match self.records.lock() {
            Ok(mut records) => records.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_log_captures_levels() {
        let sink = Arc::new(MemoryLog::new());
        let logger = Logger::new(sink.clone(), "test");

        logger.info(format_args!("socket opened"));
        logger.warn(format_args!("expected {} got {}", 7, 9));

        assert_eq!(sink.records().len(), 2);
        assert_eq!(sink.messages_at(Level::Warn), vec!["expected 7 got 9"]);
    }

    #[test]
    fn test_stderr_log_filters_by_level() {
        let log = StderrLog::new("server", LevelFilter::Info);
        let debug = Metadata::builder().level(Level::Debug).build();
        let warn = Metadata::builder().level(Level::Warn).build();
        assert!(!log.enabled(&debug));
        assert!(log.enabled(&warn));
    }

    #[test]
    fn test_discard_is_disabled() {
        assert!(!Logger::discard().enabled(Level::Error));
    }
}
