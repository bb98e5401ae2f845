//! In-memory logger used to assert on diagnostics.

use crate::log::{LogLevel, Logger};
use std::fmt::Arguments;
use std::sync::{Mutex, PoisonError};

/// A single captured log message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
}

/// Logger that records every message it receives.
///
/// ```
/// use terrastream::log::{CapturingLogger, LogLevel, Logger};
///
/// let logger = CapturingLogger::new();
/// logger.warn(format_args!("slow fetch: {}", "a.meta"));
/// assert!(logger.contains(LogLevel::Warn, "a.meta"));
/// ```
#[derive(Debug, Default)]
pub struct CapturingLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl CapturingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True if a message at `level` contains `needle`.
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|r| r.level == level && r.message.contains(needle))
    }

    /// Number of messages logged at or above `level`.
    pub fn count_at_least(&self, level: LogLevel) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.level >= level)
            .count()
    }
}

impl Logger for CapturingLogger {
    fn log(&self, level: LogLevel, args: Arguments<'_>) {
        let record = LogRecord {
            level,
            message: args.to_string(),
        };
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}
