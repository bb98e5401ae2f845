//! Adapter from [`Logger`] to the `tracing` crate.

use crate::log::{LogLevel, Logger};
use std::fmt::Arguments;

/// Logger that forwards every message to `tracing`.
///
/// Requires a subscriber to be installed (see [`crate::logging::init_logging`]);
/// without one the messages are dropped by `tracing` itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, args: Arguments<'_>) {
        match level {
            LogLevel::Trace => tracing::trace!(target: "terrastream", "{}", args),
            LogLevel::Debug => tracing::debug!(target: "terrastream", "{}", args),
            LogLevel::Info => tracing::info!(target: "terrastream", "{}", args),
            LogLevel::Warn => tracing::warn!(target: "terrastream", "{}", args),
            LogLevel::Error => tracing::error!(target: "terrastream", "{}", args),
        }
    }
}
