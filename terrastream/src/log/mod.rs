//! Logging abstraction layer.
//!
//! Streaming components report progress and failures through the [`Logger`]
//! trait instead of calling a logging backend directly. The cache, the
//! resource registry, the search manager and the traversal all take an
//! `Arc<dyn Logger>` at construction.
//!
//! - [`TracingLogger`] forwards to the `tracing` crate (production)
//! - [`NoOpLogger`] discards everything (default for tests and benchmarks)
//! - [`CapturingLogger`] keeps records in memory so tests can assert on them
//!
//! ```
//! use std::sync::Arc;
//! use terrastream::log::{Logger, NoOpLogger};
//! use terrastream::log_warn;
//!
//! let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
//! log_warn!(logger, "resource '{}' failed", "https://example.com/1-0-0.meta");
//! ```

mod capture;
mod noop;
mod tracing_adapter;
mod r#trait;

pub use capture::{CapturingLogger, LogRecord};
pub use noop::NoOpLogger;
pub use r#trait::{LogLevel, Logger};
pub use tracing_adapter::TracingLogger;
