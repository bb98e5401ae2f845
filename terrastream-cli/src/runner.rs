//! CLI runner for common setup and operations.
//!
//! Encapsulates logging initialization, configuration loading and the
//! network transport so command handlers stay small.

use crate::error::CliError;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tracing::info;
use terrastream::cache::Cache;
use terrastream::config::ConfigFile;
use terrastream::fetch::{HttpFetcher, ReqwestHttpClient};
use terrastream::log::TracingLogger;
use terrastream::logging::{init_logging, LoggingGuard};

/// How often pending work is polled.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: ConfigFile,
    runtime: Runtime,
}

impl CliRunner {
    /// Load the configuration and start logging and the async runtime.
    ///
    /// With `verbose`, log output is echoed to stderr as well as the file.
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let logging_guard = init_logging(&config.logging.file, verbose)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| CliError::Transport(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
            runtime,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("Terrastream v{}", terrastream::VERSION);
        info!("Terrastream CLI: {} command", command);
    }

    /// A cache backed by the HTTP transport, configured from the config file.
    pub fn network_cache(&self) -> Result<Cache, CliError> {
        let client = ReqwestHttpClient::new(&self.config.download_config())?;
        let fetcher = HttpFetcher::new(client, self.runtime.handle().clone());
        Ok(Cache::new(
            self.config.cache_config(),
            Arc::new(fetcher),
            Arc::new(TracingLogger::new()),
        ))
    }

    /// Call `step` until it returns true, sleeping between calls.
    ///
    /// Gives up after the configured download timeout plus a grace period.
    pub fn poll_until<F>(&self, what: &str, mut step: F) -> Result<(), CliError>
    where
        F: FnMut() -> bool,
    {
        let secs = self.config.download.timeout * 2;
        let deadline = Instant::now() + Duration::from_secs(secs);
        while !step() {
            if Instant::now() >= deadline {
                return Err(CliError::Timeout {
                    what: what.to_string(),
                    secs,
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
        Ok(())
    }
}
