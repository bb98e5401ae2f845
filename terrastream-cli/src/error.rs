//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;
use terrastream::cache::CacheError;
use terrastream::config::ConfigFileError;
use terrastream::fetch::FetchError;
use terrastream::search::SearchError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to start the async runtime or HTTP client
    Transport(String),
    /// One or more resources could not be fetched
    Fetch { failed: usize, total: usize },
    /// Waited too long for outstanding work
    Timeout { what: String, secs: u64 },
    /// Search failed
    Search(SearchError),
    /// Disk cache inspection or cleanup failed
    Cache(CacheError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Transport(_) | CliError::Timeout { .. } => {
                eprintln!();
                eprintln!("Check your network connection and the [download] timeout setting.");
            }
            CliError::Config(_) => {
                eprintln!();
                eprintln!("Run 'terrastream config path' to locate the configuration file.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Transport(msg) => write!(f, "Failed to start transport: {}", msg),
            CliError::Fetch { failed, total } => {
                write!(f, "{} of {} resources failed to load", failed, total)
            }
            CliError::Timeout { what, secs } => {
                write!(f, "Timed out after {}s waiting for {}", secs, what)
            }
            CliError::Search(e) => write!(f, "Search failed: {}", e),
            CliError::Cache(e) => write!(f, "Disk cache error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Search(e) => Some(e),
            CliError::Cache(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<FetchError> for CliError {
    fn from(e: FetchError) -> Self {
        CliError::Transport(e.to_string())
    }
}

impl From<SearchError> for CliError {
    fn from(e: SearchError) -> Self {
        CliError::Search(e)
    }
}

impl From<CacheError> for CliError {
    fn from(e: CacheError) -> Self {
        CliError::Cache(e)
    }
}
