//! Process-wide `tracing` subscriber setup.
//!
//! The CLI installs one subscriber per run:
//! - a compact, non-blocking file layer (the log file is truncated on start)
//! - an optional stderr layer so command output on stdout stays clean
//! - filtering from `RUST_LOG`, defaulting to `info`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE: &str = "terrastream.log";

/// Keeps the background log writer alive.
///
/// Dropping the guard flushes and closes the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Create the parent directory of `log_path` and truncate the file.
///
/// Returns the `(directory, file name)` pair the appender is built from.
pub fn prepare_log_file(log_path: &Path) -> io::Result<(PathBuf, String)> {
    let dir = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("log path has no file name: {}", log_path.display()),
            )
        })?;

    fs::create_dir_all(&dir)?;
    fs::write(dir.join(&file_name), "")?;
    Ok((dir, file_name))
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails if the log directory cannot be created or the file cannot be truncated.
pub fn init_logging(log_path: &Path, echo_to_stderr: bool) -> io::Result<LoggingGuard> {
    let (dir, file_name) = prepare_log_file(log_path)?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(true);

    let stderr_layer = echo_to_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_ansi(true)
            .compact()
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e.to_string()))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_prepare_creates_nested_directory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("deep/nested/run.log");

        let (dir, name) = prepare_log_file(&path).unwrap();

        assert_eq!(dir, temp.path().join("deep/nested"));
        assert_eq!(name, "run.log");
        assert!(path.exists());
    }

    #[test]
    fn test_prepare_truncates_existing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("run.log");
        fs::write(&path, "previous session").unwrap();

        prepare_log_file(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_prepare_rejects_path_without_file_name() {
        let err = prepare_log_file(Path::new("..")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_guard_holds_worker() {
        use tracing_appender::non_blocking::NonBlocking;

        let (writer, guard) = NonBlocking::new(io::sink());
        drop(writer);
        let _guard = LoggingGuard { _file_guard: guard };
    }
}
