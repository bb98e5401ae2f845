//! Core types for the resource cache.

use bytes::Bytes;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{clamp_concurrent_fetches, DEFAULT_ALLOW_DISK_CACHE, DEFAULT_MAX_CONCURRENT_FETCHES};

/// Per-key lifecycle of a cache entry.
///
/// `Ready` means the bytes arrived and have not been handed out yet;
/// `Done` means they were delivered at least once and stay cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryStatus {
    Uninitialized,
    Downloading,
    Ready,
    Done,
    Error,
}

impl EntryStatus {
    /// True while the entry has neither data nor a terminal failure.
    pub fn is_pending(self) -> bool {
        matches!(self, EntryStatus::Uninitialized | EntryStatus::Downloading)
    }
}

/// Result of a single [`Cache::read`](super::Cache::read).
///
/// A buffer is carried exactly when the status is `Ready` or `Done`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheRead {
    /// Not admitted yet (fetch ceiling reached); retried on the next read.
    Uninitialized,
    /// Fetch in flight.
    Downloading,
    /// First delivery of freshly loaded bytes.
    Ready(Bytes),
    /// Repeat delivery of bytes already handed out.
    Done(Bytes),
    /// Terminal failure; see [`Cache::error`](super::Cache::error).
    Error,
}

impl CacheRead {
    pub fn status(&self) -> EntryStatus {
        match self {
            CacheRead::Uninitialized => EntryStatus::Uninitialized,
            CacheRead::Downloading => EntryStatus::Downloading,
            CacheRead::Ready(_) => EntryStatus::Ready,
            CacheRead::Done(_) => EntryStatus::Done,
            CacheRead::Error => EntryStatus::Error,
        }
    }

    pub fn data(&self) -> Option<&Bytes> {
        match self {
            CacheRead::Ready(b) | CacheRead::Done(b) => Some(b),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<Bytes> {
        match self {
            CacheRead::Ready(b) | CacheRead::Done(b) => Some(b),
            _ => None,
        }
    }
}

/// Cache-related errors. Stored on the failed entry.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// Local file, disk-cache read or disk-cache write failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },

    /// Network fetch failed or no transport was configured.
    #[error("fetch of '{name}' failed: {reason}")]
    Fetch { name: String, reason: String },
}

impl CacheError {
    pub(crate) fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        CacheError::Io {
            path: path.as_ref().to_path_buf(),
            source: Arc::new(source),
        }
    }
}

/// Cache configuration.
///
/// ```
/// use terrastream::cache::CacheConfig;
///
/// let config = CacheConfig::new("/var/cache/terrastream")
///     .with_disk_cache(false)
///     .with_max_concurrent_fetches(4);
/// assert_eq!(config.max_concurrent_fetches(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    root_dir: PathBuf,
    allow_disk_cache: bool,
    max_concurrent_fetches: usize,
}

impl CacheConfig {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            allow_disk_cache: DEFAULT_ALLOW_DISK_CACHE,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }

    /// Whether network names may be served from an existing disk copy.
    /// Fetched bytes are written to disk either way.
    pub fn with_disk_cache(mut self, allow: bool) -> Self {
        self.allow_disk_cache = allow;
        self
    }

    /// Ceiling on outstanding network fetches (clamped to 1..=256).
    pub fn with_max_concurrent_fetches(mut self, max: usize) -> Self {
        self.max_concurrent_fetches = clamp_concurrent_fetches(max);
        self
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn allow_disk_cache(&self) -> bool {
        self.allow_disk_cache
    }

    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_concurrent_fetches
    }

    /// Absolute location of the disk copy for `name`.
    pub fn disk_path(&self, name: &str) -> PathBuf {
        self.root_dir.join(super::name::to_cache_path(name))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CACHE_DIRECTORY)
    }
}
