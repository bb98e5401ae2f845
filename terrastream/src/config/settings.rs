//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are plain data; parsing lives in `parser`, serialization in `writer`.

use crate::coord::SrsType;
use std::path::PathBuf;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub cache: CacheSettings,
    pub download: DownloadSettings,
    pub resources: ResourceSettings,
    pub search: SearchSettings,
    pub logging: LoggingSettings,
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// Root under which `cache/<dir>/<leaf>` files are written.
    pub directory: PathBuf,
    /// Serve network names from disk when a cached copy exists.
    pub allow_disk_cache: bool,
    /// Ceiling on outstanding network fetches (clamped to 1..=256).
    pub max_concurrent_fetches: usize,
}

/// `[download]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    /// Timeout in seconds for HTTP requests.
    pub timeout: u64,
    /// Accept-Language header value.
    pub accept_language: String,
}

/// `[resources]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSettings {
    /// Combined RAM + GPU budget in bytes before eviction starts.
    pub memory_budget: usize,
    /// Ticks before an untouched, unheld, not-ready resource is dropped.
    pub idle_ticks: u64,
    /// Name of the texture drawn while a sub-mesh texture is loading.
    pub placeholder_texture: String,
}

/// `[search]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    /// URL template containing `{value}`.
    pub url: String,
    /// Reference frame of search positions.
    pub srs: SrsType,
    /// Apply result filtering.
    pub filtering: bool,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Log file path.
    pub file: PathBuf,
}
