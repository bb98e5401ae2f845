//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants, the clamping helpers and the
//! `ConfigFile::default()` implementation.

use std::path::PathBuf;

use super::settings::*;
use crate::coord::SrsType;
use crate::logging::DEFAULT_LOG_FILE;

// =============================================================================
// Cache defaults
// =============================================================================

/// Directory the `cache/` tree is created under.
pub const DEFAULT_CACHE_DIRECTORY: &str = ".";

/// Whether network resources may be served from the on-disk cache.
pub const DEFAULT_ALLOW_DISK_CACHE: bool = true;

/// Default ceiling on simultaneously outstanding network fetches.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 20;

/// Lower bound for the fetch ceiling. Zero would never admit anything.
pub const MIN_CONCURRENT_FETCHES: usize = 1;

/// Upper bound for the fetch ceiling.
pub const MAX_CONCURRENT_FETCHES: usize = 256;

/// Clamps the fetch ceiling to the valid range and logs a warning if clamped.
pub fn clamp_concurrent_fetches(value: usize) -> usize {
    if value < MIN_CONCURRENT_FETCHES {
        tracing::warn!(
            requested = value,
            min = MIN_CONCURRENT_FETCHES,
            max = MAX_CONCURRENT_FETCHES,
            "max_concurrent_fetches below minimum, clamping to {}",
            MIN_CONCURRENT_FETCHES
        );
        MIN_CONCURRENT_FETCHES
    } else if value > MAX_CONCURRENT_FETCHES {
        tracing::warn!(
            requested = value,
            min = MIN_CONCURRENT_FETCHES,
            max = MAX_CONCURRENT_FETCHES,
            "max_concurrent_fetches above maximum, clamping to {}",
            MAX_CONCURRENT_FETCHES
        );
        MAX_CONCURRENT_FETCHES
    } else {
        value
    }
}

// =============================================================================
// Download defaults
// =============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 30;

/// Accept-Language header sent with every request.
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en";

/// User-Agent header sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("terrastream/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// Resource defaults
// =============================================================================

/// Default memory budget for decoded resources (512MB, RAM + GPU).
pub const DEFAULT_MEMORY_BUDGET: usize = 512 * 1024 * 1024;

/// Ticks an unheld resource that never became ready may go untouched
/// before it is dropped.
pub const DEFAULT_IDLE_TICKS: u64 = 120;

/// Texture drawn when a sub-mesh's own texture is not ready yet.
pub const DEFAULT_PLACEHOLDER_TEXTURE: &str = "data/helper.jpg";

// =============================================================================
// Search defaults
// =============================================================================

/// Geocoding endpoint; `{value}` is replaced by the encoded query.
pub const DEFAULT_SEARCH_URL: &str =
    "https://nominatim.openstreetmap.org/search?q={value}&format=json&addressdetails=1&limit=20";

/// Reference frame search positions are expressed in.
pub const DEFAULT_SEARCH_SRS: SrsType = SrsType::Geographic;

/// Whether raw search hits are deduplicated and re-ranked.
pub const DEFAULT_SEARCH_FILTERING: bool = true;

// =============================================================================
// ConfigFile::default()
// =============================================================================

impl Default for ConfigFile {
    fn default() -> Self {
        let config_dir = super::file::config_directory();

        Self {
            cache: CacheSettings {
                directory: PathBuf::from(DEFAULT_CACHE_DIRECTORY),
                allow_disk_cache: DEFAULT_ALLOW_DISK_CACHE,
                max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            },
            download: DownloadSettings {
                timeout: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
                accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            },
            resources: ResourceSettings {
                memory_budget: DEFAULT_MEMORY_BUDGET,
                idle_ticks: DEFAULT_IDLE_TICKS,
                placeholder_texture: DEFAULT_PLACEHOLDER_TEXTURE.to_string(),
            },
            search: SearchSettings {
                url: DEFAULT_SEARCH_URL.to_string(),
                srs: DEFAULT_SEARCH_SRS,
                filtering: DEFAULT_SEARCH_FILTERING,
            },
            logging: LoggingSettings {
                file: config_dir.join(DEFAULT_LOG_FILE),
            },
        }
    }
}
