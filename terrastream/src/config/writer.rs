//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! Produces the commented representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;
use super::size::format_size;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[cache]
; Root directory for the on-disk cache. Files are stored under <directory>/cache/
directory = {}
; Serve network resources from disk when a cached copy exists (default: true)
allow_disk_cache = {}
; Maximum simultaneously outstanding network fetches (default: 20, range 1-256)
max_concurrent_fetches = {}

[download]
; Timeout in seconds for HTTP requests (default: 30)
timeout = {}
; Accept-Language header sent with every request
accept_language = {}

[resources]
; Memory budget for decoded resources, RAM and GPU combined (default: 512MB)
; Supports: KB, MB, GB suffixes
memory_budget = {}
; Frames an unused resource that never finished loading is kept (default: 120)
idle_ticks = {}
; Texture drawn while a tile's own texture is still loading
placeholder_texture = {}

[search]
; Geocoding URL template; {{value}} is replaced by the encoded query
url = {}
; Reference frame of search results: cartesian, projected or geographic
srs = {}
; Deduplicate and re-rank raw search hits (default: true)
filtering = {}

[logging]
; Log file, truncated at the start of every run
file = {}
"#,
        path_to_string(&config.cache.directory),
        config.cache.allow_disk_cache,
        config.cache.max_concurrent_fetches,
        config.download.timeout,
        config.download.accept_language,
        format_size(config.resources.memory_budget),
        config.resources.idle_ticks,
        config.resources.placeholder_texture,
        config.search.url,
        config.search.srs,
        config.search.filtering,
        path_to_string(&config.logging.file),
    )
}

fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
