//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::defaults::clamp_concurrent_fetches;
use super::file::ConfigFileError;
use super::settings::ConfigFile;
use super::size::parse_size;

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.cache.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("allow_disk_cache") {
            config.cache.allow_disk_cache = parse_bool(v)
                .ok_or_else(|| invalid("cache", "allow_disk_cache", v, "must be true or false"))?;
        }
        if let Some(v) = section.get("max_concurrent_fetches") {
            let n: usize = v.trim().parse().map_err(|_| {
                invalid(
                    "cache",
                    "max_concurrent_fetches",
                    v,
                    "must be a positive integer",
                )
            })?;
            config.cache.max_concurrent_fetches = clamp_concurrent_fetches(n);
        }
    }

    // [download] section
    if let Some(section) = ini.section(Some("download")) {
        if let Some(v) = section.get("timeout") {
            config.download.timeout = v
                .trim()
                .parse()
                .map_err(|_| invalid("download", "timeout", v, "must be a positive integer (seconds)"))?;
        }
        if let Some(v) = section.get("accept_language") {
            let v = v.trim();
            if !v.is_empty() {
                config.download.accept_language = v.to_string();
            }
        }
    }

    // [resources] section
    if let Some(section) = ini.section(Some("resources")) {
        if let Some(v) = section.get("memory_budget") {
            config.resources.memory_budget = parse_size(v).map_err(|_| {
                invalid(
                    "resources",
                    "memory_budget",
                    v,
                    "expected format like '512MB', '2GB', or '1024KB'",
                )
            })?;
        }
        if let Some(v) = section.get("idle_ticks") {
            config.resources.idle_ticks = v.trim().parse().map_err(|_| {
                invalid("resources", "idle_ticks", v, "expected a whole number of ticks")
            })?;
        }
        if let Some(v) = section.get("placeholder_texture") {
            let v = v.trim();
            if !v.is_empty() {
                config.resources.placeholder_texture = v.to_string();
            }
        }
    }

    // [search] section
    if let Some(section) = ini.section(Some("search")) {
        if let Some(v) = section.get("url") {
            let v = v.trim();
            if !v.is_empty() {
                if !v.contains("{value}") {
                    return Err(invalid(
                        "search",
                        "url",
                        v,
                        "must contain the {value} placeholder",
                    ));
                }
                config.search.url = v.to_string();
            }
        }
        if let Some(v) = section.get("srs") {
            config.search.srs = v.trim().parse().map_err(|_| {
                invalid(
                    "search",
                    "srs",
                    v,
                    "must be one of: cartesian, projected, geographic",
                )
            })?;
        }
        if let Some(v) = section.get("filtering") {
            config.search.filtering = parse_bool(v)
                .ok_or_else(|| invalid("search", "filtering", v, "must be true or false"))?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

/// Parse a boolean value; `None` if it is not recognizable.
pub(super) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
