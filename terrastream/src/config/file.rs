//! Configuration file handling for ~/.terrastream/config.ini.
//!
//! Settings structs live in [`super::settings`], constants in [`super::defaults`],
//! parsing in [`super::parser`], and serialization in [`super::writer`].

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use super::settings::*;

use super::download::DownloadConfig;
use crate::cache::CacheConfig;
use crate::resource::RegistryConfig;
use crate::search::SearchConfig;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path (~/.terrastream/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to a specific path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Render the file as it would be saved.
    pub fn to_ini_string(&self) -> String {
        super::writer::to_config_string(self)
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new(&self.cache.directory)
            .with_disk_cache(self.cache.allow_disk_cache)
            .with_max_concurrent_fetches(self.cache.max_concurrent_fetches)
    }

    pub fn download_config(&self) -> DownloadConfig {
        DownloadConfig::new()
            .with_timeout_secs(self.download.timeout)
            .with_accept_language(self.download.accept_language.clone())
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig::new()
            .with_memory_budget(self.resources.memory_budget as u64)
            .with_idle_ticks(self.resources.idle_ticks)
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig::new(self.search.url.clone(), self.search.srs)
            .with_filtering(self.search.filtering)
    }
}

/// Get the path to the config directory (~/.terrastream).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".terrastream")
}

/// Get the path to the config file (~/.terrastream/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
