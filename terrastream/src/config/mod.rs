//! Configuration for terrastream components.
//!
//! The INI file (`~/.terrastream/config.ini`) is loaded into a [`ConfigFile`],
//! which converts into the typed configs each component takes at construction:
//!
//! ```
//! use terrastream::config::ConfigFile;
//!
//! let file = ConfigFile::default();
//! let cache = file.cache_config();
//! assert_eq!(cache.max_concurrent_fetches(), 20);
//! ```

mod defaults;
mod download;
mod file;
mod parser;
mod settings;
mod size;
mod writer;

pub use defaults::*;
pub use download::DownloadConfig;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    CacheSettings, ConfigFile, DownloadSettings, LoggingSettings, ResourceSettings,
    SearchSettings,
};
pub use size::{describe_size, format_size, parse_size, SizeParseError};
