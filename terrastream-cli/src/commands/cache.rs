//! Cache management CLI commands.

use clap::Subcommand;
use terrastream::cache::{clear_disk_cache, disk_cache_stats};
use terrastream::config::{describe_size, ConfigFile};

use crate::error::CliError;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Clear the disk cache, removing every cached resource
    Clear,
    /// Show disk cache statistics
    Stats,
}

/// Run a cache subcommand.
pub fn run(action: CacheAction) -> Result<(), CliError> {
    let config = ConfigFile::load().unwrap_or_default();
    let root = &config.cache.directory;

    match action {
        CacheAction::Clear => {
            println!("Clearing disk cache under: {}", root.display());
            let result = clear_disk_cache(root)?;
            println!(
                "Deleted {} files, freed {}",
                result.files_deleted,
                describe_size(result.bytes_freed)
            );
        }
        CacheAction::Stats => {
            println!("Disk cache under: {}", root.display());
            let summary = disk_cache_stats(root)?;
            println!("  Files: {}", summary.files);
            println!("  Size:  {}", describe_size(summary.bytes));
        }
    }
    Ok(())
}
