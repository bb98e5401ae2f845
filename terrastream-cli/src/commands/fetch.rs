//! Fetch command - load resources through the cache, warming the disk copy.

use terrastream::cache::CacheRead;
use terrastream::config::describe_size;
use tracing::{info, warn};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the fetch command.
pub fn run(names: &[String], verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("fetch");
    let mut cache = runner.network_cache()?;

    let mut results: Vec<Option<CacheRead>> = vec![None; names.len()];
    runner.poll_until("downloads", || {
        for (name, slot) in names.iter().zip(results.iter_mut()) {
            if slot.is_none() {
                let read = cache.read(name);
                if !read.status().is_pending() {
                    *slot = Some(read);
                }
            }
        }
        results.iter().all(Option::is_some)
    })?;

    let mut failed = 0;
    for (name, read) in names.iter().zip(&results) {
        match read.as_ref().and_then(CacheRead::data) {
            Some(data) => {
                info!(name = %name, bytes = data.len(), "Fetched");
                println!("✓ {} ({})", name, describe_size(data.len() as u64));
            }
            None => {
                failed += 1;
                let reason = cache
                    .error(name)
                    .map_or_else(|| "unknown error".to_string(), |e| e.to_string());
                warn!(name = %name, error = %reason, "Fetch failed");
                println!("✗ {}: {}", name, reason);
            }
        }
    }

    let stats = cache.stats();
    println!();
    println!(
        "Downloaded {} ({}), {} from disk cache, {} local",
        stats.downloads_completed,
        describe_size(stats.bytes_downloaded),
        stats.disk_hits,
        stats.local_reads
    );

    if failed > 0 {
        return Err(CliError::Fetch {
            failed,
            total: names.len(),
        });
    }
    Ok(())
}
