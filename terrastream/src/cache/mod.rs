//! Resource cache: named byte buffers loaded from local files, the on-disk
//! cache, or the network.
//!
//! - [`to_cache_path`]: resource name → cache path mapping
//! - [`Cache`]: polled per-key state machine with a fetch ceiling
//! - [`disk_cache_stats`] / [`clear_disk_cache`]: disk-cache maintenance

mod disk;
mod name;
mod stats;
mod store;
mod types;

pub use disk::{clear_disk_cache, disk_cache_stats, ClearResult, DiskCacheSummary};
pub use name::{is_network_name, to_cache_path, CACHE_DIR};
pub use stats::CacheStats;
pub use store::Cache;
pub use types::{CacheConfig, CacheError, CacheRead, EntryStatus};
