//! Integration tests for the polled cache.
//!
//! These tests drive the cache through a hand-completed transport:
//! - delivered-once semantics for network names
//! - the concurrent fetch ceiling
//! - the on-disk mirror (writes and hits)
//! - terminal failures and caller-driven retry

mod common;

use std::fs;

use common::{network_cache, ManualFetcher};
use tempfile::TempDir;
use terrastream::cache::{to_cache_path, CacheConfig, CacheRead, EntryStatus};

const URL: &str = "https://tiles.example/terrain/3-1-2.meta";

// =============================================================================
// Delivery
// =============================================================================

#[test]
fn test_network_read_downloads_then_delivers_once() {
    let dir = TempDir::new().unwrap();
    let fetcher = ManualFetcher::new();
    let mut cache = network_cache(CacheConfig::new(dir.path()), &fetcher);

    assert_eq!(cache.read(URL), CacheRead::Downloading);
    assert_eq!(cache.read(URL), CacheRead::Downloading);
    assert_eq!(fetcher.requests(), [URL]);

    assert!(fetcher.complete(URL, b"payload".to_vec()));
    let first = cache.read(URL);
    assert_eq!(first.status(), EntryStatus::Ready);

    for _ in 0..3 {
        let again = cache.read(URL);
        assert_eq!(again.status(), EntryStatus::Done);
        assert_eq!(again.data(), first.data());
    }
    assert_eq!(cache.outstanding(), 0);
    assert_eq!(fetcher.requests().len(), 1);
}

#[test]
fn test_fetched_bytes_persisted_at_cache_path() {
    let dir = TempDir::new().unwrap();
    let fetcher = ManualFetcher::new();
    let mut cache = network_cache(CacheConfig::new(dir.path()), &fetcher);

    cache.read(URL);
    fetcher.complete(URL, b"raw bytes".to_vec());
    cache.pump();

    let path = dir.path().join(to_cache_path(URL));
    assert!(path.ends_with("cache/tiles.example/terrain/3-1-2.meta"));
    assert_eq!(fs::read(path).unwrap(), b"raw bytes");
    assert_eq!(cache.stats().disk_writes, 1);
}

// =============================================================================
// Concurrency ceiling
// =============================================================================

#[test]
fn test_ceiling_bounds_outstanding_fetches() {
    let dir = TempDir::new().unwrap();
    let fetcher = ManualFetcher::new();
    let config = CacheConfig::new(dir.path()).with_max_concurrent_fetches(3);
    let mut cache = network_cache(config, &fetcher);
    let names: Vec<String> = (0..10)
        .map(|i| format!("https://tiles.example/{}.mesh", i))
        .collect();

    for name in &names {
        cache.read(name);
        assert!(fetcher.pending().len() <= 3);
    }
    assert_eq!(cache.outstanding(), 3);
    assert_eq!(cache.status(&names[5]), EntryStatus::Uninitialized);
    assert_eq!(cache.stats().deferred_admissions, 7);

    // Drain in bursts; the bound holds the whole way through.
    for _ in 0..names.len() {
        for name in fetcher.pending() {
            fetcher.complete(&name, b"x".to_vec());
        }
        for name in &names {
            cache.read(name);
            assert!(cache.outstanding() <= 3);
            assert!(fetcher.pending().len() <= 3);
        }
    }
    assert!(names
        .iter()
        .all(|n| cache.status(n) == EntryStatus::Done));
    assert_eq!(fetcher.requests().len(), 10);
}

#[test]
fn test_failure_frees_a_slot() {
    let dir = TempDir::new().unwrap();
    let fetcher = ManualFetcher::new();
    let config = CacheConfig::new(dir.path()).with_max_concurrent_fetches(1);
    let mut cache = network_cache(config, &fetcher);

    cache.read("https://h/a");
    assert_eq!(cache.read("https://h/b"), CacheRead::Uninitialized);

    fetcher.fail("https://h/a");
    assert_eq!(cache.read("https://h/b"), CacheRead::Downloading);
    assert_eq!(cache.status("https://h/a"), EntryStatus::Error);
}

// =============================================================================
// Disk mirror
// =============================================================================

#[test]
fn test_disk_copy_served_without_fetch() {
    let dir = TempDir::new().unwrap();
    let config = CacheConfig::new(dir.path());
    let path = config.disk_path(URL);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, b"from disk").unwrap();

    let fetcher = ManualFetcher::new();
    let mut cache = network_cache(config, &fetcher);

    let read = cache.read(URL);
    assert_eq!(read.status(), EntryStatus::Ready);
    assert_eq!(read.data().unwrap().as_ref(), b"from disk");
    assert!(fetcher.requests().is_empty());
    assert_eq!(cache.stats().disk_hits, 1);
}

#[test]
fn test_disk_copy_ignored_when_disabled() {
    let dir = TempDir::new().unwrap();
    let config = CacheConfig::new(dir.path()).with_disk_cache(false);
    let path = config.disk_path(URL);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, b"stale").unwrap();

    let fetcher = ManualFetcher::new();
    let mut cache = network_cache(config, &fetcher);

    assert_eq!(cache.read(URL), CacheRead::Downloading);
    fetcher.complete(URL, b"fresh".to_vec());
    assert_eq!(cache.read(URL).data().unwrap().as_ref(), b"fresh");
    // Still written through for later sessions.
    assert_eq!(fs::read(&path).unwrap(), b"fresh");
}

#[test]
fn test_second_session_reuses_first_sessions_download() {
    let dir = TempDir::new().unwrap();
    let fetcher = ManualFetcher::new();
    {
        let mut cache = network_cache(CacheConfig::new(dir.path()), &fetcher);
        cache.read(URL);
        fetcher.complete(URL, b"once".to_vec());
        cache.pump();
    }

    let mut cache = network_cache(CacheConfig::new(dir.path()), &fetcher);
    assert_eq!(cache.read(URL).data().unwrap().as_ref(), b"once");
    assert_eq!(fetcher.requests().len(), 1);
}

// =============================================================================
// Failure and retry
// =============================================================================

#[test]
fn test_error_is_terminal_until_reset() {
    let dir = TempDir::new().unwrap();
    let fetcher = ManualFetcher::new();
    let mut cache = network_cache(CacheConfig::new(dir.path()), &fetcher);

    cache.read(URL);
    fetcher.fail(URL);
    assert_eq!(cache.read(URL), CacheRead::Error);
    assert_eq!(cache.read(URL), CacheRead::Error);
    assert!(cache.error(URL).unwrap().to_string().contains("404"));
    assert_eq!(fetcher.requests().len(), 1);

    assert!(cache.reset(URL));
    assert_eq!(cache.read(URL), CacheRead::Downloading);
    assert_eq!(fetcher.requests().len(), 2);
}
