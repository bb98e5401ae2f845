//! Cache statistics tracking and reporting.

use std::time::Instant;

/// Counters describing where cache reads were served from.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Local (non-network) files read.
    pub local_reads: u64,
    /// Network names served from the disk cache.
    pub disk_hits: u64,
    /// Network fetches issued.
    pub downloads_started: u64,
    /// Network fetches that delivered bytes.
    pub downloads_completed: u64,
    /// Network fetches that failed.
    pub download_failures: u64,
    /// Admissions refused because the fetch ceiling was reached.
    pub deferred_admissions: u64,
    /// Fetched buffers persisted to disk.
    pub disk_writes: u64,
    pub disk_write_failures: u64,
    /// Local or disk-cache reads that failed.
    pub read_failures: u64,
    pub bytes_downloaded: u64,
    pub created_at: Instant,
}

impl Default for CacheStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStats {
    pub fn new() -> Self {
        Self {
            local_reads: 0,
            disk_hits: 0,
            downloads_started: 0,
            downloads_completed: 0,
            download_failures: 0,
            deferred_admissions: 0,
            disk_writes: 0,
            disk_write_failures: 0,
            read_failures: 0,
            bytes_downloaded: 0,
            created_at: Instant::now(),
        }
    }

    /// Share of network-named resources served from disk (0.0 to 1.0).
    pub fn disk_hit_rate(&self) -> f64 {
        let total = self.disk_hits + self.downloads_started;
        if total == 0 {
            0.0
        } else {
            self.disk_hits as f64 / total as f64
        }
    }

    pub fn uptime(&self) -> std::time::Duration {
        self.created_at.elapsed()
    }

    pub fn record_local_read(&mut self) {
        self.local_reads += 1;
    }

    pub fn record_disk_hit(&mut self) {
        self.disk_hits += 1;
    }

    pub fn record_download_started(&mut self) {
        self.downloads_started += 1;
    }

    pub fn record_download(&mut self, bytes: usize) {
        self.downloads_completed += 1;
        self.bytes_downloaded += bytes as u64;
    }

    pub fn record_download_failure(&mut self) {
        self.download_failures += 1;
    }

    pub fn record_deferred(&mut self) {
        self.deferred_admissions += 1;
    }

    pub fn record_disk_write(&mut self) {
        self.disk_writes += 1;
    }

    pub fn record_disk_write_failure(&mut self) {
        self.disk_write_failures += 1;
    }

    pub fn record_read_failure(&mut self) {
        self.read_failures += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stats_are_zero() {
        let stats = CacheStats::new();
        assert_eq!(stats.disk_hits, 0);
        assert_eq!(stats.downloads_started, 0);
        assert_eq!(stats.disk_hit_rate(), 0.0);
    }

    #[test]
    fn test_disk_hit_rate() {
        let mut stats = CacheStats::new();
        stats.record_disk_hit();
        stats.record_disk_hit();
        stats.record_disk_hit();
        stats.record_download_started();
        assert!((stats.disk_hit_rate() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_record_download_accumulates_bytes() {
        let mut stats = CacheStats::new();
        stats.record_download(100);
        stats.record_download(28);
        assert_eq!(stats.downloads_completed, 2);
        assert_eq!(stats.bytes_downloaded, 128);
    }
}
