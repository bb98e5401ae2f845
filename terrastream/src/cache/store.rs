//! The polled resource cache.

use bytes::Bytes;
use std::collections::HashMap;
use std::path::Path;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;

use super::disk;
use super::name::is_network_name;
use super::stats::CacheStats;
use super::types::{CacheConfig, CacheError, CacheRead, EntryStatus};
use crate::fetch::{completion_channel, FetchCompletion, FetchReply, Fetcher};
use crate::log::{Logger, NoOpLogger};
use crate::{log_debug, log_trace, log_warn};

#[derive(Debug)]
enum EntryState {
    Uninitialized,
    Downloading,
    Ready(Bytes),
    Done(Bytes),
    Error(CacheError),
}

impl EntryState {
    fn status(&self) -> EntryStatus {
        match self {
            EntryState::Uninitialized => EntryStatus::Uninitialized,
            EntryState::Downloading => EntryStatus::Downloading,
            EntryState::Ready(_) => EntryStatus::Ready,
            EntryState::Done(_) => EntryStatus::Done,
            EntryState::Error(_) => EntryStatus::Error,
        }
    }
}

/// Keyed byte store with bounded concurrent fetches and a disk-cache tier.
///
/// Every call happens on the owning thread. Network results arrive through
/// the completion channel and are applied by [`Cache::pump`], which `read`
/// calls first.
///
/// Per name, the first `read` decides the source:
/// - local path: read synchronously
/// - network name with a disk copy (and disk cache allowed): read from disk
/// - otherwise: fetch, if fewer than `max_concurrent_fetches` are outstanding
///
/// A refused admission leaves the entry `Uninitialized` so the next read
/// tries again. Failures are terminal until [`Cache::reset`].
pub struct Cache {
    config: CacheConfig,
    entries: HashMap<String, EntryState>,
    fetcher: Option<Arc<dyn Fetcher>>,
    completion: FetchCompletion,
    replies: Receiver<FetchReply>,
    outstanding: usize,
    stats: CacheStats,
    logger: Arc<dyn Logger>,
}

impl Cache {
    pub fn new(config: CacheConfig, fetcher: Arc<dyn Fetcher>, logger: Arc<dyn Logger>) -> Self {
        Self::build(config, Some(fetcher), logger)
    }

    /// A cache with no transport: local and disk-cached names only.
    /// Network names without a disk copy fail.
    pub fn offline(config: CacheConfig, logger: Arc<dyn Logger>) -> Self {
        Self::build(config, None, logger)
    }

    /// Offline cache with a discarding logger, rooted at `root`.
    pub fn local(root: impl Into<std::path::PathBuf>) -> Self {
        Self::offline(CacheConfig::new(root), Arc::new(NoOpLogger))
    }

    fn build(
        config: CacheConfig,
        fetcher: Option<Arc<dyn Fetcher>>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let (completion, replies) = completion_channel();
        Self {
            config,
            entries: HashMap::new(),
            fetcher,
            completion,
            replies,
            outstanding: 0,
            stats: CacheStats::new(),
            logger,
        }
    }

    /// Read `name`, starting its load on first sight.
    pub fn read(&mut self, name: &str) -> CacheRead {
        self.pump();

        let needs_admission = matches!(
            self.entries.get(name),
            None | Some(EntryState::Uninitialized)
        );
        if needs_admission {
            let state = self.admit(name);
            self.entries.insert(name.to_string(), state);
        }

        let Some(state) = self.entries.get_mut(name) else {
            return CacheRead::Uninitialized;
        };
        match state {
            EntryState::Ready(data) => {
                let data = data.clone();
                *state = EntryState::Done(data.clone());
                CacheRead::Ready(data)
            }
            EntryState::Done(data) => CacheRead::Done(data.clone()),
            EntryState::Downloading => CacheRead::Downloading,
            EntryState::Error(_) => CacheRead::Error,
            EntryState::Uninitialized => CacheRead::Uninitialized,
        }
    }

    fn admit(&mut self, name: &str) -> EntryState {
        if !is_network_name(name) {
            return match disk::read_file(Path::new(name)) {
                Ok(data) => {
                    self.stats.record_local_read();
                    EntryState::Ready(data)
                }
                Err(e) => {
                    self.stats.record_read_failure();
                    log_warn!(self.logger, "Failed to read local resource '{}': {}", name, e);
                    EntryState::Error(e)
                }
            };
        }

        let disk_path = self.config.disk_path(name);
        if self.config.allow_disk_cache() && disk_path.exists() {
            return match disk::read_file(&disk_path) {
                Ok(data) => {
                    self.stats.record_disk_hit();
                    log_trace!(self.logger, "Disk cache hit for '{}'", name);
                    EntryState::Ready(data)
                }
                Err(e) => {
                    self.stats.record_read_failure();
                    log_warn!(self.logger, "Failed to read disk cache for '{}': {}", name, e);
                    EntryState::Error(e)
                }
            };
        }

        let Some(fetcher) = self.fetcher.as_ref() else {
            let err = CacheError::Fetch {
                name: name.to_string(),
                reason: "no fetch transport configured".to_string(),
            };
            log_warn!(self.logger, "{}", err);
            return EntryState::Error(err);
        };

        if self.outstanding >= self.config.max_concurrent_fetches() {
            self.stats.record_deferred();
            return EntryState::Uninitialized;
        }

        self.outstanding += 1;
        self.stats.record_download_started();
        log_debug!(
            self.logger,
            "Fetching '{}' ({} outstanding)",
            name,
            self.outstanding
        );
        fetcher.fetch(name, self.completion.clone());
        EntryState::Downloading
    }

    /// Apply every completed fetch waiting in the channel.
    ///
    /// Returns the number of replies applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.replies.try_recv() {
                Ok(reply) => {
                    self.apply(reply);
                    applied += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    fn apply(&mut self, reply: FetchReply) {
        self.outstanding = self.outstanding.saturating_sub(1);

        let state = match reply.result {
            Ok(data) => {
                self.stats.record_download(data.len());
                let path = self.config.disk_path(&reply.name);
                match disk::write_file(&path, &data) {
                    Ok(()) => {
                        self.stats.record_disk_write();
                        EntryState::Ready(data)
                    }
                    Err(e) => {
                        self.stats.record_disk_write_failure();
                        log_warn!(
                            self.logger,
                            "Failed to persist '{}' to disk cache: {}",
                            reply.name,
                            e
                        );
                        EntryState::Error(e)
                    }
                }
            }
            Err(e) => {
                self.stats.record_download_failure();
                log_warn!(self.logger, "Fetch of '{}' failed: {}", reply.name, e);
                EntryState::Error(CacheError::Fetch {
                    name: reply.name.clone(),
                    reason: e.to_string(),
                })
            }
        };

        self.entries.insert(reply.name, state);
    }

    /// Current status without triggering a load.
    pub fn status(&self, name: &str) -> EntryStatus {
        self.entries
            .get(name)
            .map(EntryState::status)
            .unwrap_or(EntryStatus::Uninitialized)
    }

    /// The failure recorded for `name`, if it is in `Error`.
    pub fn error(&self, name: &str) -> Option<&CacheError> {
        match self.entries.get(name) {
            Some(EntryState::Error(e)) => Some(e),
            _ => None,
        }
    }

    /// Forget `name` so the next read starts over.
    ///
    /// Refused (returns false) while a fetch for it is in flight.
    pub fn reset(&mut self, name: &str) -> bool {
        match self.entries.get(name) {
            Some(EntryState::Downloading) => false,
            Some(_) => {
                self.entries.remove(name);
                true
            }
            None => true,
        }
    }

    /// Number of network fetches issued and not yet applied.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("config", &self.config)
            .field("entries", &self.entries.len())
            .field("outstanding", &self.outstanding)
            .finish()
    }
}
