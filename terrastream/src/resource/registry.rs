//! Arena of named resources layered over the byte cache.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use super::content::{decode_content, Content, ContentDecoder, DecodeError, UnsupportedDecoder};
use super::types::{ContentKind, MemoryCost, ResourceHandle, ResourceRef, ResourceState};
use crate::cache::{Cache, CacheError, CacheRead};
use crate::config::{DEFAULT_IDLE_TICKS, DEFAULT_MEMORY_BUDGET};
use crate::log::{Logger, NoOpLogger};
use crate::tile::{MeshAggregate, MetaTile, Texture};
use crate::{log_debug, log_error, log_trace};

/// Why a resource ended in `Error`.
#[derive(Debug, Clone, Error)]
pub enum ResourceError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Registry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    memory_budget: u64,
    idle_ticks: u64,
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self {
            memory_budget: DEFAULT_MEMORY_BUDGET as u64,
            idle_ticks: DEFAULT_IDLE_TICKS,
        }
    }

    /// Combined RAM and GPU bytes the registry keeps before evicting.
    pub fn with_memory_budget(mut self, bytes: u64) -> Self {
        self.memory_budget = bytes;
        self
    }

    pub fn memory_budget(&self) -> u64 {
        self.memory_budget
    }

    /// Ticks an unheld resource that is not `Ready` may stay untouched
    /// before `collect` drops it.
    pub fn with_idle_ticks(mut self, ticks: u64) -> Self {
        self.idle_ticks = ticks;
        self
    }

    pub fn idle_ticks(&self) -> u64 {
        self.idle_ticks
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub created: u64,
    pub decoded: u64,
    pub decode_failures: u64,
    pub load_failures: u64,
    pub evicted_released: u64,
    pub evicted_budget: u64,
    pub evicted_idle: u64,
}

impl RegistryStats {
    pub fn evicted(&self) -> u64 {
        self.evicted_released + self.evicted_budget + self.evicted_idle
    }
}

#[derive(Debug)]
enum Payload {
    Uninitialized,
    Downloading,
    Ready(Arc<Content>),
    Error(ResourceError),
}

impl Payload {
    fn state(&self) -> ResourceState {
        match self {
            Payload::Uninitialized => ResourceState::Uninitialized,
            Payload::Downloading => ResourceState::Downloading,
            Payload::Ready(_) => ResourceState::Ready,
            Payload::Error(_) => ResourceState::Error,
        }
    }
}

#[derive(Debug)]
struct Resource {
    name: String,
    kind: ContentKind,
    priority: f32,
    last_touched: u64,
    payload: Payload,
    cost: MemoryCost,
    token: Arc<()>,
    /// Set once a `ResourceRef` has been handed out.
    ever_held: bool,
}

impl Resource {
    fn holders(&self) -> usize {
        Arc::strong_count(&self.token) - 1
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    resource: Option<Resource>,
}

/// Per-name resource lifecycle over a [`Cache`].
///
/// Resources live in an arena indexed by [`ResourceHandle`]. `request`
/// creates or refreshes a resource; `poll` advances it from the cache and
/// decodes the bytes once they arrive. `Ready` and `Error` are absorbing.
///
/// Memory is reclaimed by [`collect`](Self::collect), once per tick:
/// - resources whose last [`ResourceRef`] was dropped go immediately;
/// - unheld resources that never became `Ready` (pending or failed) go
///   once untouched for more than the configured idle ticks;
/// - while the `Ready` total exceeds the budget, unheld `Ready` resources
///   not touched this tick go, least recently touched first.
pub struct ResourceRegistry {
    config: RegistryConfig,
    cache: Cache,
    decoder: Arc<dyn ContentDecoder>,
    slots: Vec<Slot>,
    free: Vec<u32>,
    by_name: HashMap<String, ResourceHandle>,
    tick: u64,
    usage: MemoryCost,
    stats: RegistryStats,
    logger: Arc<dyn Logger>,
}

impl ResourceRegistry {
    pub fn new(
        config: RegistryConfig,
        cache: Cache,
        decoder: Arc<dyn ContentDecoder>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            config,
            cache,
            decoder,
            slots: Vec::new(),
            free: Vec::new(),
            by_name: HashMap::new(),
            tick: 0,
            usage: MemoryCost::ZERO,
            stats: RegistryStats::default(),
            logger,
        }
    }

    /// Registry that can only decode JSON, with a discarding logger.
    pub fn json_only(cache: Cache) -> Self {
        Self::new(
            RegistryConfig::default(),
            cache,
            Arc::new(UnsupportedDecoder),
            Arc::new(NoOpLogger),
        )
    }

    /// Find or create the resource for `name`.
    ///
    /// An existing resource keeps its original kind, takes the larger of
    /// the two priorities and is touched.
    pub fn request(&mut self, name: &str, kind: ContentKind, priority: f32) -> ResourceHandle {
        let tick = self.tick;
        if let Some(&handle) = self.by_name.get(name) {
            if let Some(res) = self.resource_mut(handle) {
                res.priority = res.priority.max(priority);
                res.last_touched = tick;
                return handle;
            }
        }

        let resource = Resource {
            name: name.to_string(),
            kind,
            priority,
            last_touched: tick,
            payload: Payload::Uninitialized,
            cost: MemoryCost::ZERO,
            token: Arc::new(()),
            ever_held: false,
        };
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.resource = Some(resource);
                ResourceHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    resource: Some(resource),
                });
                ResourceHandle {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };
        self.by_name.insert(name.to_string(), handle);
        self.stats.created += 1;
        log_trace!(self.logger, "Resource '{}' created ({:?})", name, kind);
        handle
    }

    /// Advance the resource from the cache. Stale handles report
    /// `Uninitialized`.
    pub fn poll(&mut self, handle: ResourceHandle) -> ResourceState {
        let Some(slot) = self.slots.get_mut(handle.index as usize) else {
            return ResourceState::Uninitialized;
        };
        if slot.generation != handle.generation {
            return ResourceState::Uninitialized;
        }
        let Some(res) = slot.resource.as_mut() else {
            return ResourceState::Uninitialized;
        };
        if matches!(res.payload, Payload::Ready(_) | Payload::Error(_)) {
            return res.payload.state();
        }

        match self.cache.read(&res.name) {
            CacheRead::Uninitialized | CacheRead::Downloading => {
                res.payload = Payload::Downloading;
            }
            CacheRead::Error => {
                let err = self.cache.error(&res.name).cloned().unwrap_or_else(|| {
                    CacheError::Fetch {
                        name: res.name.clone(),
                        reason: "unknown cache failure".to_string(),
                    }
                });
                log_error!(self.logger, "Resource '{}' failed to load: {}", res.name, err);
                self.stats.load_failures += 1;
                res.payload = Payload::Error(err.into());
            }
            // Done only reaches here for a resource recreated after eviction.
            CacheRead::Ready(data) | CacheRead::Done(data) => {
                match decode_content(self.decoder.as_ref(), res.kind, &res.name, &data) {
                    Ok(content) => {
                        res.cost = content.memory_cost(data.len());
                        self.usage += res.cost;
                        self.stats.decoded += 1;
                        log_debug!(
                            self.logger,
                            "Resource '{}' ready (ram {} B, gpu {} B)",
                            res.name,
                            res.cost.ram,
                            res.cost.gpu
                        );
                        res.payload = Payload::Ready(Arc::new(content));
                    }
                    Err(err) => {
                        log_error!(self.logger, "Resource '{}' failed to decode: {}", res.name, err);
                        self.stats.decode_failures += 1;
                        res.payload = Payload::Error(err.into());
                    }
                }
            }
        }
        res.payload.state()
    }

    /// `request` followed by `poll`.
    pub fn acquire(
        &mut self,
        name: &str,
        kind: ContentKind,
        priority: f32,
    ) -> (ResourceHandle, ResourceState) {
        let handle = self.request(name, kind, priority);
        let state = self.poll(handle);
        (handle, state)
    }

    /// Mark the resource as used this tick.
    pub fn touch(&mut self, handle: ResourceHandle) {
        let tick = self.tick;
        if let Some(res) = self.resource_mut(handle) {
            res.last_touched = tick;
        }
    }

    /// Take a strong hold. Held resources are never evicted; once the last
    /// hold drops the resource is released at the next `collect`.
    pub fn hold(&mut self, handle: ResourceHandle) -> Option<ResourceRef> {
        let res = self.resource_mut(handle)?;
        res.ever_held = true;
        Some(ResourceRef::new(handle, Arc::clone(&res.token)))
    }

    pub fn find(&self, name: &str) -> Option<ResourceHandle> {
        self.by_name.get(name).copied()
    }

    pub fn state(&self, handle: ResourceHandle) -> ResourceState {
        self.resource(handle)
            .map_or(ResourceState::Uninitialized, |r| r.payload.state())
    }

    pub fn content(&self, handle: ResourceHandle) -> Option<&Arc<Content>> {
        match &self.resource(handle)?.payload {
            Payload::Ready(content) => Some(content),
            _ => None,
        }
    }

    pub fn meta_tile(&self, handle: ResourceHandle) -> Option<&MetaTile> {
        self.content(handle)?.as_meta_tile()
    }

    pub fn mesh(&self, handle: ResourceHandle) -> Option<&MeshAggregate> {
        self.content(handle)?.as_mesh()
    }

    pub fn texture(&self, handle: ResourceHandle) -> Option<&Texture> {
        self.content(handle)?.as_texture()
    }

    pub fn json(&self, handle: ResourceHandle) -> Option<&serde_json::Value> {
        self.content(handle)?.as_json()
    }

    pub fn error(&self, handle: ResourceHandle) -> Option<&ResourceError> {
        match &self.resource(handle)?.payload {
            Payload::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn name(&self, handle: ResourceHandle) -> Option<&str> {
        self.resource(handle).map(|r| r.name.as_str())
    }

    pub fn priority(&self, handle: ResourceHandle) -> Option<f32> {
        self.resource(handle).map(|r| r.priority)
    }

    pub fn memory_cost(&self, handle: ResourceHandle) -> Option<MemoryCost> {
        self.resource(handle).map(|r| r.cost)
    }

    /// Start a new tick; touches after this count as "this tick".
    pub fn begin_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Evict released and idle resources, then enforce the memory budget.
    /// Returns the number of resources evicted.
    pub fn collect(&mut self) -> usize {
        let released: Vec<u32> = self
            .live()
            .filter(|(_, r)| r.ever_held && r.holders() == 0)
            .map(|(i, _)| i)
            .collect();
        for &index in &released {
            self.evict(index);
        }
        self.stats.evicted_released += released.len() as u64;

        let (tick, idle_ticks) = (self.tick, self.config.idle_ticks);
        let idle: Vec<u32> = self
            .live()
            .filter(|(_, r)| {
                !matches!(r.payload, Payload::Ready(_))
                    && r.holders() == 0
                    && tick.saturating_sub(r.last_touched) > idle_ticks
            })
            .map(|(i, _)| i)
            .collect();
        for &index in &idle {
            self.evict(index);
        }
        self.stats.evicted_idle += idle.len() as u64;

        let budget = self.config.memory_budget;
        let mut evicted = 0;
        if self.usage.total() > budget {
            let tick = self.tick;
            let mut candidates: Vec<(u64, u32)> = self
                .live()
                .filter(|(_, r)| {
                    matches!(r.payload, Payload::Ready(_))
                        && r.holders() == 0
                        && r.last_touched < tick
                })
                .map(|(i, r)| (r.last_touched, i))
                .collect();
            candidates.sort_unstable();
            for (_, index) in candidates {
                if self.usage.total() <= budget {
                    break;
                }
                self.evict(index);
                evicted += 1;
            }
            self.stats.evicted_budget += evicted as u64;
            if self.usage.total() > budget {
                log_debug!(
                    self.logger,
                    "Memory budget exceeded by resources in use ({} > {} bytes)",
                    self.usage.total(),
                    budget
                );
            }
        }
        released.len() + idle.len() + evicted
    }

    /// Combined cost of every `Ready` resource.
    pub fn memory_usage(&self) -> MemoryCost {
        self.usage
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn stats(&self) -> &RegistryStats {
        &self.stats
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut Cache {
        &mut self.cache
    }

    fn resource(&self, handle: ResourceHandle) -> Option<&Resource> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.resource.as_ref()
    }

    fn resource_mut(&mut self, handle: ResourceHandle) -> Option<&mut Resource> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.resource.as_mut()
    }

    fn live(&self) -> impl Iterator<Item = (u32, &Resource)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.resource.as_ref().map(|r| (i as u32, r)))
    }

    fn evict(&mut self, index: u32) {
        let slot = &mut self.slots[index as usize];
        let Some(res) = slot.resource.take() else {
            return;
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        self.by_name.remove(&res.name);
        if matches!(res.payload, Payload::Ready(_)) {
            self.usage = self.usage - res.cost;
        }
        log_trace!(self.logger, "Resource '{}' evicted", res.name);
    }
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("resources", &self.by_name.len())
            .field("tick", &self.tick)
            .field("usage", &self.usage)
            .field("config", &self.config)
            .finish()
    }
}
