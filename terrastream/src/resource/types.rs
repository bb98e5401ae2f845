//! Handles, states and memory accounting for registry resources.

use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use std::sync::Arc;

/// Lifecycle of a resource. `Ready` and `Error` are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceState {
    Uninitialized,
    Downloading,
    Ready,
    Error,
}

impl ResourceState {
    pub fn is_ready(self) -> bool {
        self == ResourceState::Ready
    }

    /// Neither ready nor failed yet.
    pub fn is_pending(self) -> bool {
        matches!(
            self,
            ResourceState::Uninitialized | ResourceState::Downloading
        )
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceState::Uninitialized => "uninitialized",
            ResourceState::Downloading => "downloading",
            ResourceState::Ready => "ready",
            ResourceState::Error => "error",
        })
    }
}

/// Which decoder turns a resource's bytes into content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    MetaTile,
    Mesh,
    Texture,
    Json,
}

/// Estimated memory held by a decoded resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemoryCost {
    pub ram: u64,
    pub gpu: u64,
}

impl MemoryCost {
    pub const ZERO: MemoryCost = MemoryCost { ram: 0, gpu: 0 };

    pub fn ram(bytes: u64) -> Self {
        Self { ram: bytes, gpu: 0 }
    }

    pub fn gpu(bytes: u64) -> Self {
        Self { ram: 0, gpu: bytes }
    }

    /// RAM and GPU combined; the registry budget is checked against this.
    pub fn total(&self) -> u64 {
        self.ram + self.gpu
    }
}

impl Add for MemoryCost {
    type Output = MemoryCost;

    fn add(self, rhs: MemoryCost) -> MemoryCost {
        MemoryCost {
            ram: self.ram + rhs.ram,
            gpu: self.gpu + rhs.gpu,
        }
    }
}

impl AddAssign for MemoryCost {
    fn add_assign(&mut self, rhs: MemoryCost) {
        *self = *self + rhs;
    }
}

impl Sub for MemoryCost {
    type Output = MemoryCost;

    fn sub(self, rhs: MemoryCost) -> MemoryCost {
        MemoryCost {
            ram: self.ram.saturating_sub(rhs.ram),
            gpu: self.gpu.saturating_sub(rhs.gpu),
        }
    }
}

/// Index into the registry arena plus the generation it was issued for.
///
/// A handle outlives its resource harmlessly: once the slot is reused the
/// generation no longer matches and lookups report nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// A strong hold on a resource.
///
/// While any clone is alive the registry will not evict the resource. Once
/// the last one is dropped the resource is released at the next collection.
#[derive(Debug, Clone)]
pub struct ResourceRef {
    handle: ResourceHandle,
    _token: Arc<()>,
}

impl ResourceRef {
    pub(crate) fn new(handle: ResourceHandle, token: Arc<()>) -> Self {
        Self {
            handle,
            _token: token,
        }
    }

    pub fn handle(&self) -> ResourceHandle {
        self.handle
    }
}
