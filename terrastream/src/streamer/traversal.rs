//! Per-frame quadtree traversal.

use std::collections::HashSet;
use std::sync::Arc;

use super::surface::SurfaceConfig;
use crate::config::DEFAULT_PLACEHOLDER_TEXTURE;
use crate::log::{Logger, NoOpLogger};
use crate::resource::{ContentKind, ResourceHandle, ResourceRegistry, ResourceState};
use crate::tile::{SubMesh, TileId, UrlVars};
use crate::{log_debug, log_trace};

/// Priority of resources requested by traversal.
pub const TRAVERSAL_PRIORITY: f32 = 1.0;

/// Which texture source a draw unit ended up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSource {
    /// The surface texture template (internal UVs).
    Surface,
    /// A bound layer (external UVs).
    BoundLayer,
    /// The placeholder, because the real texture is unavailable.
    Placeholder,
}

/// One thing to draw this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawUnit {
    pub tile: TileId,
    pub submesh: usize,
    pub texture: ResourceHandle,
    pub texture_name: String,
    pub source: TextureSource,
    pub transform: [f64; 16],
}

/// Counts for one traversal. Resources are counted once per traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalStats {
    pub nodes_visited: usize,
    pub pruned: usize,
    pub meta_requested: usize,
    pub meta_ready: usize,
    pub meshes_requested: usize,
    pub meshes_ready: usize,
    pub textures_requested: usize,
    pub textures_ready: usize,
    pub draw_units: usize,
}

impl TraversalStats {
    pub fn resources_requested(&self) -> usize {
        self.meta_requested + self.meshes_requested + self.textures_requested
    }

    pub fn resources_ready(&self) -> usize {
        self.meta_ready + self.meshes_ready + self.textures_ready
    }

    /// Every resource this traversal needed was ready.
    pub fn is_complete(&self) -> bool {
        self.resources_requested() == self.resources_ready()
    }

    pub fn merge(&mut self, other: &TraversalStats) {
        self.nodes_visited += other.nodes_visited;
        self.pruned += other.pruned;
        self.meta_requested += other.meta_requested;
        self.meta_ready += other.meta_ready;
        self.meshes_requested += other.meshes_requested;
        self.meshes_ready += other.meshes_ready;
        self.textures_requested += other.textures_requested;
        self.textures_ready += other.textures_ready;
        self.draw_units += other.draw_units;
    }
}

/// Output of one traversal.
#[derive(Debug, Clone, Default)]
pub struct Traversal {
    pub draws: Vec<DrawUnit>,
    pub stats: TraversalStats,
}

#[derive(Default)]
struct Seen {
    handles: HashSet<ResourceHandle>,
}

impl Seen {
    fn first(&mut self, handle: ResourceHandle) -> bool {
        self.handles.insert(handle)
    }
}

/// Selects and requests the tiles needed to draw a surface at its target
/// LOD.
///
/// Stateless between frames: every call walks from the root again and
/// prunes any branch whose metatile is not ready yet.
pub struct QuadtreeStreamer {
    placeholder_texture: String,
    logger: Arc<dyn Logger>,
}

impl QuadtreeStreamer {
    pub fn new(placeholder_texture: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self {
            placeholder_texture: placeholder_texture.into(),
            logger,
        }
    }

    pub fn placeholder_texture(&self) -> &str {
        &self.placeholder_texture
    }

    /// Walk `surface` from `root`, requesting metatiles, meshes and
    /// textures, and return what can be drawn now.
    pub fn traverse(
        &self,
        registry: &mut ResourceRegistry,
        surface: &SurfaceConfig,
        root: TileId,
    ) -> Traversal {
        let target = surface.target_lod();
        let order = surface.meta_binary_order;
        let mut out = Traversal::default();
        let mut seen = Seen::default();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            out.stats.nodes_visited += 1;

            let block = id.meta_block(order);
            let meta_name = surface.meta_url.expand(&UrlVars::new(block));
            let (meta, state) = registry.acquire(&meta_name, ContentKind::MetaTile, TRAVERSAL_PRIORITY);
            let first = seen.first(meta);
            if first {
                out.stats.meta_requested += 1;
            }
            if state != ResourceState::Ready {
                out.stats.pruned += 1;
                continue;
            }
            if first {
                out.stats.meta_ready += 1;
            }

            let Some(node) = registry.meta_tile(meta).and_then(|m| m.get(id)).copied() else {
                log_trace!(self.logger, "Tile {} has no metanode in {}", id, meta_name);
                out.stats.pruned += 1;
                continue;
            };

            if id.lod < target {
                // Reversed so children pop in upper-left .. lower-right order.
                stack.extend(node.child_tiles(id).rev());
            } else if id.lod == target && node.geometry() {
                self.emit_tile(registry, surface, id, &mut seen, &mut out);
            }
        }

        out.stats.draw_units = out.draws.len();
        log_debug!(
            self.logger,
            "Surface '{}': {} nodes, {} draws, {}/{} resources ready",
            surface.id,
            out.stats.nodes_visited,
            out.stats.draw_units,
            out.stats.resources_ready(),
            out.stats.resources_requested()
        );
        out
    }

    fn emit_tile(
        &self,
        registry: &mut ResourceRegistry,
        surface: &SurfaceConfig,
        id: TileId,
        seen: &mut Seen,
        out: &mut Traversal,
    ) {
        let mesh_name = surface.mesh_url.expand(&UrlVars::new(id));
        let (mesh, state) = registry.acquire(&mesh_name, ContentKind::Mesh, TRAVERSAL_PRIORITY);
        out.stats.meshes_requested += 1;
        if state != ResourceState::Ready {
            return;
        }
        out.stats.meshes_ready += 1;

        let Some(content) = registry.content(mesh).cloned() else {
            return;
        };
        let Some(aggregate) = content.as_mesh() else {
            return;
        };

        for (index, sub) in aggregate.submeshes.iter().enumerate() {
            let Some((name, source)) = self.texture_for(surface, id, index, sub) else {
                continue;
            };
            let (texture, state) =
                registry.acquire(&name, ContentKind::Texture, TRAVERSAL_PRIORITY);
            if seen.first(texture) {
                out.stats.textures_requested += 1;
                if state == ResourceState::Ready {
                    out.stats.textures_ready += 1;
                }
            }

            let chosen = if state == ResourceState::Ready {
                Some((texture, name, source))
            } else {
                self.placeholder(registry, seen, out)
            };
            if let Some((texture, texture_name, source)) = chosen {
                out.draws.push(DrawUnit {
                    tile: id,
                    submesh: index,
                    texture,
                    texture_name,
                    source,
                    transform: sub.norm_to_phys,
                });
            }
        }
    }

    fn texture_for(
        &self,
        surface: &SurfaceConfig,
        id: TileId,
        index: usize,
        sub: &SubMesh,
    ) -> Option<(String, TextureSource)> {
        if sub.internal_uv {
            let vars = UrlVars::with_sub(id, index as u32);
            return Some((surface.texture_url.expand(&vars), TextureSource::Surface));
        }
        if sub.external_uv {
            return match surface.bound_layers.first() {
                Some(layer) => Some((layer.url.expand(&UrlVars::new(id)), TextureSource::BoundLayer)),
                None => Some((self.placeholder_texture.clone(), TextureSource::Placeholder)),
            };
        }
        None
    }

    fn placeholder(
        &self,
        registry: &mut ResourceRegistry,
        seen: &mut Seen,
        out: &mut Traversal,
    ) -> Option<(ResourceHandle, String, TextureSource)> {
        let (handle, state) = registry.acquire(
            &self.placeholder_texture,
            ContentKind::Texture,
            TRAVERSAL_PRIORITY,
        );
        if seen.first(handle) {
            out.stats.textures_requested += 1;
            if state == ResourceState::Ready {
                out.stats.textures_ready += 1;
            }
        }
        (state == ResourceState::Ready).then(|| {
            (
                handle,
                self.placeholder_texture.clone(),
                TextureSource::Placeholder,
            )
        })
    }
}

impl Default for QuadtreeStreamer {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER_TEXTURE, Arc::new(NoOpLogger))
    }
}

impl std::fmt::Debug for QuadtreeStreamer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuadtreeStreamer")
            .field("placeholder_texture", &self.placeholder_texture)
            .finish()
    }
}
