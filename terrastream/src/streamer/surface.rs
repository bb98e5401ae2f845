//! What a surface streams from.

use crate::tile::{UrlTemplate, MAX_LOD, MAX_META_BINARY_ORDER};

/// An external texture source for sub-meshes with external UVs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundLayer {
    pub id: String,
    pub url: UrlTemplate,
}

impl BoundLayer {
    pub fn new(id: impl Into<String>, url: &str) -> Self {
        Self {
            id: id.into(),
            url: UrlTemplate::parse(url),
        }
    }
}

/// One streamed surface: its LOD range and the URL templates of its
/// metatiles, meshes and textures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceConfig {
    pub id: String,
    /// Inclusive `(min, max)`.
    pub lod_range: (u32, u32),
    pub meta_url: UrlTemplate,
    pub mesh_url: UrlTemplate,
    pub texture_url: UrlTemplate,
    pub meta_binary_order: u32,
    pub bound_layers: Vec<BoundLayer>,
}

impl SurfaceConfig {
    pub fn new(id: impl Into<String>, meta_url: &str, mesh_url: &str, texture_url: &str) -> Self {
        Self {
            id: id.into(),
            lod_range: (0, 0),
            meta_url: UrlTemplate::parse(meta_url),
            mesh_url: UrlTemplate::parse(mesh_url),
            texture_url: UrlTemplate::parse(texture_url),
            meta_binary_order: 0,
            bound_layers: Vec::new(),
        }
    }

    /// Set the inclusive LOD range, swapping reversed bounds and capping
    /// both at [`MAX_LOD`].
    pub fn with_lod_range(mut self, min: u32, max: u32) -> Self {
        let (min, max) = (min.min(MAX_LOD), max.min(MAX_LOD));
        self.lod_range = (min.min(max), min.max(max));
        self
    }

    pub fn with_meta_binary_order(mut self, order: u32) -> Self {
        self.meta_binary_order = order.min(MAX_META_BINARY_ORDER);
        self
    }

    pub fn with_bound_layer(mut self, layer: BoundLayer) -> Self {
        self.bound_layers.push(layer);
        self
    }

    /// The single LOD this surface renders: the middle of its range.
    pub fn target_lod(&self) -> u32 {
        let (min, max) = self.lod_range;
        min + (max - min) / 2
    }
}
