//! Quadtree streaming.
//!
//! Each frame the [`QuadtreeStreamer`] walks a surface's tile tree from the
//! root with an explicit work stack. A node is expanded only once its
//! metatile is ready; the walk stops at the surface's target LOD, where the
//! mesh and its textures are requested and [`DrawUnit`]s are emitted for
//! whatever is ready.

mod surface;
mod traversal;

pub use surface::{BoundLayer, SurfaceConfig};
pub use traversal::{
    DrawUnit, QuadtreeStreamer, TextureSource, Traversal, TraversalStats, TRAVERSAL_PRIORITY,
};
