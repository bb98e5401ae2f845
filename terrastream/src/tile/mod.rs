//! Tile data model shared by the registry and the streamer.
//!
//! - [`TileId`]: quadtree address `(lod, x, y)`
//! - [`MetaTile`] / [`MetaNode`]: child-existence and geometry flags for a
//!   `2^b × 2^b` block of tiles, fetched as one resource
//! - [`MeshAggregate`] / [`SubMesh`]: decoded tile geometry
//! - [`Texture`]: decoded image
//! - [`UrlTemplate`]: per-tile resource URL expansion

mod id;
mod mesh;
mod meta;
mod texture;
mod url;

pub use id::{TileId, MAX_LOD};
pub use mesh::{normalized_to_physical, MeshAggregate, SubMesh, IDENTITY_TRANSFORM};
pub use meta::{MetaNode, MetaTile, MAX_META_BINARY_ORDER};
pub use texture::Texture;
pub use url::{resolve_url, UrlTemplate, UrlVars};
