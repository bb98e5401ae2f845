//! Typed resources over the byte cache.
//!
//! Every piece of streamed content (metatiles, meshes, textures, JSON
//! documents) goes through the same lifecycle:
//!
//! ```text
//! Uninitialized -> Downloading -> Ready
//!                              -> Error
//! ```
//!
//! The [`ResourceRegistry`] owns the resources in an arena and hands out
//! generation-checked [`ResourceHandle`]s. Decoding of binary formats is
//! delegated to a host-supplied [`ContentDecoder`].

mod content;
mod registry;
mod types;

pub use content::{decode_content, Content, ContentDecoder, DecodeError, UnsupportedDecoder};
pub use registry::{RegistryConfig, RegistryStats, ResourceError, ResourceRegistry};
pub use types::{ContentKind, MemoryCost, ResourceHandle, ResourceRef, ResourceState};
