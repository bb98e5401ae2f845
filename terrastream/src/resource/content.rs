//! Decoded resource payloads and the decoder seam.

use thiserror::Error;

use super::types::{ContentKind, MemoryCost};
use crate::tile::{MeshAggregate, MetaTile, Texture};

/// Payload failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to decode '{name}': {reason}")]
pub struct DecodeError {
    pub name: String,
    pub reason: String,
}

impl DecodeError {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// A decoded resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    MetaTile(MetaTile),
    Mesh(MeshAggregate),
    Texture(Texture),
    Json(serde_json::Value),
}

impl Content {
    pub fn kind(&self) -> ContentKind {
        match self {
            Content::MetaTile(_) => ContentKind::MetaTile,
            Content::Mesh(_) => ContentKind::Mesh,
            Content::Texture(_) => ContentKind::Texture,
            Content::Json(_) => ContentKind::Json,
        }
    }

    pub fn memory_cost(&self, encoded_len: usize) -> MemoryCost {
        match self {
            Content::MetaTile(m) => m.memory_cost(),
            Content::Mesh(m) => m.memory_cost(),
            Content::Texture(t) => t.memory_cost(),
            Content::Json(_) => MemoryCost::ram(encoded_len as u64),
        }
    }

    pub fn as_meta_tile(&self) -> Option<&MetaTile> {
        match self {
            Content::MetaTile(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_mesh(&self) -> Option<&MeshAggregate> {
        match self {
            Content::Mesh(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_texture(&self) -> Option<&Texture> {
        match self {
            Content::Texture(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Content::Json(v) => Some(v),
            _ => None,
        }
    }
}

/// Binary decoders supplied by the host (metatile, mesh and image formats).
pub trait ContentDecoder: Send + Sync {
    fn decode_meta_tile(&self, name: &str, data: &[u8]) -> Result<MetaTile, DecodeError>;
    fn decode_mesh(&self, name: &str, data: &[u8]) -> Result<MeshAggregate, DecodeError>;
    fn decode_texture(&self, name: &str, data: &[u8]) -> Result<Texture, DecodeError>;
}

/// Decoder for hosts that only load JSON (search, configuration); every
/// binary kind fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedDecoder;

impl ContentDecoder for UnsupportedDecoder {
    fn decode_meta_tile(&self, name: &str, _data: &[u8]) -> Result<MetaTile, DecodeError> {
        Err(DecodeError::new(name, "no metatile decoder installed"))
    }

    fn decode_mesh(&self, name: &str, _data: &[u8]) -> Result<MeshAggregate, DecodeError> {
        Err(DecodeError::new(name, "no mesh decoder installed"))
    }

    fn decode_texture(&self, name: &str, _data: &[u8]) -> Result<Texture, DecodeError> {
        Err(DecodeError::new(name, "no texture decoder installed"))
    }
}

/// Decode `data` as `kind`. JSON is handled here; binary kinds go to `decoder`.
pub fn decode_content(
    decoder: &dyn ContentDecoder,
    kind: ContentKind,
    name: &str,
    data: &[u8],
) -> Result<Content, DecodeError> {
    match kind {
        ContentKind::MetaTile => decoder.decode_meta_tile(name, data).map(Content::MetaTile),
        ContentKind::Mesh => decoder.decode_mesh(name, data).map(Content::Mesh),
        ContentKind::Texture => decoder.decode_texture(name, data).map(Content::Texture),
        ContentKind::Json => serde_json::from_slice(data)
            .map(Content::Json)
            .map_err(|e| DecodeError::new(name, e.to_string())),
    }
}
