//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use terrastream::cache::{Cache, CacheConfig};
use terrastream::fetch::{FetchCompletion, FetchError, Fetcher};
use terrastream::log::NoOpLogger;
use terrastream::resource::{ContentDecoder, DecodeError};
use terrastream::tile::{MeshAggregate, MetaNode, MetaTile, SubMesh, Texture, TileId};

/// A transport completed by hand.
///
/// Every `fetch` is recorded and parked until the test calls
/// [`complete`](Self::complete) or [`fail`](Self::fail).
#[derive(Default)]
pub struct ManualFetcher {
    requested: Mutex<Vec<String>>,
    parked: Mutex<Vec<(String, FetchCompletion)>>,
}

impl ManualFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every name ever fetched, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    /// Names fetched but not yet completed.
    pub fn pending(&self) -> Vec<String> {
        self.parked
            .lock()
            .unwrap()
            .iter()
            .map(|(n, _)| n.clone())
            .collect()
    }

    pub fn complete(&self, name: &str, data: impl Into<Vec<u8>>) -> bool {
        self.finish(name, Ok(data.into()))
    }

    pub fn fail(&self, name: &str) -> bool {
        self.finish(
            name,
            Err(FetchError::Status {
                url: name.to_string(),
                status: 404,
            }),
        )
    }

    fn finish(&self, name: &str, result: Result<Vec<u8>, FetchError>) -> bool {
        let mut parked = self.parked.lock().unwrap();
        let Some(pos) = parked.iter().position(|(n, _)| n == name) else {
            return false;
        };
        let (name, completion) = parked.remove(pos);
        completion.complete(&name, result);
        true
    }
}

impl Fetcher for ManualFetcher {
    fn fetch(&self, name: &str, completion: FetchCompletion) {
        self.requested.lock().unwrap().push(name.to_string());
        self.parked
            .lock()
            .unwrap()
            .push((name.to_string(), completion));
    }
}

pub fn network_cache(config: CacheConfig, fetcher: &Arc<ManualFetcher>) -> Cache {
    Cache::new(config, fetcher.clone(), Arc::new(NoOpLogger))
}

/// Plain-text stand-ins for the binary formats.
///
/// Metatiles: a header `lod x y order`, then `lod x y flags` per node.
/// Meshes: one char per sub-mesh, `i` internal or `e` external UVs.
/// Textures: `width height`, defaulting to 1x1.
pub struct TextDecoder;

fn numbers(line: &str) -> Vec<u32> {
    line.split_whitespace()
        .filter_map(|v| v.parse().ok())
        .collect()
}

impl ContentDecoder for TextDecoder {
    fn decode_meta_tile(&self, name: &str, data: &[u8]) -> Result<MetaTile, DecodeError> {
        let text = String::from_utf8_lossy(data);
        let mut lines = text.lines();
        let header = numbers(lines.next().unwrap_or_default());
        let [lod, x, y, order] = header[..] else {
            return Err(DecodeError::new(name, "bad metatile header"));
        };
        let mut tile = MetaTile::new(TileId::new(lod, x, y), order);
        for line in lines {
            if let [lod, x, y, flags] = numbers(line)[..] {
                tile.set(TileId::new(lod, x, y), MetaNode::from_flags(flags as u8));
            }
        }
        Ok(tile)
    }

    fn decode_mesh(&self, name: &str, data: &[u8]) -> Result<MeshAggregate, DecodeError> {
        data.iter()
            .map(|c| match c {
                b'i' => Ok(SubMesh::internal()),
                b'e' => Ok(SubMesh::external()),
                _ => Err(DecodeError::new(name, "bad sub-mesh kind")),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(MeshAggregate::new)
    }

    fn decode_texture(&self, _name: &str, data: &[u8]) -> Result<Texture, DecodeError> {
        let dims = numbers(&String::from_utf8_lossy(data));
        match dims[..] {
            [w, h] => Ok(Texture::new(w, h, 4)),
            _ => Ok(Texture::new(1, 1, 4)),
        }
    }
}

pub fn meta_text(block: TileId, order: u32, nodes: &[(TileId, MetaNode)]) -> String {
    let mut text = format!("{} {} {} {}\n", block.lod, block.x, block.y, order);
    for (id, node) in nodes {
        text.push_str(&format!("{} {} {} {}\n", id.lod, id.x, id.y, node.flags()));
    }
    text
}
