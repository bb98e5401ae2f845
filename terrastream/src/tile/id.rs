use std::fmt;

/// Deepest level whose tile coordinates still fit in a `u32`.
pub const MAX_LOD: u32 = 32;

/// Address of a node in the tile quadtree.
///
/// Children of `(lod, x, y)` are `(lod + 1, 2x + {0,1}, 2y + {0,1})`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId {
    pub lod: u32,
    pub x: u32,
    pub y: u32,
}

impl TileId {
    /// The root of every tree.
    pub const ROOT: TileId = TileId { lod: 0, x: 0, y: 0 };

    pub const fn new(lod: u32, x: u32, y: u32) -> Self {
        Self { lod, x, y }
    }

    /// Children in upper-left, upper-right, lower-left, lower-right order.
    /// `None` once the children would not be addressable.
    pub fn children(&self) -> Option<[TileId; 4]> {
        if self.lod >= MAX_LOD {
            return None;
        }
        let lod = self.lod + 1;
        let x = self.x.checked_mul(2)?;
        let y = self.y.checked_mul(2)?;
        Some([
            TileId::new(lod, x, y),
            TileId::new(lod, x | 1, y),
            TileId::new(lod, x, y | 1),
            TileId::new(lod, x | 1, y | 1),
        ])
    }

    pub fn parent(&self) -> Option<TileId> {
        (self.lod > 0).then(|| TileId::new(self.lod - 1, self.x / 2, self.y / 2))
    }

    /// Origin of the `2^binary_order` metatile block containing this tile.
    pub fn meta_block(&self, binary_order: u32) -> TileId {
        let mask = u32::MAX.checked_shl(binary_order).unwrap_or(0);
        TileId::new(self.lod, self.x & mask, self.y & mask)
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.lod, self.x, self.y)
    }
}
