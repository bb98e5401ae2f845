use super::TileId;
use crate::resource::MemoryCost;

/// Largest supported metatile binary order (256 × 256 nodes).
pub const MAX_META_BINARY_ORDER: u32 = 8;

/// Metadata for one tile: which children exist and whether it has geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MetaNode {
    flags: u8,
}

impl MetaNode {
    const GEOMETRY: u8 = 0x01;
    const UL_CHILD: u8 = 0x10;
    const UR_CHILD: u8 = 0x20;
    const LL_CHILD: u8 = 0x40;
    const LR_CHILD: u8 = 0x80;
    const CHILDREN: [u8; 4] = [
        Self::UL_CHILD,
        Self::UR_CHILD,
        Self::LL_CHILD,
        Self::LR_CHILD,
    ];

    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a raw flag byte as stored in metatile payloads.
    pub fn from_flags(flags: u8) -> Self {
        Self { flags }
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }

    pub fn with_geometry(mut self, present: bool) -> Self {
        self.set(Self::GEOMETRY, present);
        self
    }

    /// Child flags in upper-left, upper-right, lower-left, lower-right order.
    pub fn with_children(mut self, children: [bool; 4]) -> Self {
        for (bit, present) in Self::CHILDREN.iter().zip(children) {
            self.set(*bit, present);
        }
        self
    }

    pub fn with_all_children(self) -> Self {
        self.with_children([true; 4])
    }

    fn set(&mut self, bit: u8, on: bool) {
        if on {
            self.flags |= bit;
        } else {
            self.flags &= !bit;
        }
    }

    pub fn geometry(&self) -> bool {
        self.flags & Self::GEOMETRY != 0
    }

    pub fn ul_child(&self) -> bool {
        self.flags & Self::UL_CHILD != 0
    }

    pub fn ur_child(&self) -> bool {
        self.flags & Self::UR_CHILD != 0
    }

    pub fn ll_child(&self) -> bool {
        self.flags & Self::LL_CHILD != 0
    }

    pub fn lr_child(&self) -> bool {
        self.flags & Self::LR_CHILD != 0
    }

    pub fn child_flags(&self) -> [bool; 4] {
        Self::CHILDREN.map(|bit| self.flags & bit != 0)
    }

    /// Present children of `id`, in the order of [`TileId::children`].
    pub fn child_tiles(&self, id: TileId) -> impl DoubleEndedIterator<Item = TileId> {
        let flags = self.child_flags();
        let children = id.children().map_or([None; 4], |c| c.map(Some));
        children
            .into_iter()
            .zip(flags)
            .filter_map(|(child, present)| child.filter(|_| present))
    }
}

/// Node grid for a `2^b × 2^b` block of tiles at one LOD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTile {
    origin: TileId,
    binary_order: u32,
    nodes: Vec<Option<MetaNode>>,
}

impl MetaTile {
    /// An empty block containing `origin`. The origin is aligned to the
    /// block and the order is capped at [`MAX_META_BINARY_ORDER`].
    pub fn new(origin: TileId, binary_order: u32) -> Self {
        let binary_order = binary_order.min(MAX_META_BINARY_ORDER);
        let side = 1usize << binary_order;
        Self {
            origin: origin.meta_block(binary_order),
            binary_order,
            nodes: vec![None; side * side],
        }
    }

    pub fn origin(&self) -> TileId {
        self.origin
    }

    pub fn binary_order(&self) -> u32 {
        self.binary_order
    }

    fn index(&self, id: TileId) -> Option<usize> {
        if id.lod != self.origin.lod {
            return None;
        }
        let side = 1u32 << self.binary_order;
        let dx = id.x.checked_sub(self.origin.x)?;
        let dy = id.y.checked_sub(self.origin.y)?;
        (dx < side && dy < side).then(|| dy as usize * side as usize + dx as usize)
    }

    /// Store the node for `id`. Returns false if `id` lies outside the block.
    pub fn set(&mut self, id: TileId, node: MetaNode) -> bool {
        match self.index(id) {
            Some(i) => {
                self.nodes[i] = Some(node);
                true
            }
            None => false,
        }
    }

    /// Node for `id`; `None` if absent or outside the block.
    pub fn get(&self, id: TileId) -> Option<&MetaNode> {
        self.index(id).and_then(|i| self.nodes[i].as_ref())
    }

    /// Number of node slots in the block.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn memory_cost(&self) -> MemoryCost {
        MemoryCost::ram((self.nodes.len() * std::mem::size_of::<Option<MetaNode>>()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let node = MetaNode::new()
            .with_geometry(true)
            .with_children([true, false, false, true]);
        assert!(node.geometry());
        assert!(node.ul_child());
        assert!(!node.ur_child());
        assert!(!node.ll_child());
        assert!(node.lr_child());
        assert_eq!(node.flags(), 0x91);
        assert_eq!(MetaNode::from_flags(0x91), node);
    }

    #[test]
    fn test_child_tiles_filters_absent() {
        let node = MetaNode::new().with_children([false, true, true, false]);
        let children: Vec<_> = node.child_tiles(TileId::new(1, 1, 0)).collect();
        assert_eq!(children, vec![TileId::new(2, 3, 0), TileId::new(2, 2, 1)]);
    }

    #[test]
    fn test_child_tiles_empty_at_deepest_level() {
        let node = MetaNode::new().with_all_children();
        assert_eq!(node.child_tiles(TileId::new(crate::tile::MAX_LOD, 0, 0)).count(), 0);
    }

    #[test]
    fn test_metatile_lookup() {
        let mut tile = MetaTile::new(TileId::new(6, 37, 5), 2);
        assert_eq!(tile.origin(), TileId::new(6, 36, 4));
        assert_eq!(tile.node_count(), 16);

        let node = MetaNode::new().with_geometry(true);
        assert!(tile.set(TileId::new(6, 39, 7), node));
        assert_eq!(tile.get(TileId::new(6, 39, 7)), Some(&node));
        assert_eq!(tile.get(TileId::new(6, 38, 7)), None);
    }

    #[test]
    fn test_metatile_rejects_outside_block() {
        let mut tile = MetaTile::new(TileId::new(6, 36, 4), 2);
        assert!(!tile.set(TileId::new(6, 40, 4), MetaNode::new()));
        assert!(!tile.set(TileId::new(7, 36, 4), MetaNode::new()));
        assert!(!tile.set(TileId::new(6, 35, 4), MetaNode::new()));
        assert_eq!(tile.get(TileId::new(6, 40, 4)), None);
    }

    #[test]
    fn test_binary_order_is_capped() {
        let tile = MetaTile::new(TileId::ROOT, 30);
        assert_eq!(tile.binary_order(), MAX_META_BINARY_ORDER);
    }

    #[test]
    fn test_ram_cost_scales_with_nodes() {
        let small = MetaTile::new(TileId::ROOT, 1).memory_cost();
        let large = MetaTile::new(TileId::ROOT, 3).memory_cost();
        assert_eq!(large.ram, small.ram * 16);
        assert_eq!(large.gpu, 0);
    }
}
