/// Packed block-state identifier. The world stores these without
/// interpreting them; `registry::BlockRegistry` decodes an id into its block
/// type and property values.
///
/// The only semantic the storage layer enforces is that `BlockId::AIR` (0)
/// is the "empty" block: chunk sections filled entirely with AIR are
/// deallocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct BlockId(pub u16);

impl BlockId {
    /// The universal "empty" block.
    pub const AIR: BlockId = BlockId(0);

    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}
