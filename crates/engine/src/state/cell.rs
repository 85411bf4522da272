use crate::capability::CapabilitySet;
use crate::registry::{BlockType, BlockTypeId};
use crate::world::block::BlockId;
use crate::world::position::{BlockPos, Direction};

/// Immutable snapshot of one world cell: where it is, its packed state id,
/// and the type that id belongs to. Property values are decoded on demand,
/// so a cell can only ever report properties its type declares.
#[derive(Debug, Clone, Copy)]
pub struct BlockCell<'r> {
    pub pos: BlockPos,
    pub id: BlockId,
    pub ty: &'r BlockType,
}

impl<'r> BlockCell<'r> {
    /// Offset of this state inside its type's id run.
    #[inline]
    pub fn offset(&self) -> u32 {
        (self.id.0 - self.ty.base.0) as u32
    }

    pub fn type_id(&self) -> BlockTypeId {
        self.ty.id
    }

    pub fn name(&self) -> &'r str {
        &self.ty.name
    }

    pub fn is_air(&self) -> bool {
        self.id == BlockId::AIR
    }

    pub fn is_type(&self, other: &BlockCell<'_>) -> bool {
        self.ty.id == other.ty.id
    }

    pub fn has(&self, property: &str) -> bool {
        self.ty.schema.contains(property)
    }

    pub fn value(&self, property: &str) -> Option<&'r str> {
        self.ty.schema.value_of(self.offset(), property)
    }

    pub fn is(&self, property: &str, value: &str) -> bool {
        self.value(property) == Some(value)
    }

    /// Boolean property, `None` when undeclared.
    pub fn flag(&self, property: &str) -> Option<bool> {
        match self.value(property)? {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    /// A direction-valued property.
    pub fn direction(&self, property: &str) -> Option<Direction> {
        self.value(property).and_then(Direction::from_name)
    }

    /// The id of this state with `property` set to `value`.
    pub fn with(&self, property: &str, value: &str) -> Option<BlockId> {
        let offset = self.ty.schema.with_value(self.offset(), property, value)?;
        Some(self.ty.state(offset))
    }

    pub fn properties(&self) -> impl Iterator<Item = (&'r str, &'r str)> + 'r {
        let ty = self.ty;
        ty.schema.values(self.offset())
    }

    pub fn capabilities(&self) -> CapabilitySet {
        self.ty.capability_set
    }
}
