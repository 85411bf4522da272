//! The block-type registry: every type's property schema, id run,
//! behavior record and capabilities, built once at startup.

pub mod builder;
pub mod error;
pub mod global;

pub use builder::{BlockTypeDef, RegistryBuilder};
pub use error::RegistryError;

use std::collections::HashMap;

use crate::behavior::BlockBehavior;
use crate::capability::{Capabilities, CapabilitySet};
use crate::combine::CombineRule;
use crate::state::{BlockCell, StateSchema};
use crate::weathering::WeatherTable;
use crate::world::access::BlockView;
use crate::world::block::BlockId;
use crate::world::position::BlockPos;

/// Index of a registered block type. `BlockTypeId::AIR` is always type 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockTypeId(pub u16);

impl BlockTypeId {
    pub const AIR: BlockTypeId = BlockTypeId(0);
}

#[derive(Debug)]
pub struct BlockType {
    pub id: BlockTypeId,
    pub name: String,
    pub schema: StateSchema,
    /// First id of this type's run.
    pub base: BlockId,
    pub default_offset: u32,
    pub behavior: BlockBehavior,
    pub capabilities: Capabilities,
    pub capability_set: CapabilitySet,
    pub combine: Option<CombineRule>,
}

impl BlockType {
    pub fn state_count(&self) -> u32 {
        self.schema.state_count()
    }

    /// Id for the state at `offset` inside this type's run.
    #[inline]
    pub fn state(&self, offset: u32) -> BlockId {
        BlockId(self.base.0 + offset as u16)
    }

    pub fn default_state(&self) -> BlockId {
        self.state(self.default_offset)
    }

    pub fn owns(&self, id: BlockId) -> bool {
        id.0 >= self.base.0 && ((id.0 - self.base.0) as u32) < self.state_count()
    }

    pub fn is_combinable(&self) -> bool {
        self.combine.is_some()
    }
}

#[derive(Debug)]
pub struct BlockRegistry {
    types: Vec<BlockType>,
    by_name: HashMap<String, BlockTypeId>,
    /// Owning type of every state id, indexed by `BlockId`.
    owners: Vec<BlockTypeId>,
    pub(crate) weather: WeatherTable,
}

impl BlockRegistry {
    pub(crate) fn from_parts(types: Vec<BlockType>, weather: WeatherTable) -> Self {
        let by_name = types.iter().map(|t| (t.name.clone(), t.id)).collect();
        let mut owners = Vec::new();
        for ty in &types {
            owners.extend(std::iter::repeat_n(ty.id, ty.state_count() as usize));
        }
        Self {
            types,
            by_name,
            owners,
            weather,
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Total number of state ids handed out.
    pub fn state_count(&self) -> usize {
        self.owners.len()
    }

    pub fn types(&self) -> impl Iterator<Item = &BlockType> {
        self.types.iter()
    }

    #[inline]
    pub fn get(&self, id: BlockTypeId) -> Option<&BlockType> {
        self.types.get(id.0 as usize)
    }

    pub fn id_by_name(&self, name: &str) -> Option<BlockTypeId> {
        self.by_name.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&BlockType> {
        self.id_by_name(name).and_then(|id| self.get(id))
    }

    pub fn air(&self) -> &BlockType {
        &self.types[BlockTypeId::AIR.0 as usize]
    }

    /// The type owning `state`. Ids outside the registered range read as
    /// air, the same way unloaded chunks do.
    pub fn type_of(&self, state: BlockId) -> &BlockType {
        match self.owners.get(state.index()) {
            Some(&id) => &self.types[id.0 as usize],
            None => {
                tracing::warn!("state id {} is not registered; reading as air", state.0);
                self.air()
            }
        }
    }

    /// Decode `state` at `pos` into a cell.
    pub fn cell(&self, pos: BlockPos, state: BlockId) -> BlockCell<'_> {
        let ty = self.type_of(state);
        let id = if ty.owns(state) { state } else { BlockId::AIR };
        BlockCell { pos, id, ty }
    }

    /// Read the cell at `pos` from `view`.
    pub fn cell_at(&self, view: &dyn BlockView, pos: BlockPos) -> BlockCell<'_> {
        self.cell(pos, view.get_block(pos))
    }

    pub fn default_state(&self, name: &str) -> Option<BlockId> {
        self.by_name(name).map(BlockType::default_state)
    }

    /// The state of `name` with `values` applied over its default. `None`
    /// for unknown types, properties or values.
    pub fn state(&self, name: &str, values: &[(&str, &str)]) -> Option<BlockId> {
        let ty = self.by_name(name)?;
        let offset = ty
            .schema
            .pack(ty.default_offset, values.iter().copied())?;
        Some(ty.state(offset))
    }
}
