//! World-change event bus.
//!
//! Every cascade that modifies the world (block interaction, ambient
//! simulation) publishes a [`WorldChangeBatch`] to a shared
//! `tokio::sync::broadcast` channel. Subscribers such as the demo logger
//! each see every batch.

use std::sync::Arc;

use tessera_engine::world::block::BlockId;
use tessera_engine::world::position::BlockPos;

/// Recommended capacity for the broadcast channel.
pub const BUS_CAPACITY: usize = 256;

/// Identifies where a batch of world changes originated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeSource {
    /// Someone placed, broke or used a block.
    Interaction,
    /// An ambient simulation layer.
    Simulation(&'static str),
}

/// A batch of block changes from a single cascade.
///
/// Uses `Arc<[...]>` so cloning per broadcast subscriber is just a refcount bump.
#[derive(Clone, Debug)]
pub struct WorldChangeBatch {
    pub source: ChangeSource,
    pub changes: Arc<[(BlockPos, BlockId)]>,
}

impl WorldChangeBatch {
    pub fn new(source: ChangeSource, changes: Vec<(BlockPos, BlockId)>) -> Self {
        Self {
            source,
            changes: changes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
