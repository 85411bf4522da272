use crate::world::block::BlockId;
use crate::world::position::{BlockPos, ChunkPos};
use slotmap::new_key_type;

new_key_type! {
    /// Unique handle for a node in the causal graph.
    pub struct EventId;
}

/// A single, atomic change to the world -- the fundamental unit of causality.
#[derive(Debug, Clone)]
pub struct Event {
    pub payload: EventPayload,
}

/// What happened.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// A cell was replaced (placement, pairing update, weathering, ...).
    BlockSet {
        pos: BlockPos,
        old: BlockId,
        new: BlockId,
    },

    /// A cell's neighbors changed and it should re-check itself.
    BlockNotify { pos: BlockPos },

    /// A random tick landed on a cell. `roll` is uniform in `0.0..1.0`,
    /// sampled by whoever scheduled the tick so rules stay deterministic.
    RandomTick { pos: BlockPos, roll: f32 },
}

impl EventPayload {
    pub fn pos(&self) -> BlockPos {
        match self {
            EventPayload::BlockSet { pos, .. }
            | EventPayload::BlockNotify { pos }
            | EventPayload::RandomTick { pos, .. } => *pos,
        }
    }
}

impl Event {
    pub fn new(payload: EventPayload) -> Self {
        Self { payload }
    }

    /// The chunk this event primarily affects (used for parallel grouping).
    pub fn chunk(&self) -> ChunkPos {
        self.payload.pos().chunk()
    }
}
