pub mod access;
pub mod aux_state;
pub mod block;
pub mod chunk;
pub mod position;

use access::{BlockMutator, BlockView};
use aux_state::AuxState;
use block::BlockId;
use chunk::Chunk;
use dashmap::DashMap;
use position::{BlockPos, ChunkPos};

/// The entire block world. Thread-safe, lock-sharded by chunk.
///
/// This is the spatial substrate: packed block-state ids on a 3D lattice,
/// plus the aux records attached to entity-backed cells. What an id means
/// lives in `registry::BlockRegistry`, not here.
pub struct World {
    chunks: DashMap<ChunkPos, Chunk>,
    aux: DashMap<BlockPos, AuxState>,
}

impl World {
    pub fn new() -> Self {
        Self {
            chunks: DashMap::new(),
            aux: DashMap::new(),
        }
    }

    /// Read a block at an absolute position. Returns AIR for unloaded chunks.
    pub fn get_block(&self, pos: BlockPos) -> BlockId {
        match self.chunks.get(&pos.chunk()) {
            Some(chunk) => chunk.get_block(pos.local()),
            None => BlockId::AIR,
        }
    }

    /// Write a block at an absolute position. Creates the chunk if needed.
    pub fn set_block(&self, pos: BlockPos, block: BlockId) {
        self.chunks
            .entry(pos.chunk())
            .or_default()
            .set_block(pos.local(), block);
    }

    pub fn has_chunk(&self, pos: ChunkPos) -> bool {
        self.chunks.contains_key(&pos)
    }

    /// Insert a generated chunk, replacing any chunk already at `pos`.
    pub fn insert_chunk(&self, pos: ChunkPos, chunk: Chunk) {
        self.chunks.insert(pos, chunk);
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Iterate over all chunks. Each entry is a DashMap ref that derefs to
    /// `(ChunkPos, Chunk)`. Use `*entry.key()` and `&*entry` (value).
    pub fn iter_chunks(&self) -> dashmap::iter::Iter<'_, ChunkPos, Chunk> {
        self.chunks.iter()
    }

    // ── Aux state ────────────────────────────────────────────────────────

    pub fn get_aux(
        &self,
        pos: BlockPos,
    ) -> Option<dashmap::mapref::one::Ref<'_, BlockPos, AuxState>> {
        self.aux.get(&pos)
    }

    pub fn aux_count(&self) -> usize {
        self.aux.len()
    }

    /// Positions that currently carry aux state.
    pub fn aux_positions(&self) -> Vec<BlockPos> {
        self.aux.iter().map(|entry| *entry.key()).collect()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockView for World {
    fn get_block(&self, pos: BlockPos) -> BlockId {
        World::get_block(self, pos)
    }

    fn has_aux(&self, pos: BlockPos) -> bool {
        self.aux.contains_key(&pos)
    }

    fn aux_snapshot(&self, pos: BlockPos) -> Option<AuxState> {
        self.aux.get(&pos).map(|state| state.clone())
    }
}

impl BlockMutator for World {
    fn set_block(&self, pos: BlockPos, block: BlockId) {
        World::set_block(self, pos, block);
    }

    fn set_aux(&self, pos: BlockPos, state: AuxState) {
        self.aux.insert(pos, state);
    }

    fn remove_aux(&self, pos: BlockPos) -> Option<AuxState> {
        self.aux.remove(&pos).map(|(_, state)| state)
    }

    fn update_aux(&self, pos: BlockPos, f: &mut dyn FnMut(&mut AuxState)) -> bool {
        match self.aux.get_mut(&pos) {
            Some(mut state) => {
                f(&mut state);
                true
            }
            None => false,
        }
    }
}
