//! Read/write seams between the behavior core and whatever stores the world.
//!
//! Queries only ever see a [`BlockView`]; the few operations that replace
//! cells or attach aux state take a [`BlockMutator`]. [`super::World`]
//! implements both, and tests can supply their own.

use super::aux_state::AuxState;
use super::block::BlockId;
use super::position::BlockPos;

/// Read access to block ids and aux state.
pub trait BlockView: Sync {
    /// The id at `pos`. Unloaded positions read as `BlockId::AIR`.
    fn get_block(&self, pos: BlockPos) -> BlockId;

    fn has_aux(&self, pos: BlockPos) -> bool;

    /// A copy of the aux state at `pos`, if any.
    fn aux_snapshot(&self, pos: BlockPos) -> Option<AuxState>;
}

/// Write access. Callers guarantee at most one in-flight mutation per
/// position.
pub trait BlockMutator: BlockView {
    fn set_block(&self, pos: BlockPos, block: BlockId);

    fn set_aux(&self, pos: BlockPos, state: AuxState);

    fn remove_aux(&self, pos: BlockPos) -> Option<AuxState>;

    /// Run `f` against the aux state at `pos`. Returns false when there is
    /// none.
    fn update_aux(&self, pos: BlockPos, f: &mut dyn FnMut(&mut AuxState)) -> bool;
}
