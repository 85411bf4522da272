//! Event construction helpers to reduce boilerplate in rule implementations.

use tessera_engine::causal::event::{Event, EventPayload};
use tessera_engine::registry::BlockRegistry;
use tessera_engine::state::BlockCell;
use tessera_engine::world::block::BlockId;
use tessera_engine::world::position::BlockPos;

// ── Event constructors ───────────────────────────────────────────────────

/// Create a `BlockSet` event.
pub fn block_set(pos: BlockPos, old: BlockId, new: BlockId) -> Event {
    Event::new(EventPayload::BlockSet { pos, old, new })
}

/// Replace `cell` with `new`.
pub fn replace(cell: &BlockCell<'_>, new: BlockId) -> Event {
    block_set(cell.pos, cell.id, new)
}

/// Create a `BlockNotify` event.
pub fn notify(pos: BlockPos) -> Event {
    Event::new(EventPayload::BlockNotify { pos })
}

/// Create a `RandomTick` event.
pub fn random_tick(pos: BlockPos, roll: f32) -> Event {
    Event::new(EventPayload::RandomTick { pos, roll })
}

// ── Batch notify helpers ─────────────────────────────────────────────────

/// Notify the 4 horizontal neighbors (±X, ±Z).
pub fn notify_horizontal(pos: BlockPos) -> Vec<Event> {
    pos.horizontal_neighbors().into_iter().map(notify).collect()
}

// ── Payload helpers ──────────────────────────────────────────────────────

/// For a `BlockSet`, whether the block type at the position changed (as
/// opposed to a state change within one type).
pub fn type_changed(registry: &BlockRegistry, old: BlockId, new: BlockId) -> bool {
    registry.type_of(old).id != registry.type_of(new).id
}
