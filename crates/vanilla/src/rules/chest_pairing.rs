//! Keeps double chests consistent with their neighbors.
//!
//! A freshly placed single chest pairs with a single chest of the same type
//! and facing beside it; a half whose partner stops pointing back falls back
//! to single. Works for every combinable type, reading property names from
//! its `CombineRule`.

use tessera_engine::causal::event::{Event, EventPayload};
use tessera_engine::combine::{orientation, Pairing};
use tessera_engine::registry::BlockRegistry;
use tessera_engine::state::BlockCell;
use tessera_engine::world::block::BlockId;
use tessera_engine::world::position::BlockPos;
use tessera_engine::world::World;

use super::helpers::{notify_horizontal, replace, type_changed};

pub fn chest_pairing(
    world: &World,
    registry: &BlockRegistry,
    payload: &EventPayload,
) -> Vec<Event> {
    match *payload {
        EventPayload::BlockSet { pos, old, new } => on_set(world, registry, pos, old, new),
        EventPayload::BlockNotify { pos } => on_notify(world, registry, pos),
        EventPayload::RandomTick { .. } => Vec::new(),
    }
}

fn on_set(
    world: &World,
    registry: &BlockRegistry,
    pos: BlockPos,
    old: BlockId,
    new: BlockId,
) -> Vec<Event> {
    if !type_changed(registry, old, new) {
        // A half that claimed this cell as its partner may have been
        // abandoned; let it check.
        return if pairing_changed(registry, pos, old, new) {
            notify_horizontal(pos)
        } else {
            Vec::new()
        };
    }
    let mut events = Vec::new();
    if registry.type_of(old).is_combinable() {
        events.extend(notify_horizontal(pos));
    }
    let cell = registry.cell_at(world, pos);
    if cell.id == new {
        events.extend(pair_on_placement(world, registry, &cell));
    }
    events
}

fn pairing_changed(registry: &BlockRegistry, pos: BlockPos, old: BlockId, new: BlockId) -> bool {
    let pairing = |id| orientation(&registry.cell(pos, id)).map(|(_, pairing)| pairing);
    registry.type_of(new).is_combinable() && pairing(old) != pairing(new)
}

/// Pair a single chest with a waiting single neighbor, preferring the one
/// clockwise of its facing (which makes the new chest the left half).
fn pair_on_placement(world: &World, registry: &BlockRegistry, cell: &BlockCell<'_>) -> Vec<Event> {
    let Some(rule) = &cell.ty.combine else {
        return Vec::new();
    };
    let Some((facing, Pairing::Single)) = orientation(cell) else {
        return Vec::new();
    };

    for own in [Pairing::Left, Pairing::Right] {
        let Some(dir) = own.partner_direction(facing) else {
            continue;
        };
        let neighbor = registry.cell_at(world, cell.pos.offset(dir));
        if !neighbor.is_type(cell) || orientation(&neighbor) != Some((facing, Pairing::Single)) {
            continue;
        }
        let own_state = cell.with(&rule.pairing, own.name());
        let partner_state = neighbor.with(&rule.pairing, own.complement().name());
        if let (Some(a), Some(b)) = (own_state, partner_state) {
            tracing::trace!("pairing {:?} with {:?}", cell.pos, neighbor.pos);
            return vec![replace(cell, a), replace(&neighbor, b)];
        }
    }
    Vec::new()
}

fn on_notify(world: &World, registry: &BlockRegistry, pos: BlockPos) -> Vec<Event> {
    let cell = registry.cell_at(world, pos);
    let (Some(rule), Some((facing, pairing))) = (&cell.ty.combine, orientation(&cell)) else {
        return Vec::new();
    };
    let Some(dir) = pairing.partner_direction(facing) else {
        return Vec::new();
    };

    let partner = registry.cell_at(world, pos.offset(dir));
    if partner.is_type(&cell) && orientation(&partner) == Some((facing, pairing.complement())) {
        return Vec::new();
    }
    match cell.with(&rule.pairing, Pairing::Single.name()) {
        Some(single) => {
            tracing::trace!("{:?} lost its partner", pos);
            vec![replace(&cell, single)]
        }
        None => Vec::new(),
    }
}
