//! Optional behavior contracts a block type opts into at registration.
//!
//! Each type carries a [`Capabilities`] record (a struct of optional
//! strategy objects) plus the [`CapabilitySet`] bit-set derived from it.
//! Absence is never an error: every lookup answers with `None` or `false`.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use serde::Deserialize;

use crate::causal::event::EventPayload;
use crate::registry::BlockRegistry;
use crate::state::BlockCell;
use crate::weathering::WeatherBinding;
use crate::world::access::{BlockMutator, BlockView};
use crate::world::aux_state::{AuxKind, AuxState};
use crate::world::block::BlockId;
use crate::world::position::BlockPos;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CapabilitySet: u8 {
        const ENTITY_BACKED = 1;
        const LIQUID_CONTAINER = 1 << 1;
        const SHEARABLE = 1 << 2;
        const WEATHERING = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    EntityBacked,
    LiquidContainer,
    Shearable,
    Weathering,
}

impl CapabilityKind {
    pub const fn flag(self) -> CapabilitySet {
        match self {
            CapabilityKind::EntityBacked => CapabilitySet::ENTITY_BACKED,
            CapabilityKind::LiquidContainer => CapabilitySet::LIQUID_CONTAINER,
            CapabilityKind::Shearable => CapabilitySet::SHEARABLE,
            CapabilityKind::Weathering => CapabilitySet::WEATHERING,
        }
    }
}

/// Advances an aux record by one game tick.
pub type Ticker = fn(&BlockCell<'_>, &mut AuxState);

/// Reacts to world events near the owning cell.
#[derive(Debug, Clone, Copy)]
pub struct EventListener {
    /// Taxicab radius around the owning cell.
    pub radius: i64,
    /// Returns true when the event was consumed.
    pub on_event: fn(&mut AuxState, &EventPayload) -> bool,
}

/// Types that need a per-instance aux record.
pub trait EntityBacked: Send + Sync {
    fn new_aux_state(&self, cell: &BlockCell<'_>) -> Option<AuxState>;

    fn ticker_for(&self, _cell: &BlockCell<'_>, _kind: AuxKind) -> Option<Ticker> {
        None
    }

    fn listener_for(&self, _aux: &AuxState) -> Option<EventListener> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FluidKind {
    Water,
    Lava,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FluidState {
    pub kind: FluidKind,
    /// 0 is a source; higher levels are flowing.
    pub level: u8,
}

impl FluidState {
    pub const fn source(kind: FluidKind) -> Self {
        Self { kind, level: 0 }
    }

    pub const fn is_source(&self) -> bool {
        self.level == 0
    }
}

/// Types that can hold a fluid inside their own cell.
pub trait LiquidContainer: Send + Sync {
    fn can_accept_fluid(&self, view: &dyn BlockView, cell: &BlockCell<'_>, fluid: FluidKind)
    -> bool;

    /// Replace the cell with its fluid-holding state. Returns whether the
    /// placement happened.
    fn accept_fluid(
        &self,
        world: &dyn BlockMutator,
        cell: &BlockCell<'_>,
        fluid: FluidState,
    ) -> bool;
}

/// Per-type capability record, fixed once the registry is built.
#[derive(Clone, Default)]
pub struct Capabilities {
    pub entity: Option<Arc<dyn EntityBacked>>,
    pub liquid: Option<Arc<dyn LiquidContainer>>,
    pub shearable: bool,
    pub weathering: Option<WeatherBinding>,
}

impl Capabilities {
    pub fn set(&self) -> CapabilitySet {
        let mut set = CapabilitySet::empty();
        set.set(CapabilitySet::ENTITY_BACKED, self.entity.is_some());
        set.set(CapabilitySet::LIQUID_CONTAINER, self.liquid.is_some());
        set.set(CapabilitySet::SHEARABLE, self.shearable);
        set.set(CapabilitySet::WEATHERING, self.weathering.is_some());
        set
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("entity", &self.entity.is_some())
            .field("liquid", &self.liquid.is_some())
            .field("shearable", &self.shearable)
            .field("weathering", &self.weathering)
            .finish()
    }
}

// ── Registry-level queries ───────────────────────────────────────────────

impl BlockRegistry {
    pub fn has_capability(&self, cell: &BlockCell<'_>, kind: CapabilityKind) -> bool {
        cell.ty.capability_set.contains(kind.flag())
    }

    pub fn entity_backed<'a>(&self, cell: &BlockCell<'a>) -> Option<&'a dyn EntityBacked> {
        cell.ty.capabilities.entity.as_deref()
    }

    pub fn liquid_container<'a>(&self, cell: &BlockCell<'a>) -> Option<&'a dyn LiquidContainer> {
        cell.ty.capabilities.liquid.as_deref()
    }

    pub fn is_shearable(&self, cell: &BlockCell<'_>) -> bool {
        cell.ty.capabilities.shearable
    }
}

/// Keep the aux record at `pos` consistent after its cell changed from `old`
/// to `new`. A state change within the same type keeps the record; a type
/// change drops it and asks the new type for a fresh one.
pub fn refresh_aux_state(
    world: &dyn BlockMutator,
    registry: &BlockRegistry,
    pos: BlockPos,
    old: BlockId,
    new: BlockId,
) {
    let new_cell = registry.cell(pos, new);
    let same_type = registry.type_of(old).id == new_cell.ty.id;
    if same_type && world.has_aux(pos) {
        return;
    }
    if !same_type {
        world.remove_aux(pos);
    }
    if let Some(entity) = registry.entity_backed(&new_cell) {
        if let Some(state) = entity.new_aux_state(&new_cell) {
            world.set_aux(pos, state);
        }
    }
}

/// Run the ticker of every entity-backed cell once. Returns how many
/// records were ticked.
pub fn tick_aux_states(
    world: &dyn BlockMutator,
    registry: &BlockRegistry,
    positions: &[BlockPos],
) -> usize {
    let mut ticked = 0;
    for &pos in positions {
        let cell = registry.cell(pos, world.get_block(pos));
        let Some(entity) = registry.entity_backed(&cell) else {
            continue;
        };
        let Some(kind) = world.aux_snapshot(pos).map(|aux| aux.kind) else {
            continue;
        };
        if let Some(ticker) = entity.ticker_for(&cell, kind) {
            if world.update_aux(pos, &mut |aux| ticker(&cell, aux)) {
                ticked += 1;
            }
        }
    }
    ticked
}

/// Offer `payload` to every listener within range of it. Returns how many
/// listeners consumed it.
pub fn dispatch_to_listeners(
    world: &dyn BlockMutator,
    registry: &BlockRegistry,
    positions: &[BlockPos],
    payload: &EventPayload,
) -> usize {
    let origin = payload.pos();
    let mut consumed = 0;
    for &pos in positions {
        let cell = registry.cell(pos, world.get_block(pos));
        let Some(entity) = registry.entity_backed(&cell) else {
            continue;
        };
        let Some(listener) = world
            .aux_snapshot(pos)
            .and_then(|aux| entity.listener_for(&aux))
        else {
            continue;
        };
        if pos.manhattan(&origin) > listener.radius {
            continue;
        }
        let mut hit = false;
        world.update_aux(pos, &mut |aux| hit = (listener.on_event)(aux, payload));
        if hit {
            consumed += 1;
        }
    }
    consumed
}
