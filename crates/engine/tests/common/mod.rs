//! Small block catalogue shared by the engine integration tests. Built in
//! code so the engine tests do not depend on any game crate.

#![allow(dead_code)]

use std::sync::Arc;

use tessera_engine::behavior::{BlockBehavior, FixedShape, RenderShape, ShapeRule};
use tessera_engine::capability::{
    refresh_aux_state, EntityBacked, EventListener, FluidKind, FluidState, LiquidContainer, Ticker,
};
use tessera_engine::causal::event::EventPayload;
use tessera_engine::combine::CombineRule;
use tessera_engine::registry::{BlockRegistry, BlockTypeDef, RegistryBuilder};
use tessera_engine::state::BlockCell;
use tessera_engine::weathering::WeatherState;
use tessera_engine::world::access::{BlockMutator, BlockView};
use tessera_engine::world::aux_state::{AuxKind, AuxState};
use tessera_engine::world::block::BlockId;
use tessera_engine::world::position::BlockPos;
use tessera_engine::world::World;

pub const CRATE: AuxKind = AuxKind("crate");
pub const CRATE_SLOTS: usize = 9;

/// Entity-backed test container: nine slots, ages every tick, and counts
/// neighbor notifications within two blocks in its `viewers` field.
pub struct TestCrate;

fn age(_: &BlockCell<'_>, aux: &mut AuxState) {
    aux.age += 1;
}

fn count_notify(aux: &mut AuxState, payload: &EventPayload) -> bool {
    if matches!(payload, EventPayload::BlockNotify { .. }) {
        aux.viewers += 1;
        true
    } else {
        false
    }
}

impl EntityBacked for TestCrate {
    fn new_aux_state(&self, _cell: &BlockCell<'_>) -> Option<AuxState> {
        Some(AuxState::container(CRATE, CRATE_SLOTS))
    }

    fn ticker_for(&self, _cell: &BlockCell<'_>, kind: AuxKind) -> Option<Ticker> {
        (kind == CRATE).then_some(age as Ticker)
    }

    fn listener_for(&self, _aux: &AuxState) -> Option<EventListener> {
        Some(EventListener {
            radius: 2,
            on_event: count_notify,
        })
    }
}

/// Entity-backed type that opts out of an aux record.
pub struct NoRecord;

impl EntityBacked for NoRecord {
    fn new_aux_state(&self, _cell: &BlockCell<'_>) -> Option<AuxState> {
        None
    }
}

/// Holds water when its `waterlogged` flag is clear.
pub struct Waterlog;

impl LiquidContainer for Waterlog {
    fn can_accept_fluid(
        &self,
        _view: &dyn BlockView,
        cell: &BlockCell<'_>,
        fluid: FluidKind,
    ) -> bool {
        fluid == FluidKind::Water && cell.flag("waterlogged") == Some(false)
    }

    fn accept_fluid(
        &self,
        world: &dyn BlockMutator,
        cell: &BlockCell<'_>,
        fluid: FluidState,
    ) -> bool {
        if fluid.kind != FluidKind::Water || cell.flag("waterlogged") != Some(false) {
            return false;
        }
        match cell.with("waterlogged", "true") {
            Some(id) => {
                world.set_block(cell.pos, id);
                true
            }
            None => false,
        }
    }
}

pub const FACINGS: [&str; 4] = ["north", "south", "west", "east"];
pub const PAIRINGS: [&str; 3] = ["single", "left", "right"];

pub fn crate_def(name: &str) -> BlockTypeDef {
    BlockTypeDef::new(name)
        .property("facing", &FACINGS)
        .property("type", &PAIRINGS)
        .boolean("waterlogged")
        .behavior(
            BlockBehavior::CUBE
                .with_shape(ShapeRule::Fixed(FixedShape::Empty))
                .with_render(RenderShape::EntityAnimated),
        )
        .entity(Arc::new(TestCrate))
        .liquid(Arc::new(Waterlog))
        .combinable(CombineRule::default())
}

pub fn copper_defs() -> Vec<BlockTypeDef> {
    [
        ("copper", WeatherState::Unaffected),
        ("exposed_copper", WeatherState::Exposed),
        ("weathered_copper", WeatherState::Weathered),
        ("oxidized_copper", WeatherState::Oxidized),
    ]
    .into_iter()
    .map(|(name, stage)| BlockTypeDef::new(name).weathering("copper", stage))
    .collect()
}

pub fn stairs_defs() -> Vec<BlockTypeDef> {
    [
        ("cut_stairs", WeatherState::Unaffected),
        ("exposed_cut_stairs", WeatherState::Exposed),
        ("weathered_cut_stairs", WeatherState::Weathered),
        ("oxidized_cut_stairs", WeatherState::Oxidized),
    ]
    .into_iter()
    .map(|(name, stage)| {
        BlockTypeDef::new(name)
            .property("facing", &FACINGS)
            .property("half", &["bottom", "top"])
            .boolean("waterlogged")
            .weathering("cut_stairs", stage)
    })
    .collect()
}

/// air, stone, glass, crate, trunk (a second combinable type), pumpkin,
/// vault (entity-backed without a record) and both weathering ladders.
pub fn registry() -> BlockRegistry {
    let mut builder = RegistryBuilder::new();
    builder
        .register(BlockTypeDef::new("stone"))
        .register(
            BlockTypeDef::new("glass")
                .behavior(BlockBehavior::CUBE.with_skylight(true)),
        )
        .register(crate_def("crate"))
        .register(crate_def("trunk"))
        .register(BlockTypeDef::new("pumpkin").shearable())
        .register(BlockTypeDef::new("vault").entity(Arc::new(NoRecord)));
    for def in copper_defs().into_iter().chain(stairs_defs()) {
        builder.register(def);
    }
    builder.build().expect("test catalogue is valid")
}

pub fn state(registry: &BlockRegistry, name: &str, values: &[(&str, &str)]) -> BlockId {
    registry
        .state(name, values)
        .unwrap_or_else(|| panic!("no state {name} {values:?}"))
}

pub fn crate_state(registry: &BlockRegistry, facing: &str, pairing: &str) -> BlockId {
    state(registry, "crate", &[("facing", facing), ("type", pairing)])
}

/// Write `id` at `pos` and bring the aux record in line, the way the
/// scheduler does.
pub fn place(world: &World, registry: &BlockRegistry, pos: BlockPos, id: BlockId) {
    let old = world.get_block(pos);
    world.set_block(pos, id);
    refresh_aux_state(world, registry, pos, old, id);
}
