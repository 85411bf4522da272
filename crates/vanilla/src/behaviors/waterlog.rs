use tessera_engine::capability::{FluidKind, FluidState, LiquidContainer};
use tessera_engine::registry::BlockRegistry;
use tessera_engine::state::BlockCell;
use tessera_engine::world::access::{BlockMutator, BlockView};
use tessera_engine::world::position::BlockPos;

pub const WATERLOGGED: &str = "waterlogged";

/// Blocks with a `waterlogged` flag hold one source of water in their own
/// cell.
pub struct Waterloggable;

fn accepts(cell: &BlockCell<'_>, fluid: FluidKind) -> bool {
    fluid == FluidKind::Water && cell.flag(WATERLOGGED) == Some(false)
}

impl LiquidContainer for Waterloggable {
    fn can_accept_fluid(
        &self,
        _view: &dyn BlockView,
        cell: &BlockCell<'_>,
        fluid: FluidKind,
    ) -> bool {
        accepts(cell, fluid)
    }

    /// Only a source fills the cell; flowing water passes by.
    fn accept_fluid(
        &self,
        world: &dyn BlockMutator,
        cell: &BlockCell<'_>,
        fluid: FluidState,
    ) -> bool {
        if !fluid.is_source() || !accepts(cell, fluid.kind) {
            return false;
        }
        let Some(wet) = cell.with(WATERLOGGED, "true") else {
            return false;
        };
        world.set_block(cell.pos, wet);
        tracing::trace!("{} at {:?} took in {:?}", cell.name(), cell.pos, fluid.kind);
        true
    }
}

/// Pour a water source at `pos`: waterloggable cells take it in, air and
/// flowing water are replaced by a source block. Returns whether anything
/// changed.
pub fn pour_water(world: &dyn BlockMutator, registry: &BlockRegistry, pos: BlockPos) -> bool {
    let cell = registry.cell(pos, world.get_block(pos));
    if let Some(liquid) = registry.liquid_container(&cell) {
        return liquid.accept_fluid(world, &cell, FluidState::source(FluidKind::Water));
    }
    let replaceable = cell.is_air() || cell.name() == "water";
    match registry.default_state("water") {
        Some(water) if replaceable && cell.id != water => {
            world.set_block(pos, water);
            true
        }
        _ => false,
    }
}
