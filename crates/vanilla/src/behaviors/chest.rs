//! Chests: 27-slot containers that pair with a same-facing neighbor into a
//! double chest.

use tessera_engine::behavior::{
    Aabb, BlockBehavior, InteractionResult, RenderShape, Shape, ShapeRule, UseContext,
};
use tessera_engine::capability::{EntityBacked, Ticker};
use tessera_engine::combine::{self, CombineResult, connected_direction};
use tessera_engine::registry::BlockRegistry;
use tessera_engine::state::BlockCell;
use tessera_engine::world::access::{BlockMutator, BlockView};
use tessera_engine::world::aux_state::{AuxKind, AuxState};
use tessera_engine::world::position::{BlockPos, Direction};

pub const CHEST: AuxKind = AuxKind("chest");
pub const SLOTS: usize = 27;

/// Lid travel per game tick.
const LID_SPEED: f32 = 0.1;

pub const BEHAVIOR: BlockBehavior = BlockBehavior::CUBE
    .with_shape(ShapeRule::Computed(shape))
    .with_render(RenderShape::EntityAnimated)
    .with_use(on_use);

/// Inset by one pixel on every side and two pixels short of a full block,
/// except on the side facing the partner of a double chest.
fn shape(cell: &BlockCell<'_>, _view: &dyn BlockView) -> Shape {
    let (from, to) = match connected_direction(cell) {
        Some(Direction::North) => ([1.0, 0.0, 0.0], [15.0, 14.0, 15.0]),
        Some(Direction::South) => ([1.0, 0.0, 1.0], [15.0, 14.0, 16.0]),
        Some(Direction::West) => ([0.0, 0.0, 1.0], [15.0, 14.0, 15.0]),
        Some(Direction::East) => ([1.0, 0.0, 1.0], [16.0, 14.0, 15.0]),
        _ => ([1.0, 0.0, 1.0], [15.0, 14.0, 15.0]),
    };
    Shape::Boxes(vec![Aabb::from_pixels(from, to)])
}

/// A chest can't be opened with a solid block resting on it.
pub fn is_blocked(registry: &BlockRegistry, view: &dyn BlockView, pos: BlockPos) -> bool {
    crate::block::is_solid(registry, view, pos.above())
}

/// The container the chest at `pos` belongs to, honoring blocked halves.
pub fn resolve(registry: &BlockRegistry, view: &dyn BlockView, pos: BlockPos) -> CombineResult {
    let blocked = |view: &dyn BlockView, pos: BlockPos| is_blocked(registry, view, pos);
    combine::combine(registry, view, pos, &blocked)
}

fn on_use(ctx: &UseContext<'_>) -> InteractionResult {
    if is_blocked(ctx.registry, ctx.view, ctx.cell.pos) {
        return InteractionResult::Consume;
    }
    match resolve(ctx.registry, ctx.view, ctx.cell.pos) {
        CombineResult::NoCombination => InteractionResult::Consume,
        result => InteractionResult::OpenContainer(result),
    }
}

pub struct ChestEntity;

impl EntityBacked for ChestEntity {
    fn new_aux_state(&self, _cell: &BlockCell<'_>) -> Option<AuxState> {
        Some(AuxState::container(CHEST, SLOTS))
    }

    fn ticker_for(&self, _cell: &BlockCell<'_>, kind: AuxKind) -> Option<Ticker> {
        (kind == CHEST).then_some(lid_ticker as Ticker)
    }
}

/// Swings the lid towards open while anyone is looking inside, closed
/// otherwise.
pub fn lid_ticker(_cell: &BlockCell<'_>, aux: &mut AuxState) {
    let target = if aux.viewers > 0 { 1.0 } else { 0.0 };
    aux.openness = if aux.openness < target {
        (aux.openness + LID_SPEED).min(target)
    } else {
        (aux.openness - LID_SPEED).max(target)
    };
    aux.age += 1;
}

/// Register one more viewer on every half of `result`.
pub fn start_viewing(world: &dyn BlockMutator, result: &CombineResult) {
    for handle in result.handles() {
        world.update_aux(handle.pos(), &mut |aux| aux.viewers += 1);
    }
}

pub fn stop_viewing(world: &dyn BlockMutator, result: &CombineResult) {
    for handle in result.handles() {
        world.update_aux(handle.pos(), &mut |aux| {
            aux.viewers = aux.viewers.saturating_sub(1)
        });
    }
}
