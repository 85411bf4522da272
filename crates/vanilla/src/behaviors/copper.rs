//! Copper blocks and cut copper stairs. Ageing itself is driven by random
//! ticks (see `rules::weathering`); this module only handles scraping.

use tessera_engine::behavior::{
    Aabb, BlockBehavior, InteractionResult, Shape, ShapeRule, UseContext,
};
use tessera_engine::state::BlockCell;
use tessera_engine::weathering::previous_weathered_state;
use tessera_engine::world::access::BlockView;
use tessera_engine::world::position::Direction;

pub const AXE: &str = "axe";

pub const BEHAVIOR: BlockBehavior = BlockBehavior::CUBE.with_use(scrape);

pub const STAIRS_BEHAVIOR: BlockBehavior = BlockBehavior::CUBE
    .with_shape(ShapeRule::Computed(stairs_shape))
    .with_use(scrape);

/// Using an axe scrapes one weather stage off. The youngest stage has
/// nothing to scrape.
pub fn scrape(ctx: &UseContext<'_>) -> InteractionResult {
    if ctx.held != Some(AXE) {
        return InteractionResult::Pass;
    }
    match previous_weathered_state(ctx.registry, &ctx.cell) {
        Some(id) => {
            tracing::debug!("scraped {} at {:?}", ctx.cell.name(), ctx.cell.pos);
            InteractionResult::Transform(id)
        }
        None => InteractionResult::Pass,
    }
}

/// A half slab plus a half step on the `facing` side. Corner variants use
/// the straight profile.
fn stairs_shape(cell: &BlockCell<'_>, _view: &dyn BlockView) -> Shape {
    let top = cell.is("half", "top");
    let (slab_y, step_y) = if top { (8.0, 0.0) } else { (0.0, 8.0) };
    let slab = Aabb::from_pixels([0.0, slab_y, 0.0], [16.0, slab_y + 8.0, 16.0]);
    let (from_xz, to_xz) = match cell.direction("facing") {
        Some(Direction::South) => ([0.0, 8.0], [16.0, 16.0]),
        Some(Direction::West) => ([0.0, 0.0], [8.0, 16.0]),
        Some(Direction::East) => ([8.0, 0.0], [16.0, 16.0]),
        _ => ([0.0, 0.0], [16.0, 8.0]),
    };
    let step = Aabb::from_pixels(
        [from_xz[0], step_y, from_xz[1]],
        [to_xz[0], step_y + 8.0, to_xz[1]],
    );
    Shape::Boxes(vec![slab, step])
}
