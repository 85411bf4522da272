use tessera_engine::behavior::{BlockBehavior, InteractionResult, UseContext};

pub const SHEARS: &str = "shears";
pub const CARVED: &str = "carved_pumpkin";

pub const BEHAVIOR: BlockBehavior = BlockBehavior::CUBE.with_use(carve);

/// Shears carve a shearable block into a carved pumpkin.
fn carve(ctx: &UseContext<'_>) -> InteractionResult {
    if ctx.held != Some(SHEARS) || !ctx.registry.is_shearable(&ctx.cell) {
        return InteractionResult::Pass;
    }
    match ctx.registry.default_state(CARVED) {
        Some(carved) => InteractionResult::Transform(carved),
        None => InteractionResult::Pass,
    }
}
