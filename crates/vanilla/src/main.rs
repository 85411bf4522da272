use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tessera_engine::behavior::{use_block, InteractionResult};
use tessera_engine::causal::graph::CausalGraph;
use tessera_engine::causal::scheduler::Scheduler;
use tessera_engine::combine::ContainerView;
use tessera_engine::registry::{global, BlockRegistry};
use tessera_engine::rules::RuleSet;
use tessera_engine::weathering::FixedChance;
use tessera_engine::world::block::BlockId;
use tessera_engine::world::chunk::Chunk;
use tessera_engine::world::position::{BlockPos, ChunkPos, Direction, LocalBlockPos};
use tessera_engine::world::World;
use tessera_vanilla::behaviors::{chest, copper, pumpkin, waterlog};
use tessera_vanilla::block::{self, Palette};
use tessera_vanilla::event_bus::{self, ChangeSource, WorldChangeBatch};
use tessera_vanilla::rules::{self, helpers::block_set, weathering::CopperAgeing};
use tessera_vanilla::simulation::{
    self, RandomTickLayer, SimulationLayer, TickConfig, MAX_CASCADE_STEPS,
};
use tokio::sync::broadcast;

/// Top of the generated floor; everything the demo places sits one above.
const FLOOR_Y: i64 = 63;

fn flag<T: FromStr>(name: &str) -> Option<T> {
    std::env::args()
        .skip_while(|a| a != name)
        .nth(1)
        .and_then(|s| s.parse().ok())
}

#[tokio::main]
async fn main() -> Result<()> {
    let blocks: Option<PathBuf> = flag("--blocks");
    let ticks: u64 = flag("--ticks").unwrap_or(400);
    let tick_ms: u64 = flag("--tick-ms").unwrap_or(5);
    let per_section: u32 = flag("--per-section").unwrap_or(64);
    let seed: u64 = flag("--seed").unwrap_or(0);
    let chance: Option<f32> = flag("--chance");
    let dump_dot = std::env::args().any(|a| a == "--dot");
    let use_parallel = std::env::args().any(|a| a == "--parallel");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("tessera -- block behavior demo");

    let registry = match &blocks {
        Some(path) => block::load(path)?,
        None => block::registry()?,
    };
    tracing::info!(
        "Catalogue ready: {} block types, {} states",
        registry.len(),
        registry.state_count()
    );
    let registry = global::install(registry).context("installing block registry")?;
    let palette = Palette::new(registry)?;

    let rules = Arc::new(match chance {
        Some(c) => rules::standard(FixedChance(c)),
        None => rules::standard(CopperAgeing::default()),
    });

    let world = Arc::new(World::new());
    generate_flat_world(&world, palette.stone, 2);
    tracing::info!("World ready: {} chunks loaded", world.chunk_count());

    demo_chests(&world, registry, &rules, &palette, use_parallel, dump_dot);
    demo_pumpkin(&world, registry, &rules, &palette);
    let copper = place_copper(&world, registry, &rules, &palette)?;

    if ticks > 0 {
        run_simulation(
            Arc::clone(&world),
            registry,
            Arc::clone(&rules),
            TickConfig {
                interval: Duration::from_millis(tick_ms),
                ticks_per_section: per_section,
                seed,
            },
            ticks,
        )
        .await?;
    }

    report_copper(&world, registry, &copper);
    scrape(&world, registry, &rules, copper[0]);
    Ok(())
}

/// Stone from y=60 to the floor in a square of chunks around the origin.
fn generate_flat_world(world: &World, stone: BlockId, chunk_radius: i32) {
    for cx in -chunk_radius..chunk_radius {
        for cz in -chunk_radius..chunk_radius {
            let mut chunk = Chunk::new();
            for x in 0..16u8 {
                for z in 0..16u8 {
                    for y in 60..=FLOOR_Y {
                        chunk.set_block(LocalBlockPos { x, y, z }, stone);
                    }
                }
            }
            world.insert_chunk(ChunkPos::new(cx, cz), chunk);
        }
    }
}

fn on_floor(x: i64, z: i64) -> BlockPos {
    BlockPos::new(x, FLOOR_Y + 1, z)
}

/// Two chests side by side pair up, open together, and refuse to open with
/// stone on the lid.
fn demo_chests(
    world: &World,
    registry: &BlockRegistry,
    rules: &RuleSet,
    palette: &Palette,
    use_parallel: bool,
    dump_dot: bool,
) {
    let left = on_floor(0, 0);
    let right = left.offset(Direction::East);

    simulation::place(world, registry, rules, left, palette.chest);

    let mut graph = CausalGraph::new();
    graph.insert_root(block_set(right, world.get_block(right), palette.chest));
    let scheduler = Scheduler::new();
    let total = if use_parallel {
        tracing::info!("Running PARALLEL scheduler...");
        scheduler.run_until_quiet_parallel(world, registry, &mut graph, rules, MAX_CASCADE_STEPS)
    } else {
        tracing::info!("Running sequential scheduler...");
        scheduler.run_until_quiet(world, registry, &mut graph, rules, MAX_CASCADE_STEPS)
    };
    tracing::info!(
        "Second chest placed: quiescence after {} events ({} in graph)",
        total,
        graph.len()
    );
    if dump_dot {
        print!("{}", graph.to_dot());
    }

    for pos in [left, right] {
        let cell = registry.cell_at(world, pos);
        tracing::info!("{:?}: {} type={:?}", pos, cell.name(), cell.value("type"));
    }

    match use_block(registry, world, left, None) {
        InteractionResult::OpenContainer(result) => {
            chest::start_viewing(world, &result);
            let slots = ContainerView::open(world, &result).map_or(0, |view| view.len());
            tracing::info!("Opened chest: double={}, {} slots", result.is_combined(), slots);
        }
        other => tracing::warn!("Chest did not open: {:?}", other),
    }

    if waterlog::pour_water(world, registry, right) {
        let cell = registry.cell_at(world, right);
        let wet = cell.flag(waterlog::WATERLOGGED);
        tracing::info!("Poured water into {:?}: waterlogged={:?}", right, wet);
    }

    simulation::place(world, registry, rules, right.above(), palette.stone);
    let blocked = use_block(registry, world, left, None);
    tracing::info!("With stone on the lid: {:?}", blocked);
    simulation::place(world, registry, rules, right.above(), palette.air);

    let broken = simulation::place(world, registry, rules, right, palette.air);
    let cell = registry.cell_at(world, left);
    tracing::info!(
        "Broke right half ({} events): left is now type={:?}",
        broken.executed,
        cell.value("type")
    );
}

fn demo_pumpkin(world: &World, registry: &BlockRegistry, rules: &RuleSet, palette: &Palette) {
    let pos = on_floor(-4, -4);
    simulation::place(world, registry, rules, pos, palette.pumpkin);
    let sheared = use_block(registry, world, pos, Some(pumpkin::SHEARS));
    if let InteractionResult::Transform(carved) = sheared {
        simulation::place(world, registry, rules, pos, carved);
    }
    tracing::info!("Sheared pumpkin: now {}", registry.cell_at(world, pos).name());
}

/// A row of copper blocks with a pair of cut copper stairs at the end.
fn place_copper(
    world: &World,
    registry: &BlockRegistry,
    rules: &RuleSet,
    palette: &Palette,
) -> Result<Vec<BlockPos>> {
    let mut placed = Vec::new();
    for x in 4..10 {
        let pos = on_floor(x, 4);
        simulation::place(world, registry, rules, pos, palette.copper);
        placed.push(pos);
    }
    let stairs = registry
        .state("cut_copper_stairs", &[("facing", "east"), ("half", "top")])
        .context("catalogue has no top-half cut copper stairs")?;
    for (pos, id) in [(on_floor(10, 4), stairs), (on_floor(11, 4), palette.cut_copper_stairs)] {
        simulation::place(world, registry, rules, pos, id);
        placed.push(pos);
    }
    Ok(placed)
}

async fn run_simulation(
    world: Arc<World>,
    registry: &'static BlockRegistry,
    rules: Arc<RuleSet>,
    config: TickConfig,
    ticks: u64,
) -> Result<()> {
    let run_for = config
        .run_length(ticks)
        .with_context(|| format!("{ticks} ticks of {:?} is too long", config.interval))?;
    let (bus_tx, mut bus_rx) = broadcast::channel::<WorldChangeBatch>(event_bus::BUS_CAPACITY);

    let logger = tokio::spawn(async move {
        let mut total = 0usize;
        while let Ok(batch) = bus_rx.recv().await {
            if let ChangeSource::Simulation(name) = batch.source {
                tracing::debug!("{}: {} block changes", name, batch.len());
            }
            total += batch.len();
        }
        total
    });

    let layers: Vec<Box<dyn SimulationLayer>> = vec![Box::new(RandomTickLayer::new(config))];
    let mut handles = simulation::start(Arc::clone(&world), registry, rules, layers, bus_tx);
    handles.push(simulation::start_aux_ticker(Arc::clone(&world), registry, config.interval));

    tracing::info!("Simulating {} ticks ({:?})...", ticks, run_for);
    tokio::select! {
        _ = tokio::time::sleep(run_for) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received, stopping simulation...");
        }
    }

    // Dropping the layer tasks drops the last bus senders, which ends the logger.
    for handle in handles {
        handle.abort();
    }
    match logger.await {
        Ok(total) => tracing::info!("Simulation published {} block changes", total),
        Err(e) => tracing::error!("Bus logger failed: {}", e),
    }

    for pos in world.aux_positions() {
        if let Some(aux) = world.get_aux(pos) {
            tracing::info!("{:?}: viewers={} openness={:.1}", pos, aux.viewers, aux.openness);
        }
    }
    Ok(())
}

fn report_copper(world: &World, registry: &BlockRegistry, positions: &[BlockPos]) {
    for &pos in positions {
        let cell = registry.cell_at(world, pos);
        tracing::info!("{:?}: {} {:?}", pos, cell.name(), registry.weather_state(&cell));
    }
}

fn scrape(world: &World, registry: &BlockRegistry, rules: &RuleSet, pos: BlockPos) {
    match use_block(registry, world, pos, Some(copper::AXE)) {
        InteractionResult::Transform(id) => {
            simulation::place(world, registry, rules, pos, id);
            tracing::info!("Scraped {:?}: now {}", pos, registry.cell_at(world, pos).name());
        }
        _ => tracing::info!("Nothing to scrape at {:?}", pos),
    }
}
