//! The random tick layer, cascades and the simulation runner.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Fixture, ORIGIN};
use tessera_engine::causal::event::EventPayload;
use tessera_engine::registry::{global, BlockRegistry};
use tessera_engine::weathering::FixedChance;
use tessera_engine::world::position::{BlockPos, Direction};
use tessera_engine::world::World;
use tessera_vanilla::behaviors::chest;
use tessera_vanilla::block::{self, Palette};
use tessera_vanilla::event_bus::{self, ChangeSource, WorldChangeBatch};
use tessera_vanilla::rules;
use tessera_vanilla::simulation::{self, RandomTickLayer, SimulationLayer, TickConfig};

fn config(ticks_per_section: u32, seed: u64) -> TickConfig {
    TickConfig {
        interval: Duration::from_millis(1),
        ticks_per_section,
        seed,
    }
}

fn tick_positions(layer: &RandomTickLayer, fx: &Fixture) -> Vec<(BlockPos, f32)> {
    layer
        .generate_events(&fx.world, &fx.registry)
        .into_iter()
        .map(|event| match event.payload {
            EventPayload::RandomTick { pos, roll } => (pos, roll),
            other => panic!("random tick layer emitted {other:?}"),
        })
        .collect()
}

/// A slab of copper filling the section above the floor of chunk (0, 0).
fn copper_slab(fx: &Fixture) {
    for x in 0..16 {
        for z in 0..16 {
            fx.world.set_block(BlockPos::new(x, ORIGIN.y, z), fx.palette.copper);
        }
    }
}

// ---------------------------------------------------------------------------
// RandomTickLayer
// ---------------------------------------------------------------------------

#[test]
fn same_seed_same_ticks() {
    let fx = Fixture::new();
    copper_slab(&fx);

    let a = RandomTickLayer::new(config(512, 7));
    let b = RandomTickLayer::new(config(512, 7));
    let first = tick_positions(&a, &fx);

    assert!(!first.is_empty());
    assert_eq!(first, tick_positions(&b, &fx));
}

#[test]
fn only_ticking_cells_are_ticked() {
    let fx = Fixture::new();
    copper_slab(&fx);
    let oxidized = fx.state("oxidized_copper", &[]);
    fx.world.set_block(ORIGIN, oxidized);

    let layer = RandomTickLayer::new(config(4096, 1));
    let ticks = tick_positions(&layer, &fx);

    assert!(!ticks.is_empty());
    for (pos, roll) in ticks {
        assert_eq!(fx.name_at(pos), "copper_block", "ticked {pos:?}");
        assert!((0.0..1.0).contains(&roll));
    }
}

#[test]
fn stone_only_world_gets_no_ticks() {
    let fx = Fixture::new();
    let layer = RandomTickLayer::new(config(4096, 3));

    assert!(layer.generate_events(&fx.world, &fx.registry).is_empty());
}

#[test]
fn ticks_stay_inside_loaded_sections() {
    let fx = Fixture::new();
    copper_slab(&fx);
    let layer = RandomTickLayer::new(config(2048, 11));

    for (pos, _) in tick_positions(&layer, &fx) {
        assert!(fx.world.has_chunk(pos.chunk()));
        assert_eq!(pos.y, ORIGIN.y);
    }
}

#[test]
fn run_length_refuses_to_overflow() {
    let config = TickConfig {
        interval: Duration::from_millis(5),
        ..TickConfig::default()
    };

    assert_eq!(config.run_length(400), Some(Duration::from_secs(2)));
    assert_eq!(config.run_length(u64::from(u32::MAX) + 1), None);

    let slow = TickConfig {
        interval: Duration::MAX,
        ..TickConfig::default()
    };
    assert_eq!(slow.run_length(1), Some(Duration::MAX));
    assert_eq!(slow.run_length(2), None);
}

#[test]
fn layer_reports_its_config() {
    let layer = RandomTickLayer::new(config(3, 5));

    assert_eq!(layer.name(), "random_ticks");
    assert_eq!(layer.interval(), Duration::from_millis(1));
    assert_eq!(layer.config().seed, 5);
}

// ---------------------------------------------------------------------------
// Cascades
// ---------------------------------------------------------------------------

#[test]
fn generated_ticks_age_copper() {
    let fx = Fixture::new();
    copper_slab(&fx);
    let layer = RandomTickLayer::new(config(256, 42));

    let events = layer.generate_events(&fx.world, &fx.registry);
    let ticked = events.len();
    let result = simulation::cascade(&fx.world, &fx.registry, &fx.rules, events);

    // FixedChance(1.0): every tick is followed by exactly one replacement.
    assert_eq!(result.executed, ticked * 2);
    assert_eq!(result.changes.len(), ticked);
    for (pos, id) in result.changes {
        assert_eq!(fx.world.get_block(pos), id);
        assert_ne!(fx.name_at(pos), "copper_block");
    }
}

#[test]
fn cascade_reaches_chest_pairing_from_placement() {
    let fx = Fixture::new();
    let east = ORIGIN.offset(Direction::East);
    fx.place(ORIGIN, fx.palette.chest);
    let old = fx.world.get_block(east);

    let result = simulation::cascade(
        &fx.world,
        &fx.registry,
        &fx.rules,
        vec![rules::helpers::block_set(east, old, fx.palette.chest)],
    );

    let touched: Vec<BlockPos> = result.changes.iter().map(|(pos, _)| *pos).collect();
    assert_eq!(touched, [east, east, ORIGIN]);
    // Three writes plus a horizontal notify round per pairing change.
    assert_eq!(result.graph.len(), 3 + 8);
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

fn installed() -> (&'static BlockRegistry, Palette) {
    let registry = match global::get() {
        Some(registry) => registry,
        None => match global::install(block::registry().expect("catalogue")) {
            Ok(registry) => registry,
            // Another test in this binary won the race.
            Err(_) => global::get().expect("installed"),
        },
    };
    let palette = Palette::new(registry).expect("palette");
    (registry, palette)
}

#[tokio::test]
async fn runner_publishes_simulation_batches() {
    let (registry, palette) = installed();
    let world = Arc::new(World::new());
    common::flat_floor(&world, palette.stone, 1);
    for x in 0..16 {
        for z in 0..16 {
            world.set_block(BlockPos::new(x, ORIGIN.y, z), palette.copper);
        }
    }

    let (tx, mut rx) = tokio::sync::broadcast::channel::<WorldChangeBatch>(event_bus::BUS_CAPACITY);
    let rules = Arc::new(rules::standard(FixedChance(1.0)));
    let layers: Vec<Box<dyn SimulationLayer>> =
        vec![Box::new(RandomTickLayer::new(config(512, 9)))];
    let handles = simulation::start(Arc::clone(&world), registry, rules, layers, tx);

    let batch = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("a batch within five seconds")
        .expect("bus open");

    assert_eq!(batch.source, ChangeSource::Simulation("random_ticks"));
    assert!(!batch.is_empty());
    for (pos, _) in batch.changes.iter() {
        assert_eq!(pos.y, ORIGIN.y);
    }

    for handle in handles {
        handle.abort();
    }
}

#[tokio::test]
async fn aux_ticker_swings_open_lids() {
    let (registry, palette) = installed();
    let world = Arc::new(World::new());
    let rules = rules::standard(FixedChance(0.0));
    simulation::place(&world, registry, &rules, ORIGIN, palette.chest);
    let opened = chest::resolve(registry, &*world, ORIGIN);
    chest::start_viewing(&*world, &opened);

    let tick = Duration::from_millis(1);
    let handle = simulation::start_aux_ticker(Arc::clone(&world), registry, tick);
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.abort();

    let aux = world.get_aux(ORIGIN).expect("chest record");
    assert!(aux.age > 0);
    assert!(aux.openness > 0.0);
}
