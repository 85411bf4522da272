//! Ambient simulation framework.
//!
//! Each [`SimulationLayer`] runs on its own tokio task, periodically generating
//! root causal events. Those events are run through a fresh [`CausalGraph`] +
//! scheduler, and the resulting block changes are published to the event bus.
//!
//! # Adding a new layer
//!
//! 1. Implement [`SimulationLayer`] for your struct.
//! 2. Push a `Box::new(YourLayer)` into the `layers` vec in `main.rs`.
//!
//! The runner handles scheduling, cascade execution, and bus publishing.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tessera_engine::behavior::is_randomly_ticking;
use tessera_engine::capability::tick_aux_states;
use tessera_engine::causal::event::Event;
use tessera_engine::causal::graph::CausalGraph;
use tessera_engine::causal::scheduler::Scheduler;
use tessera_engine::registry::BlockRegistry;
use tessera_engine::rules::RuleSet;
use tessera_engine::world::block::BlockId;
use tessera_engine::world::chunk::SECTION_SIZE;
use tessera_engine::world::position::{BlockPos, ChunkPos};
use tessera_engine::world::World;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::event_bus::{ChangeSource, WorldChangeBatch};
use crate::rules::helpers::{block_set, random_tick};

/// Upper bound on scheduler steps for one cascade.
pub const MAX_CASCADE_STEPS: usize = 1000;

/// A pluggable simulation layer that generates root causal events on a timer.
///
/// Layers are expected to be cheap per tick -- heavy work should be amortized
/// across ticks or done lazily.
pub trait SimulationLayer: Send + Sync + 'static {
    /// Human-readable name (used for logging and [`ChangeSource::Simulation`]).
    fn name(&self) -> &'static str;

    /// How often this layer ticks.
    fn interval(&self) -> Duration;

    /// Inspect the world and return root events to inject (if any).
    ///
    /// Returning an empty vec is fine -- it just means "nothing to do this tick."
    fn generate_events(&self, world: &World, registry: &BlockRegistry) -> Vec<Event>;
}

// ── Random ticks ─────────────────────────────────────────────────────────

/// Random tick tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickConfig {
    pub interval: Duration,
    /// Positions sampled per loaded, non-empty section per tick.
    pub ticks_per_section: u32,
    pub seed: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(50),
            ticks_per_section: 3,
            seed: 0,
        }
    }
}

impl TickConfig {
    /// Wall-clock time for `ticks` ticks, or `None` if it does not fit in a
    /// `Duration`.
    pub fn run_length(&self, ticks: u64) -> Option<Duration> {
        self.interval.checked_mul(u32::try_from(ticks).ok()?)
    }
}

/// Picks random positions in every non-empty section and emits a
/// `RandomTick` for the ones whose type wants ticks. Each tick carries its
/// own pre-rolled `roll`, so the rules that consume it stay deterministic.
pub struct RandomTickLayer {
    config: TickConfig,
    rng: Mutex<StdRng>,
}

impl RandomTickLayer {
    pub fn new(config: TickConfig) -> Self {
        Self {
            config,
            rng: Mutex::new(StdRng::seed_from_u64(config.seed)),
        }
    }

    pub fn config(&self) -> TickConfig {
        self.config
    }
}

/// Loaded sections as `(chunk, section index)`, in a stable order.
fn loaded_sections(world: &World) -> Vec<(ChunkPos, i32)> {
    let mut sections: Vec<(ChunkPos, i32)> = world
        .iter_chunks()
        .flat_map(|entry| {
            let pos = *entry.key();
            entry
                .value()
                .section_indices()
                .into_iter()
                .map(move |section| (pos, section))
        })
        .collect();
    sections.sort_by_key(|(chunk, section)| (chunk.x, chunk.z, *section));
    sections
}

impl SimulationLayer for RandomTickLayer {
    fn name(&self) -> &'static str {
        "random_ticks"
    }

    fn interval(&self) -> Duration {
        self.config.interval
    }

    fn generate_events(&self, world: &World, registry: &BlockRegistry) -> Vec<Event> {
        let sections = loaded_sections(world);
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let size = SECTION_SIZE as i64;
        let mut events = Vec::new();

        for (chunk, section) in sections {
            let origin = chunk.block_origin(section as i64 * size);
            for _ in 0..self.config.ticks_per_section {
                let pos = BlockPos::new(
                    origin.x + rng.random_range(0..size),
                    origin.y + rng.random_range(0..size),
                    origin.z + rng.random_range(0..size),
                );
                let roll: f32 = rng.random();
                let id = world.get_block(pos);
                if id == BlockId::AIR {
                    continue;
                }
                if is_randomly_ticking(registry, &registry.cell(pos, id)) {
                    events.push(random_tick(pos, roll));
                }
            }
        }
        events
    }
}

// ── Cascades ─────────────────────────────────────────────────────────────

/// Result of running one batch of root events to quiescence.
#[derive(Default)]
pub struct Cascade {
    pub executed: usize,
    pub changes: Vec<(BlockPos, BlockId)>,
    pub graph: CausalGraph,
}

/// Run `roots` and everything they cause against `world`.
pub fn cascade(
    world: &World,
    registry: &BlockRegistry,
    rules: &RuleSet,
    roots: Vec<Event>,
) -> Cascade {
    let mut graph = CausalGraph::new();
    graph.insert_roots(roots);
    let executed =
        Scheduler::new().run_until_quiet(world, registry, &mut graph, rules, MAX_CASCADE_STEPS);
    Cascade {
        executed,
        changes: graph.block_changes(),
        graph,
    }
}

/// Set `pos` to `id` and run everything that follows from it.
pub fn place(
    world: &World,
    registry: &BlockRegistry,
    rules: &RuleSet,
    pos: BlockPos,
    id: BlockId,
) -> Cascade {
    let old = world.get_block(pos);
    cascade(world, registry, rules, vec![block_set(pos, old, id)])
}

// ── Runner ───────────────────────────────────────────────────────────────

/// Spawn one tokio task per simulation layer.
///
/// Each task loops on `layer.interval()`, runs a fresh causal cascade for the
/// generated events, and publishes the resulting block changes to `bus`.
pub fn start(
    world: Arc<World>,
    registry: &'static BlockRegistry,
    rules: Arc<RuleSet>,
    layers: Vec<Box<dyn SimulationLayer>>,
    bus: broadcast::Sender<WorldChangeBatch>,
) -> Vec<JoinHandle<()>> {
    layers
        .into_iter()
        .map(|layer| {
            let world = Arc::clone(&world);
            let rules = Arc::clone(&rules);
            let bus = bus.clone();
            tokio::spawn(async move {
                let name = layer.name();
                let mut interval = tokio::time::interval(layer.interval());
                // The first tick fires immediately; skip it so the world has time to initialize.
                interval.tick().await;

                tracing::info!(
                    "Simulation layer '{}' started (interval {:?})",
                    name,
                    layer.interval()
                );

                loop {
                    interval.tick().await;

                    let events = layer.generate_events(&world, registry);
                    if events.is_empty() {
                        continue;
                    }

                    let result = cascade(&world, registry, &rules, events);
                    if !result.changes.is_empty() {
                        let num_changes = result.changes.len();
                        let source = ChangeSource::Simulation(name);
                        let batch = WorldChangeBatch::new(source, result.changes);
                        // Ignore send errors (no subscribers = no problem).
                        let _ = bus.send(batch);

                        tracing::debug!(
                            "Simulation '{}': {} events executed, {} block changes published",
                            name, result.executed, num_changes
                        );
                    }
                }
            })
        })
        .collect()
}

/// Spawn the task that advances every aux record's ticker (chest lids and
/// the like) once per `interval`.
pub fn start_aux_ticker(
    world: Arc<World>,
    registry: &'static BlockRegistry,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(interval);
        interval.tick().await;
        loop {
            interval.tick().await;
            let positions = world.aux_positions();
            let ticked = tick_aux_states(&*world, registry, &positions);
            tracing::trace!("ticked {} aux records", ticked);
        }
    })
}
