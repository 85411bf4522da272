use super::event::{Event, EventId, EventPayload};
use super::graph::CausalGraph;
use crate::capability::{dispatch_to_listeners, refresh_aux_state};
use crate::registry::BlockRegistry;
use crate::rules::RuleSet;
use crate::world::position::ChunkPos;
use crate::world::World;
use indexmap::IndexMap;
use rayon::prelude::*;

/// Drains the causal frontier, applying events to the world and generating
/// consequent events via the rule set.
///
/// Provides both sequential (`step`) and parallel (`step_parallel`) execution.
/// Either way, a step only runs events whose parents have all executed, so a
/// rule always observes the writes of the events that caused it.
pub struct Scheduler {
    pub max_events_per_step: usize,
}

/// Events of one step, with what their rules produced.
type Outcome = (EventId, Vec<Event>);

impl Scheduler {
    pub fn new() -> Self {
        Self {
            max_events_per_step: 10_000,
        }
    }

    fn ready(&self, graph: &CausalGraph) -> Vec<(EventId, Event)> {
        graph
            .frontier()
            .into_iter()
            .filter_map(|id| graph.get(id).map(|node| (id, node.event.clone())))
            .take(self.max_events_per_step)
            .collect()
    }

    fn record(graph: &mut CausalGraph, outcomes: impl IntoIterator<Item = Outcome>) -> usize {
        let mut executed = 0;
        for (id, consequents) in outcomes {
            graph.mark_executed(id);
            executed += 1;
            for event in consequents {
                graph.insert(event, vec![id]);
            }
        }
        executed
    }

    fn drain(max_steps: usize, mut step: impl FnMut() -> usize) -> usize {
        let mut total = 0;
        for _ in 0..max_steps {
            match step() {
                0 => break,
                n => total += n,
            }
        }
        total
    }

    // ── Sequential execution ────────────────────────────────────────────

    /// Run the current frontier in graph order. Returns how many events ran.
    pub fn step(
        &self,
        world: &World,
        registry: &BlockRegistry,
        graph: &mut CausalGraph,
        rules: &RuleSet,
    ) -> usize {
        let outcomes: Vec<Outcome> = self
            .ready(graph)
            .into_iter()
            .map(|(id, event)| (id, execute(world, registry, rules, &event.payload)))
            .collect();
        let executed = Self::record(graph, outcomes);
        tracing::trace!("sequential step executed {} events", executed);
        executed
    }

    /// Step until the frontier is empty or `max_steps` is reached. Returns
    /// the total number of events executed.
    pub fn run_until_quiet(
        &self,
        world: &World,
        registry: &BlockRegistry,
        graph: &mut CausalGraph,
        rules: &RuleSet,
        max_steps: usize,
    ) -> usize {
        Self::drain(max_steps, || self.step(world, registry, graph, rules))
    }

    // ── Parallel execution (scatter by chunk, gather in order) ──────────

    /// Events are grouped by chunk and each group runs on one worker, so a
    /// position never has two writers within a step. Groups keep the order
    /// in which their chunks first appear in the frontier.
    pub fn step_parallel(
        &self,
        world: &World,
        registry: &BlockRegistry,
        graph: &mut CausalGraph,
        rules: &RuleSet,
    ) -> usize {
        let mut groups: IndexMap<ChunkPos, Vec<(EventId, Event)>> = IndexMap::new();
        for (id, event) in self.ready(graph) {
            groups.entry(event.chunk()).or_default().push((id, event));
        }
        if groups.is_empty() {
            return 0;
        }

        let outcomes: Vec<Vec<Outcome>> = groups
            .into_values()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|group| {
                group
                    .into_iter()
                    .map(|(id, event)| (id, execute(world, registry, rules, &event.payload)))
                    .collect()
            })
            .collect();

        let executed = Self::record(graph, outcomes.into_iter().flatten());
        tracing::trace!("parallel step executed {} events", executed);
        executed
    }

    pub fn run_until_quiet_parallel(
        &self,
        world: &World,
        registry: &BlockRegistry,
        graph: &mut CausalGraph,
        rules: &RuleSet,
        max_steps: usize,
    ) -> usize {
        Self::drain(max_steps, || self.step_parallel(world, registry, graph, rules))
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply one event, then ask the rules what follows from it.
fn execute(
    world: &World,
    registry: &BlockRegistry,
    rules: &RuleSet,
    payload: &EventPayload,
) -> Vec<Event> {
    apply_event(world, registry, payload);
    rules.evaluate(world, registry, payload)
}

/// Apply one event's world write. A `BlockSet` replaces the cell and then
/// brings its aux state in line with the new type. Every event is then
/// offered to the aux listeners in range of it.
pub fn apply_event(world: &World, registry: &BlockRegistry, payload: &EventPayload) {
    if let EventPayload::BlockSet { pos, new, .. } = *payload {
        let current = world.get_block(pos);
        world.set_block(pos, new);
        refresh_aux_state(world, registry, pos, current, new);
    }
    if world.aux_count() > 0 {
        let consumed = dispatch_to_listeners(world, registry, &world.aux_positions(), payload);
        if consumed > 0 {
            tracing::trace!("{} listeners consumed {:?}", consumed, payload);
        }
    }
}
