use crate::causal::event::{Event, EventPayload};
use crate::registry::BlockRegistry;
use crate::world::World;

/// A rule: given the current world, the block registry, and an event that
/// just occurred, produce zero or more consequent events.
///
/// Rules must be **local**: they only read cells in a bounded neighborhood
/// of the event's position. This locality is what makes causal independence
/// (and therefore parallelism) possible. Rules never write; the scheduler
/// applies the events they return.
pub trait Rule: Send + Sync {
    fn evaluate(&self, world: &World, registry: &BlockRegistry, payload: &EventPayload)
    -> Vec<Event>;
}

/// Plain functions are rules.
pub type RuleFn = fn(&World, &BlockRegistry, &EventPayload) -> Vec<Event>;

impl<F> Rule for F
where
    F: Fn(&World, &BlockRegistry, &EventPayload) -> Vec<Event> + Send + Sync,
{
    fn evaluate(
        &self,
        world: &World,
        registry: &BlockRegistry,
        payload: &EventPayload,
    ) -> Vec<Event> {
        self(world, registry, payload)
    }
}

/// An ordered collection of rules. When an event is executed, every rule
/// is consulted; their outputs are merged into the causal graph as children
/// of the triggering event.
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add(&mut self, rule: impl Rule + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn evaluate(
        &self,
        world: &World,
        registry: &BlockRegistry,
        payload: &EventPayload,
    ) -> Vec<Event> {
        let mut out = Vec::new();
        for rule in &self.rules {
            out.extend(rule.evaluate(world, registry, payload));
        }
        out
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}
