//! Random-tick ageing of weathering blocks.

use tessera_engine::behavior::is_randomly_ticking;
use tessera_engine::causal::event::{Event, EventPayload};
use tessera_engine::registry::BlockRegistry;
use tessera_engine::rules::Rule;
use tessera_engine::state::BlockCell;
use tessera_engine::weathering::{advance, NeighborInfluence, WeatherState, WeatheringPolicy};
use tessera_engine::world::access::BlockView;
use tessera_engine::world::World;

use super::helpers::replace;

/// Promotes a randomly ticked cell by one weather stage when its roll
/// beats the policy.
pub struct Weathering {
    policy: Box<dyn WeatheringPolicy>,
}

impl Weathering {
    pub fn new(policy: impl WeatheringPolicy + 'static) -> Self {
        Self {
            policy: Box::new(policy),
        }
    }
}

impl Rule for Weathering {
    fn evaluate(
        &self,
        world: &World,
        registry: &BlockRegistry,
        payload: &EventPayload,
    ) -> Vec<Event> {
        let EventPayload::RandomTick { pos, roll } = *payload else {
            return Vec::new();
        };
        let cell = registry.cell_at(world, pos);
        if !is_randomly_ticking(registry, &cell) {
            return Vec::new();
        }
        match advance(registry, world, &cell, roll, self.policy.as_ref()) {
            Some(next) => vec![replace(&cell, next)],
            None => Vec::new(),
        }
    }
}

/// Vanilla copper odds: a per-tick gate, eased for unaffected blocks, scaled
/// by how the block's neighbors have aged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CopperAgeing {
    pub gate: f32,
    pub radius: i64,
}

impl Default for CopperAgeing {
    fn default() -> Self {
        Self {
            gate: 0.056_888_89,
            radius: 4,
        }
    }
}

impl WeatheringPolicy for CopperAgeing {
    fn chance(&self, registry: &BlockRegistry, view: &dyn BlockView, cell: &BlockCell<'_>) -> f32 {
        let modifier = match registry.weather_state(cell) {
            Some(WeatherState::Unaffected) => 0.75,
            Some(_) => 1.0,
            None => return 0.0,
        };
        NeighborInfluence {
            base: self.gate * modifier,
            radius: self.radius,
        }
        .chance(registry, view, cell)
    }
}
