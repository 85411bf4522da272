//! Material ageing: a linear ladder of weather states, each bound to a
//! concrete block type, advanced one rung at a time by random ticks.
//!
//! Types join a ladder through their `weathering` capability, naming a
//! family (`"copper"`, `"cut_copper_stairs"`, ...) and the stage they
//! represent. The table of bindings lives in the registry and is consulted
//! on every query; nothing here caches eligibility.

use std::collections::HashMap;

use serde::Deserialize;

use crate::registry::{BlockRegistry, BlockType, BlockTypeId, RegistryError};
use crate::state::BlockCell;
use crate::world::access::BlockView;
use crate::world::block::BlockId;
use crate::world::position::BlockPos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherState {
    Unaffected,
    Exposed,
    Weathered,
    Oxidized,
}

impl WeatherState {
    pub const ALL: [WeatherState; 4] = [
        WeatherState::Unaffected,
        WeatherState::Exposed,
        WeatherState::Weathered,
        WeatherState::Oxidized,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub const fn ordinal(self) -> usize {
        self as usize
    }

    pub const fn next(self) -> Option<WeatherState> {
        match self {
            WeatherState::Unaffected => Some(WeatherState::Exposed),
            WeatherState::Exposed => Some(WeatherState::Weathered),
            WeatherState::Weathered => Some(WeatherState::Oxidized),
            WeatherState::Oxidized => None,
        }
    }

    pub const fn previous(self) -> Option<WeatherState> {
        match self {
            WeatherState::Unaffected => None,
            WeatherState::Exposed => Some(WeatherState::Unaffected),
            WeatherState::Weathered => Some(WeatherState::Exposed),
            WeatherState::Oxidized => Some(WeatherState::Weathered),
        }
    }

    pub const fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

/// A type's place on a ladder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WeatherBinding {
    pub family: String,
    pub stage: WeatherState,
}

/// Family name → the type bound to each stage.
#[derive(Debug, Default)]
pub(crate) struct WeatherTable {
    families: HashMap<String, [Option<BlockTypeId>; WeatherState::COUNT]>,
}

impl WeatherTable {
    /// Collect bindings, rejecting a stage bound twice or a hole between
    /// the lowest and highest bound stage of a family.
    pub(crate) fn build(types: &[BlockType]) -> Result<Self, RegistryError> {
        let mut families: HashMap<String, [Option<BlockTypeId>; WeatherState::COUNT]> =
            HashMap::new();
        for ty in types {
            let Some(binding) = &ty.capabilities.weathering else {
                continue;
            };
            let slots = families.entry(binding.family.clone()).or_default();
            let slot = &mut slots[binding.stage.ordinal()];
            if let Some(first) = *slot {
                return Err(RegistryError::DuplicateWeatherBinding {
                    family: binding.family.clone(),
                    state: binding.stage,
                    first: types[first.0 as usize].name.clone(),
                    second: ty.name.clone(),
                });
            }
            *slot = Some(ty.id);
        }

        for (family, slots) in &families {
            let bound: Vec<usize> = (0..WeatherState::COUNT)
                .filter(|&i| slots[i].is_some())
                .collect();
            if let (Some(&lo), Some(&hi)) = (bound.first(), bound.last()) {
                if let Some(missing) = (lo..=hi).find(|&i| slots[i].is_none()) {
                    return Err(RegistryError::WeatherGap {
                        family: family.clone(),
                        missing: WeatherState::ALL[missing],
                    });
                }
            }
        }
        Ok(Self { families })
    }

    fn member(&self, family: &str, stage: WeatherState) -> Option<BlockTypeId> {
        self.families.get(family)?[stage.ordinal()]
    }

    fn family_len(&self, family: &str) -> usize {
        self.families
            .get(family)
            .map_or(0, |slots| slots.iter().flatten().count())
    }
}

impl BlockRegistry {
    pub fn weather_binding<'a>(&self, ty: &'a BlockType) -> Option<&'a WeatherBinding> {
        ty.capabilities.weathering.as_ref()
    }

    /// The weather state the cell's type is bound to.
    pub fn weather_state(&self, cell: &BlockCell<'_>) -> Option<WeatherState> {
        self.weather_binding(cell.ty).map(|b| b.stage)
    }

    /// The type bound to `stage` in `family`.
    pub fn weather_member(&self, family: &str, stage: WeatherState) -> Option<&BlockType> {
        self.weather.member(family, stage).and_then(|id| self.get(id))
    }

    /// Number of types bound in `family`.
    pub fn weather_family_len(&self, family: &str) -> usize {
        self.weather.family_len(family)
    }

    /// The type one stage older than `ty`, if one is registered.
    pub fn next_weather_type(&self, ty: &BlockType) -> Option<&BlockType> {
        let binding = self.weather_binding(ty)?;
        self.weather_member(&binding.family, binding.stage.next()?)
    }

    /// The type one stage younger than `ty`, if one is registered.
    pub fn previous_weather_type(&self, ty: &BlockType) -> Option<&BlockType> {
        let binding = self.weather_binding(ty)?;
        self.weather_member(&binding.family, binding.stage.previous()?)
    }
}

/// A cell can age iff a type is bound to the stage after its own.
pub fn is_weathering_eligible(registry: &BlockRegistry, cell: &BlockCell<'_>) -> bool {
    registry.next_weather_type(cell.ty).is_some()
}

/// The state of `target` that keeps every property value of `cell` that
/// `target` also declares. Properties `target` lacks are dropped; ones only
/// `target` has take its default.
pub fn transfer_properties(cell: &BlockCell<'_>, target: &BlockType) -> BlockId {
    let offset = cell
        .properties()
        .fold(target.default_offset, |offset, (name, value)| {
            target
                .schema
                .with_value(offset, name, value)
                .unwrap_or(offset)
        });
    target.state(offset)
}

/// The next-stage state for `cell`, regardless of chance.
pub fn next_weathered_state(registry: &BlockRegistry, cell: &BlockCell<'_>) -> Option<BlockId> {
    let target = registry.next_weather_type(cell.ty)?;
    Some(transfer_properties(cell, target))
}

/// The previous-stage state for `cell` (scraping). Never reached by random
/// ticks.
pub fn previous_weathered_state(
    registry: &BlockRegistry,
    cell: &BlockCell<'_>,
) -> Option<BlockId> {
    let target = registry.previous_weather_type(cell.ty)?;
    Some(transfer_properties(cell, target))
}

/// Probability that one random tick ages a cell.
pub trait WeatheringPolicy: Send + Sync {
    fn chance(&self, registry: &BlockRegistry, view: &dyn BlockView, cell: &BlockCell<'_>) -> f32;
}

/// Same chance everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedChance(pub f32);

impl WeatheringPolicy for FixedChance {
    fn chance(&self, _: &BlockRegistry, _: &dyn BlockView, _: &BlockCell<'_>) -> f32 {
        self.0
    }
}

/// Ageing that depends on nearby weathering blocks: any younger neighbor
/// within `radius` (taxicab) holds the cell back entirely, and the chance
/// falls with the share of same-age neighbors:
/// `base * ((older + 1) / (older + same + 1))²`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborInfluence {
    pub base: f32,
    pub radius: i64,
}

impl WeatheringPolicy for NeighborInfluence {
    fn chance(&self, registry: &BlockRegistry, view: &dyn BlockView, cell: &BlockCell<'_>) -> f32 {
        let Some(own) = registry.weather_state(cell) else {
            return 0.0;
        };
        let mut same = 0u32;
        let mut older = 0u32;
        let r = self.radius;
        for dx in -r..=r {
            for dy in -r..=r {
                for dz in -r..=r {
                    let pos = BlockPos::new(cell.pos.x + dx, cell.pos.y + dy, cell.pos.z + dz);
                    if pos == cell.pos || pos.manhattan(&cell.pos) > r {
                        continue;
                    }
                    let neighbor = registry.cell_at(view, pos);
                    match registry.weather_state(&neighbor) {
                        Some(stage) if stage < own => return 0.0,
                        Some(stage) if stage > own => older += 1,
                        Some(_) => same += 1,
                        None => {}
                    }
                }
            }
        }
        let ratio = (older + 1) as f32 / (older + same + 1) as f32;
        self.base * ratio * ratio
    }
}

/// Age `cell` by one stage when `roll` (uniform in `0.0..1.0`) falls under
/// the policy's chance. Returns the replacement state, or `None` when the
/// cell stays as it is.
pub fn advance(
    registry: &BlockRegistry,
    view: &dyn BlockView,
    cell: &BlockCell<'_>,
    roll: f32,
    policy: &dyn WeatheringPolicy,
) -> Option<BlockId> {
    let target = registry.next_weather_type(cell.ty)?;
    if roll >= policy.chance(registry, view, cell) {
        return None;
    }
    let next = transfer_properties(cell, target);
    tracing::debug!(
        "weathering {:?}: {} -> {}",
        cell.pos,
        cell.name(),
        target.name
    );
    Some(next)
}
