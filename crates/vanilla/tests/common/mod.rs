//! Shared setup for the vanilla integration tests: the shipped catalogue,
//! the standard rules and a small flat world.

#![allow(dead_code)]

use tessera_engine::registry::BlockRegistry;
use tessera_engine::rules::RuleSet;
use tessera_engine::weathering::{FixedChance, WeatheringPolicy};
use tessera_engine::world::block::BlockId;
use tessera_engine::world::chunk::Chunk;
use tessera_engine::world::position::{BlockPos, ChunkPos, LocalBlockPos};
use tessera_engine::world::World;
use tessera_vanilla::block::{self, Palette};
use tessera_vanilla::rules;
use tessera_vanilla::simulation::{self, Cascade};

pub const FLOOR_Y: i64 = 63;

/// Directly above the floor at the origin.
pub const ORIGIN: BlockPos = BlockPos::new(0, FLOOR_Y + 1, 0);

pub struct Fixture {
    pub registry: BlockRegistry,
    pub palette: Palette,
    pub rules: RuleSet,
    pub world: World,
}

impl Fixture {
    /// Vanilla catalogue and rules; weathering always fires.
    pub fn new() -> Self {
        Self::with_policy(FixedChance(1.0))
    }

    pub fn with_policy(policy: impl WeatheringPolicy + 'static) -> Self {
        let registry = block::registry().expect("shipped catalogue is valid");
        let palette = Palette::new(&registry).expect("palette blocks exist");
        let world = World::new();
        flat_floor(&world, palette.stone, 1);
        Self {
            registry,
            palette,
            rules: rules::standard(policy),
            world,
        }
    }

    pub fn place(&self, pos: BlockPos, id: BlockId) -> Cascade {
        simulation::place(&self.world, &self.registry, &self.rules, pos, id)
    }

    pub fn state(&self, name: &str, values: &[(&str, &str)]) -> BlockId {
        self.registry
            .state(name, values)
            .unwrap_or_else(|| panic!("no state {name} {values:?}"))
    }

    pub fn name_at(&self, pos: BlockPos) -> &str {
        self.registry.cell_at(&self.world, pos).name()
    }

    pub fn value_at(&self, pos: BlockPos, property: &str) -> Option<&str> {
        self.registry.cell_at(&self.world, pos).value(property)
    }
}

/// Four stone layers topping out at `FLOOR_Y` over `(2r)^2` chunks.
pub fn flat_floor(world: &World, stone: BlockId, chunk_radius: i32) {
    for cx in -chunk_radius..chunk_radius {
        for cz in -chunk_radius..chunk_radius {
            let mut chunk = Chunk::new();
            for x in 0..16u8 {
                for z in 0..16u8 {
                    for y in FLOOR_Y - 3..=FLOOR_Y {
                        chunk.set_block(LocalBlockPos { x, y, z }, stone);
                    }
                }
            }
            world.insert_chunk(ChunkPos::new(cx, cz), chunk);
        }
    }
}
