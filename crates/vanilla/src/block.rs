//! Vanilla block catalogue.
//!
//! Block types, their properties and their data-only behavior live in
//! `assets/blocks.toml`; this module wires the named code behaviors to it
//! and resolves the handful of states the rest of the crate refers to.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tessera_engine::behavior::{self, BlockBehavior};
use tessera_engine::capability::{EntityBacked, LiquidContainer};
use tessera_engine::config::{load_registry, BehaviorResolver, BlocksConfig};
use tessera_engine::registry::{BlockRegistry, RegistryBuilder};
use tessera_engine::world::access::BlockView;
use tessera_engine::world::block::BlockId;
use tessera_engine::world::position::BlockPos;

use crate::behaviors::{chest, copper, pumpkin, waterlog};

/// The catalogue shipped with the crate.
pub const CATALOGUE: &str = include_str!("../assets/blocks.toml");

/// Maps catalogue names to vanilla code.
pub struct VanillaResolver;

impl BehaviorResolver for VanillaResolver {
    fn behavior(&self, name: &str) -> Option<BlockBehavior> {
        match name {
            "chest" => Some(chest::BEHAVIOR),
            "copper" => Some(copper::BEHAVIOR),
            "copper_stairs" => Some(copper::STAIRS_BEHAVIOR),
            "pumpkin" => Some(pumpkin::BEHAVIOR),
            _ => None,
        }
    }

    fn entity(&self, name: &str) -> Option<Arc<dyn EntityBacked>> {
        match name {
            "chest" => Some(Arc::new(chest::ChestEntity)),
            _ => None,
        }
    }

    fn liquid(&self, name: &str) -> Option<Arc<dyn LiquidContainer>> {
        match name {
            "waterlog" => Some(Arc::new(waterlog::Waterloggable)),
            _ => None,
        }
    }
}

/// Build a registry from catalogue text.
pub fn registry_from_str(toml: &str) -> Result<BlockRegistry> {
    let cfg = BlocksConfig::from_toml_str(toml).context("parsing block catalogue")?;
    let registry = RegistryBuilder::from_config(cfg, &VanillaResolver)
        .context("resolving block catalogue")?
        .build()
        .context("validating block catalogue")?;
    Ok(registry)
}

/// The built-in catalogue.
pub fn registry() -> Result<BlockRegistry> {
    registry_from_str(CATALOGUE)
}

/// A catalogue file on disk, e.g. one passed with `--blocks`.
pub fn load(path: &Path) -> Result<BlockRegistry> {
    load_registry(path, &VanillaResolver).with_context(|| format!("loading {}", path.display()))
}

/// Default states of the blocks the demo and rules place by name.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub air: BlockId,
    pub stone: BlockId,
    pub glass: BlockId,
    pub water: BlockId,
    pub chest: BlockId,
    pub copper: BlockId,
    pub cut_copper_stairs: BlockId,
    pub pumpkin: BlockId,
}

impl Palette {
    pub fn new(registry: &BlockRegistry) -> Result<Self> {
        let state = |name: &str| {
            registry
                .default_state(name)
                .with_context(|| format!("catalogue has no `{name}` block"))
        };
        Ok(Self {
            air: BlockId::AIR,
            stone: state("stone")?,
            glass: state("glass")?,
            water: state("water")?,
            chest: state("chest")?,
            copper: state("copper_block")?,
            cut_copper_stairs: state("cut_copper_stairs")?,
            pumpkin: state("pumpkin")?,
        })
    }
}

/// Is the cell at `pos` a full cube that blocks light? Glass is not.
pub fn is_solid(registry: &BlockRegistry, view: &dyn BlockView, pos: BlockPos) -> bool {
    let cell = registry.cell_at(view, pos);
    behavior::shape(&cell, view).is_full() && !behavior::propagates_skylight(&cell, view)
}
