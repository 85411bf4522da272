//! Block catalogue as data.
//!
//! The per-type mappings that need no code (properties, defaults, fixed
//! shapes, render class, skylight flag, weathering bindings, pairing
//! properties) come from a TOML file. Anything that needs code is named in
//! the file and looked up through a [`BehaviorResolver`] supplied by the
//! game crate.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::behavior::{Aabb, BlockBehavior, FixedShape, RenderShape, ShapeRule};
use crate::capability::{EntityBacked, LiquidContainer};
use crate::combine::CombineRule;
use crate::registry::{BlockRegistry, BlockTypeDef, RegistryBuilder, RegistryError};
use crate::state::Property;
use crate::weathering::WeatherBinding;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing block catalogue: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

// Top-level blocks config file
#[derive(Deserialize, Debug)]
pub struct BlocksConfig {
    pub blocks: Vec<BlockDef>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BlockDef {
    pub name: String,

    /// Property name → allowed values, in declaration order.
    #[serde(default)]
    pub properties: IndexMap<String, Vec<String>>,
    #[serde(default)]
    pub default: HashMap<String, String>,

    /// Named code behavior (`"chest"`, `"copper"`, ...).
    #[serde(default)]
    pub behavior: Option<String>,
    #[serde(default)]
    pub shape: Option<ShapeConfig>,
    #[serde(default)]
    pub render: Option<RenderShape>,
    #[serde(default)]
    pub skylight: Option<bool>,

    /// Named entity-backed capability.
    #[serde(default)]
    pub entity: Option<String>,
    /// Named liquid-container capability.
    #[serde(default)]
    pub liquid: Option<String>,
    #[serde(default)]
    pub shearable: bool,
    #[serde(default)]
    pub weathering: Option<WeatherBinding>,
    #[serde(default)]
    pub combine: Option<CombineRule>,
}

// Shape config supports either a keyword ("full", "empty") or a box in
// sixteenths of a block.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum ShapeConfig {
    Simple(String),
    Box { from: [f32; 3], to: [f32; 3] },
}

/// Maps the names used in the catalogue to code.
pub trait BehaviorResolver {
    fn behavior(&self, name: &str) -> Option<BlockBehavior>;
    fn entity(&self, name: &str) -> Option<Arc<dyn EntityBacked>>;
    fn liquid(&self, name: &str) -> Option<Arc<dyn LiquidContainer>>;
}

impl BlocksConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

impl BlockDef {
    /// Turn this entry into a registrable definition.
    pub fn compile(&self, resolver: &dyn BehaviorResolver) -> Result<BlockTypeDef, RegistryError> {
        let unknown = |what: &'static str, name: &str| RegistryError::UnknownBehavior {
            block: self.name.clone(),
            what,
            name: name.to_string(),
        };

        let mut behavior = match &self.behavior {
            Some(name) => resolver
                .behavior(name)
                .ok_or_else(|| unknown("behavior", name))?,
            None => BlockBehavior::default(),
        };
        if let Some(shape) = &self.shape {
            behavior.shape = match shape {
                ShapeConfig::Simple(kind) => match kind.as_str() {
                    "full" => ShapeRule::Fixed(FixedShape::Full),
                    "empty" => ShapeRule::Fixed(FixedShape::Empty),
                    other => return Err(unknown("shape", other)),
                },
                ShapeConfig::Box { from, to } => {
                    ShapeRule::Fixed(FixedShape::Box(Aabb::from_pixels(*from, *to)))
                }
            };
        }
        if let Some(render) = self.render {
            behavior.render = render;
        }
        if let Some(skylight) = self.skylight {
            behavior.propagates_skylight = Some(skylight);
        }

        let mut def = BlockTypeDef::new(self.name.clone()).behavior(behavior);
        def.properties = self
            .properties
            .iter()
            .map(|(name, values)| Property {
                name: name.clone(),
                values: values.clone(),
            })
            .collect();
        def.defaults = self
            .default
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if let Some(name) = &self.entity {
            let entity = resolver.entity(name).ok_or_else(|| unknown("entity", name))?;
            def.capabilities.entity = Some(entity);
        }
        if let Some(name) = &self.liquid {
            let liquid = resolver.liquid(name).ok_or_else(|| unknown("liquid", name))?;
            def.capabilities.liquid = Some(liquid);
        }
        def.capabilities.shearable = self.shearable;
        def.capabilities.weathering = self.weathering.clone();
        def.combine = self.combine.clone();
        Ok(def)
    }
}

impl RegistryBuilder {
    /// Register every entry of `cfg`, resolving named code through
    /// `resolver`.
    pub fn from_config(
        cfg: BlocksConfig,
        resolver: &dyn BehaviorResolver,
    ) -> Result<RegistryBuilder, RegistryError> {
        let mut builder = RegistryBuilder::new();
        for def in cfg.blocks {
            builder.register(def.compile(resolver)?);
        }
        Ok(builder)
    }
}

/// Load and build a registry in one go.
pub fn load_registry(
    path: impl AsRef<Path>,
    resolver: &dyn BehaviorResolver,
) -> Result<BlockRegistry, ConfigError> {
    let cfg = BlocksConfig::from_path(path)?;
    Ok(RegistryBuilder::from_config(cfg, resolver)?.build()?)
}
