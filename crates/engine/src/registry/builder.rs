use std::collections::HashSet;
use std::sync::Arc;

use super::error::RegistryError;
use super::{BlockRegistry, BlockType, BlockTypeId};
use crate::behavior::BlockBehavior;
use crate::capability::{Capabilities, EntityBacked, LiquidContainer};
use crate::combine::CombineRule;
use crate::state::{Property, StateSchema};
use crate::weathering::{WeatherBinding, WeatherState, WeatherTable};
use crate::world::block::BlockId;
use crate::world::position::Direction;

/// Everything needed to register one block type.
#[derive(Clone)]
pub struct BlockTypeDef {
    pub name: String,
    pub properties: Vec<Property>,
    /// Default values; unlisted properties default to their first value.
    pub defaults: Vec<(String, String)>,
    pub behavior: BlockBehavior,
    pub capabilities: Capabilities,
    pub combine: Option<CombineRule>,
}

impl BlockTypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            defaults: Vec::new(),
            behavior: BlockBehavior::default(),
            capabilities: Capabilities::default(),
            combine: None,
        }
    }

    pub fn property(mut self, name: &str, values: &[&str]) -> Self {
        self.properties.push(Property::new(name, values));
        self
    }

    /// A `true`/`false` property defaulting to `false`.
    pub fn boolean(mut self, name: &str) -> Self {
        self.properties.push(Property::boolean(name));
        self.defaults.push((name.to_string(), "false".to_string()));
        self
    }

    pub fn with_default(mut self, name: &str, value: &str) -> Self {
        self.defaults.push((name.to_string(), value.to_string()));
        self
    }

    pub fn behavior(mut self, behavior: BlockBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn entity(mut self, entity: Arc<dyn EntityBacked>) -> Self {
        self.capabilities.entity = Some(entity);
        self
    }

    pub fn liquid(mut self, liquid: Arc<dyn LiquidContainer>) -> Self {
        self.capabilities.liquid = Some(liquid);
        self
    }

    pub fn shearable(mut self) -> Self {
        self.capabilities.shearable = true;
        self
    }

    pub fn weathering(mut self, family: &str, stage: WeatherState) -> Self {
        self.capabilities.weathering = Some(WeatherBinding {
            family: family.to_string(),
            stage,
        });
        self
    }

    pub fn combinable(mut self, rule: CombineRule) -> Self {
        self.combine = Some(rule);
        self
    }
}

/// Collects type definitions and validates them into a [`BlockRegistry`].
///
/// `air` is always registered first, so it owns type 0 and state id 0.
pub struct RegistryBuilder {
    defs: Vec<BlockTypeDef>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            defs: vec![BlockTypeDef::new("air").behavior(BlockBehavior::air())],
        }
    }

    pub fn register(&mut self, def: BlockTypeDef) -> &mut Self {
        self.defs.push(def);
        self
    }

    pub fn build(self) -> Result<BlockRegistry, RegistryError> {
        let mut seen = HashSet::new();
        let mut types = Vec::with_capacity(self.defs.len());
        let mut next_base: u32 = 0;

        for (index, def) in self.defs.into_iter().enumerate() {
            if !seen.insert(def.name.clone()) {
                return Err(RegistryError::DuplicateType(def.name));
            }
            validate_properties(&def)?;
            if let Some(rule) = &def.combine {
                validate_combine_rule(&def, rule)?;
            }

            let schema = StateSchema::new(def.properties);
            let default_offset = schema
                .pack(
                    0,
                    def.defaults.iter().map(|(k, v)| (k.as_str(), v.as_str())),
                )
                .ok_or_else(|| {
                    let (property, value) = def
                        .defaults
                        .iter()
                        .find(|(k, v)| schema.with_value(0, k, v).is_none())
                        .cloned()
                        .unwrap_or_default();
                    RegistryError::InvalidDefault {
                        block: def.name.clone(),
                        property,
                        value,
                    }
                })?;

            let needed = schema.state_count();
            let available = (u16::MAX as u32 + 1) - next_base;
            if needed > available {
                return Err(RegistryError::IdSpaceExhausted {
                    block: def.name,
                    needed,
                    available,
                });
            }

            let capability_set = def.capabilities.set();
            types.push(BlockType {
                id: BlockTypeId(index as u16),
                name: def.name,
                schema,
                base: BlockId(next_base as u16),
                default_offset,
                behavior: def.behavior,
                capabilities: def.capabilities,
                capability_set,
                combine: def.combine,
            });
            next_base += needed;
        }

        let weather = WeatherTable::build(&types)?;
        let registry = BlockRegistry::from_parts(types, weather);
        tracing::debug!(
            "block registry built: {} types, {} states",
            registry.len(),
            registry.state_count()
        );
        Ok(registry)
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_properties(def: &BlockTypeDef) -> Result<(), RegistryError> {
    let mut names = HashSet::new();
    for prop in &def.properties {
        if !names.insert(prop.name.as_str()) {
            return Err(RegistryError::DuplicateProperty {
                block: def.name.clone(),
                property: prop.name.clone(),
            });
        }
        if prop.values.is_empty() {
            return Err(RegistryError::EmptyProperty {
                block: def.name.clone(),
                property: prop.name.clone(),
            });
        }
        let mut values = HashSet::new();
        for value in &prop.values {
            if !values.insert(value.as_str()) {
                return Err(RegistryError::DuplicateValue {
                    block: def.name.clone(),
                    property: prop.name.clone(),
                    value: value.clone(),
                });
            }
        }
    }
    Ok(())
}

fn validate_combine_rule(def: &BlockTypeDef, rule: &CombineRule) -> Result<(), RegistryError> {
    let invalid = |reason: String| RegistryError::InvalidCombineRule {
        block: def.name.clone(),
        reason,
    };
    let find = |name: &str| def.properties.iter().find(|p| p.name == name);

    let facing = find(&rule.facing)
        .ok_or_else(|| invalid(format!("missing facing property `{}`", rule.facing)))?;
    if let Some(bad) = facing
        .values
        .iter()
        .find(|v| !Direction::from_name(v).is_some_and(Direction::is_horizontal))
    {
        return Err(invalid(format!(
            "facing value `{bad}` is not a horizontal direction"
        )));
    }

    let pairing = find(&rule.pairing)
        .ok_or_else(|| invalid(format!("missing pairing property `{}`", rule.pairing)))?;
    for required in crate::combine::Pairing::ALL {
        if pairing.position(required.name()).is_none() {
            return Err(invalid(format!(
                "pairing property `{}` lacks value `{}`",
                rule.pairing,
                required.name()
            )));
        }
    }
    Ok(())
}
