use thiserror::Error;

use crate::weathering::WeatherState;

/// Configuration errors caught while building a [`super::BlockRegistry`].
///
/// These are fatal: once `build()` succeeds, queries assume every binding
/// and property value they meet is valid.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("block type `{0}` is registered twice")]
    DuplicateType(String),

    #[error("block type `{block}` declares property `{property}` twice")]
    DuplicateProperty { block: String, property: String },

    #[error("property `{property}` of `{block}` has no values")]
    EmptyProperty { block: String, property: String },

    #[error("property `{property}` of `{block}` lists value `{value}` twice")]
    DuplicateValue {
        block: String,
        property: String,
        value: String,
    },

    #[error("default `{property}={value}` of `{block}` is outside the declared domain")]
    InvalidDefault {
        block: String,
        property: String,
        value: String,
    },

    #[error("`{block}` needs {needed} state ids but only {available} remain")]
    IdSpaceExhausted {
        block: String,
        needed: u32,
        available: u32,
    },

    #[error("weathering family `{family}` binds {state:?} to both `{first}` and `{second}`")]
    DuplicateWeatherBinding {
        family: String,
        state: WeatherState,
        first: String,
        second: String,
    },

    #[error("weathering family `{family}` has no block bound to {missing:?}")]
    WeatherGap {
        family: String,
        missing: WeatherState,
    },

    #[error("combinable `{block}`: {reason}")]
    InvalidCombineRule { block: String, reason: String },

    #[error("`{block}` refers to unknown {what} `{name}`")]
    UnknownBehavior {
        block: String,
        what: &'static str,
        name: String,
    },

    #[error("a block registry is already installed")]
    AlreadyInstalled,
}
