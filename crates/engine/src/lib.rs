//! Game-agnostic block-behavior core.
//!
//! Block ids on a lattice (`world`) are decoded through an immutable
//! `registry` into typed, propertied cells (`state`). Per-type behavior is a
//! record of strategies (`behavior`) plus optional capabilities
//! (`capability`). On top of that sit the two stateful-looking but pure
//! pieces: pairing of adjacent cells into one object (`combine`) and the
//! ageing ladder (`weathering`). Changes propagate as causal events
//! (`causal`, `rules`).
#![forbid(unsafe_code)]

pub mod behavior;
pub mod capability;
pub mod causal;
pub mod combine;
pub mod config;
pub mod registry;
pub mod rules;
pub mod state;
pub mod weathering;
pub mod world;

pub use registry::{BlockRegistry, BlockType, BlockTypeId};
pub use state::BlockCell;
pub use world::World;
