//! Vanilla content for the tessera engine: the block catalogue, chests,
//! copper weathering, waterlogging, and the random-tick simulation that
//! drives them.

pub mod behaviors;
pub mod block;
pub mod event_bus;
pub mod rules;
pub mod simulation;
