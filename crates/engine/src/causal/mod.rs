//! Event propagation: cell replacements, neighbor notifications and random
//! ticks form a DAG, drained by the scheduler.

pub mod event;
pub mod graph;
pub mod scheduler;
