//! Code behind the names used in `assets/blocks.toml`.

pub mod chest;
pub mod copper;
pub mod pumpkin;
pub mod waterlog;
