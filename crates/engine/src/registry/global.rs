//! Process-wide registry, installed once during startup.

use std::sync::OnceLock;

use super::{BlockRegistry, RegistryError};

static REGISTRY: OnceLock<BlockRegistry> = OnceLock::new();

/// Install the process-wide registry. Any second installation is a
/// configuration error: types cannot be registered once the game runs.
pub fn install(registry: BlockRegistry) -> Result<&'static BlockRegistry, RegistryError> {
    let mut fresh = false;
    let installed = REGISTRY.get_or_init(|| {
        fresh = true;
        registry
    });
    if fresh {
        tracing::info!("block registry installed ({} types)", installed.len());
        Ok(installed)
    } else {
        Err(RegistryError::AlreadyInstalled)
    }
}

/// The installed registry, if startup has completed.
pub fn get() -> Option<&'static BlockRegistry> {
    REGISTRY.get()
}

pub fn is_installed() -> bool {
    REGISTRY.get().is_some()
}
