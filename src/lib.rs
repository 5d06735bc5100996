//! Core implementation of the engagor script runner
//!
//! Engagor discovers scripts by convention: every directory directly below a
//! scripts root is a group, every executable file inside a group (at any depth)
//! is a script addressed by its file name without extension. A group's
//! `README.md` supplies its one-line description.

use log::debug;

use crate::config_file::{ConfigError, Settings};
use crate::registry::{Registry, RegistryError};

pub mod config_file;
pub mod dispatch;
pub mod group;
pub mod help;
pub mod logger;
pub mod name;
pub mod registry;

/// Errors that can occur while preparing a registry for dispatch
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Build the registry for already resolved settings.
///
/// # Errors
///
/// Returns `RegistryError` if the scripts root is missing or unreadable.
pub fn load_registry(settings: &Settings) -> Result<Registry, RegistryError> {
    debug!(
        "Loading groups from {} (config: {})",
        settings.root.display(),
        settings
            .config_path
            .as_ref()
            .map_or_else(|| "none".to_string(), |p| p.display().to_string())
    );
    Registry::new(&settings.root)
}

/// Resolve settings from the environment and scan the scripts root.
///
/// # Errors
///
/// Returns `LoadError::Config` if configuration cannot be loaded, or
/// `LoadError::Registry` if the scripts root is missing or unreadable.
pub fn load(
    config_file: Option<&std::path::Path>,
    root_override: Option<&std::path::Path>,
) -> Result<(Settings, Registry), LoadError> {
    let settings = Settings::load(config_file, root_override)?;
    let registry = load_registry(&settings)?;
    Ok((settings, registry))
}
