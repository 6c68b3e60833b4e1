//! The immutable inputs every engine call needs.

use std::path::Path;

use crate::catalog::{Catalog, standard_catalog};
use crate::config::GameConfig;
use crate::error::EngineError;

/// Catalog plus configuration, built once and shared by reference.
#[derive(Debug, Clone)]
pub struct GameContext {
    /// Petition definitions.
    pub catalog: Catalog,
    /// Tunable game rules.
    pub config: GameConfig,
}

impl GameContext {
    /// Pair an arbitrary catalog with a configuration.
    pub const fn new(catalog: Catalog, config: GameConfig) -> Self {
        Self { catalog, config }
    }

    /// The standard petition table with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Catalog`] if the standard table is malformed.
    pub fn standard(config: GameConfig) -> Result<Self, EngineError> {
        Ok(Self::new(standard_catalog()?, config))
    }

    /// Load configuration from `path` and pair it with the standard table.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if the file cannot be read, parsed,
    /// or validated.
    pub fn from_config_file(path: &Path) -> Result<Self, EngineError> {
        Self::standard(GameConfig::from_file(path)?)
    }
}
