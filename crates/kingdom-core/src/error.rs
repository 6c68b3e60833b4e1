//! Error types for engine construction.
//!
//! Player mistakes are never errors: they come back as a single
//! explanatory line with nothing to save. These variants cover a game
//! that cannot be assembled in the first place.

use crate::catalog::CatalogError;
use crate::config::ConfigError;

/// Errors that prevent a [`GameContext`](crate::context::GameContext) from
/// being built.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The configuration could not be loaded or validated.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The petition catalog is malformed.
    #[error("catalog error: {source}")]
    Catalog {
        /// The underlying catalog error.
        #[from]
        source: CatalogError,
    },
}
