//! Command API server binary for the Kingdom Petitions game.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `kingdom-config.yaml` (or `KINGDOM_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the petition catalog
//! 4. Open the kingdom store (memory or Dragonfly)
//! 5. Serve `POST /command` until `Ctrl-C`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use kingdom_core::GameContext;
use kingdom_core::config::{GameConfig, StoreKind};
use kingdom_db::{DragonflyStore, MemoryStore, StoreBackend};
use kingdom_server::{AppState, start_server};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Top-level startup failure.
#[derive(Debug, thiserror::Error)]
enum AppError {
    /// Configuration or catalog could not be built.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: kingdom_core::EngineError,
    },

    /// The store could not be opened.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: kingdom_db::DbError,
    },

    /// The HTTP server failed.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: kingdom_server::ServerError,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let mut ctx = load_context().context("failed to load game configuration")?;
    ctx.config.server.apply_env_overrides();

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&ctx.config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("kingdom-server starting");

    // 3. Catalog is built alongside the config.
    info!(
        events = ctx.catalog.len(),
        season_length = ctx.config.time.season_length,
        confirmation_ttl_seconds = ctx.config.confirmation.ttl_seconds,
        "Game context loaded"
    );

    // 4. Open the store.
    let store = open_store(&ctx.config).await?;
    info!(backend = store.kind(), "Kingdom store ready");

    // 5. Serve.
    let server_config = ctx.config.server.clone();
    let state = Arc::new(AppState::new(ctx, store));
    start_server(&server_config, state)
        .await
        .map_err(AppError::from)?;

    Ok(())
}

/// Build the game context from the config file, or defaults if absent.
fn load_context() -> Result<GameContext, AppError> {
    let path = std::env::var("KINGDOM_CONFIG")
        .map_or_else(|_| PathBuf::from("kingdom-config.yaml"), PathBuf::from);
    if path.exists() {
        Ok(GameContext::from_config_file(&path)?)
    } else {
        Ok(GameContext::standard(GameConfig::default())?)
    }
}

async fn open_store(config: &GameConfig) -> Result<StoreBackend, AppError> {
    match config.server.store {
        StoreKind::Memory => Ok(MemoryStore::new().into()),
        StoreKind::Dragonfly => {
            info!(url = config.server.dragonfly_url, "Connecting to Dragonfly");
            Ok(DragonflyStore::connect(&config.server.dragonfly_url)
                .await?
                .into())
        }
    }
}
