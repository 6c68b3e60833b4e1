//! Shared application state for the command API server.
//!
//! [`AppState`] holds the game context (catalog and rules, fixed at
//! startup), the kingdom store, and a registry of per-player locks that
//! serializes commands for the same kingdom.

use std::collections::BTreeMap;
use std::sync::Arc;

use kingdom_core::GameContext;
use kingdom_db::StoreBackend;
use kingdom_types::PlayerId;
use tokio::sync::Mutex;

/// Shared state for all request handlers.
pub struct AppState {
    /// Catalog and configuration.
    pub ctx: GameContext,
    /// Where kingdom records live.
    pub store: StoreBackend,
    /// One lock per player with a command in flight.
    locks: Mutex<BTreeMap<PlayerId, Arc<Mutex<()>>>>,
}

impl AppState {
    /// Create state around a game context and a store.
    pub fn new(ctx: GameContext, store: StoreBackend) -> Self {
        Self {
            ctx,
            store,
            locks: Mutex::new(BTreeMap::new()),
        }
    }

    /// The lock guarding `player`'s record, created on first use.
    pub async fn player_lock(&self, player: &PlayerId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(player.clone()).or_default())
    }

    /// Hand back a lock from [`Self::player_lock`], forgetting the entry
    /// once no other request holds or awaits it.
    pub async fn release_player_lock(&self, player: &PlayerId, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        drop(lock);
        if locks
            .get(player)
            .is_some_and(|held| Arc::strong_count(held) == 1)
        {
            locks.remove(player);
        }
    }

    #[cfg(test)]
    pub(crate) async fn tracked_players(&self) -> usize {
        self.locks.lock().await.len()
    }
}
