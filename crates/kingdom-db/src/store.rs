//! The storage contract and the runtime-selected backend.

use std::future::Future;

use kingdom_types::{Kingdom, PlayerId};

use crate::dragonfly::DragonflyStore;
use crate::error::DbError;
use crate::memory::MemoryStore;

/// Load and save whole kingdom records, keyed by player.
///
/// Implementations must be linearizable per key: a `load` after a completed
/// `save` for the same player observes that save. Ended kingdoms are saved
/// like any other record; nothing is ever deleted by the game.
pub trait KingdomStore {
    /// Fetch the record for `player`, or `None` if they never founded one.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend cannot be read or the stored
    /// record does not deserialize.
    fn load(
        &self,
        player: &PlayerId,
    ) -> impl Future<Output = Result<Option<Kingdom>, DbError>> + Send;

    /// Persist `kingdom`, replacing any previous record for its player.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the record cannot be serialized or written.
    fn save(&self, kingdom: &Kingdom) -> impl Future<Output = Result<(), DbError>> + Send;
}

/// The store chosen at startup.
#[derive(Clone)]
pub enum StoreBackend {
    /// Process-local map.
    Memory(MemoryStore),
    /// Shared `Dragonfly` instance.
    Dragonfly(DragonflyStore),
}

impl StoreBackend {
    /// Short name of the backend, for logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Dragonfly(_) => "dragonfly",
        }
    }
}

impl KingdomStore for StoreBackend {
    async fn load(&self, player: &PlayerId) -> Result<Option<Kingdom>, DbError> {
        match self {
            Self::Memory(store) => store.load(player).await,
            Self::Dragonfly(store) => store.load(player).await,
        }
    }

    async fn save(&self, kingdom: &Kingdom) -> Result<(), DbError> {
        match self {
            Self::Memory(store) => store.save(kingdom).await,
            Self::Dragonfly(store) => store.save(kingdom).await,
        }
    }
}

impl From<MemoryStore> for StoreBackend {
    fn from(store: MemoryStore) -> Self {
        Self::Memory(store)
    }
}

impl From<DragonflyStore> for StoreBackend {
    fn from(store: DragonflyStore) -> Self {
        Self::Dragonfly(store)
    }
}
