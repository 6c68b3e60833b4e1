//! In-process kingdom store.
//!
//! Records are kept as values in a map behind a `tokio` read/write lock, so
//! every `load` returns an owned copy and no caller can mutate stored state
//! without going through `save`.

use std::collections::BTreeMap;
use std::sync::Arc;

use kingdom_types::{Kingdom, PlayerId};
use tokio::sync::RwLock;

use crate::error::DbError;
use crate::store::KingdomStore;

/// A cloneable handle to a shared in-memory map of kingdom records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<BTreeMap<PlayerId, Kingdom>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl KingdomStore for MemoryStore {
    async fn load(&self, player: &PlayerId) -> Result<Option<Kingdom>, DbError> {
        Ok(self.records.read().await.get(player).cloned())
    }

    async fn save(&self, kingdom: &Kingdom) -> Result<(), DbError> {
        self.records
            .write()
            .await
            .insert(kingdom.player_id.clone(), kingdom.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kingdom_types::StartingStats;

    use super::*;

    #[tokio::test]
    async fn load_missing_player_is_none() {
        let store = MemoryStore::new();
        let loaded = store.load(&PlayerId::from("Nobody")).await.unwrap();
        assert!(loaded.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn save_then_load_returns_latest_record() {
        let store = MemoryStore::new();
        let mut kingdom = Kingdom::new(PlayerId::from("Arthur"), &StartingStats::default());
        store.save(&kingdom).await.unwrap();

        kingdom.day = 4;
        kingdom.treasury = 35;
        store.save(&kingdom).await.unwrap();

        let loaded = store.load(&PlayerId::from("Arthur")).await.unwrap();
        assert_eq!(loaded, Some(kingdom));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn clones_share_records() {
        let store = MemoryStore::new();
        let handle = store.clone();
        let kingdom = Kingdom::new(PlayerId::from("Morgana"), &StartingStats::default());
        handle.save(&kingdom).await.unwrap();
        assert!(store.load(&kingdom.player_id).await.unwrap().is_some());
    }
}
