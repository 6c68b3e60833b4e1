//! `Dragonfly` (Redis-compatible) kingdom store.
//!
//! # Key Patterns
//!
//! | Pattern | Type | Description |
//! |---------|------|-------------|
//! | `kingdom:{player}` | JSON | Full kingdom record |

use fred::prelude::*;
use kingdom_types::{Kingdom, PlayerId};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::DbError;
use crate::store::KingdomStore;

/// Connection handle to a `Dragonfly` instance holding kingdom records.
#[derive(Clone)]
pub struct DragonflyStore {
    client: Client,
}

impl DragonflyStore {
    /// Connect to `Dragonfly` at the given URL.
    ///
    /// The URL should follow the Redis URL scheme:
    /// `redis://host:port` or `redis://host:port/db`
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the URL cannot be parsed.
    /// Returns [`DbError::Dragonfly`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let config = Config::from_url(url)
            .map_err(|e| DbError::Config(format!("Invalid Dragonfly URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!("Connected to Dragonfly");
        Ok(Self { client })
    }

    /// The key a player's record lives under.
    pub fn key(player: &PlayerId) -> String {
        format!("kingdom:{player}")
    }

    /// Delete the record stored for `player`. Deleting a missing record
    /// is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the delete fails.
    pub async fn delete(&self, player: &PlayerId) -> Result<(), DbError> {
        let _: u32 = self.client.del(Self::key(player)).await?;
        Ok(())
    }

    async fn set_json<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), DbError> {
        let json = serde_json::to_string(value)?;
        let _: () = self.client.set(key, json.as_str(), None, None, false).await?;
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DbError> {
        let value: Option<String> = self.client.get(key).await?;
        value
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(DbError::from)
    }
}

impl KingdomStore for DragonflyStore {
    async fn load(&self, player: &PlayerId) -> Result<Option<Kingdom>, DbError> {
        self.get_json(&Self::key(player)).await
    }

    async fn save(&self, kingdom: &Kingdom) -> Result<(), DbError> {
        self.set_json(&Self::key(&kingdom.player_id), kingdom).await?;
        tracing::debug!(player = %kingdom.player_id, day = kingdom.day, "kingdom saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_uses_player_name() {
        assert_eq!(DragonflyStore::key(&PlayerId::from("Arthur")), "kingdom:Arthur");
    }
}
