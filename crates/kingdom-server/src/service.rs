//! Load, execute, save.
//!
//! [`CommandService`] is the dispatch boundary: it takes a player's lock,
//! loads their record, hands it to the engine, and persists whatever the
//! engine returns. Read-only commands skip the lock and the save. A store
//! failure is logged and answered with a single generic line; saving is the
//! last step, so a failed command leaves the stored record untouched.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kingdom_core::{Command, commands};
use kingdom_db::{DbError, KingdomStore};
use kingdom_types::PlayerId;
use tracing::{debug, error, warn};

use crate::state::AppState;

/// The line shown when a command fails for reasons outside the game.
pub const CRITICAL_FAILURE_LINE: &str = "A critical server error occurred.";

/// Runs commands against the shared state.
#[derive(Clone)]
pub struct CommandService {
    state: Arc<AppState>,
}

impl CommandService {
    /// Create a service over shared state.
    pub const fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Run `command` for `player` and return the reply lines.
    ///
    /// Never fails: internal faults become [`CRITICAL_FAILURE_LINE`].
    pub async fn run(&self, player: &PlayerId, command: &Command) -> Vec<String> {
        match self.try_run(player, command, Utc::now()).await {
            Ok(replies) => replies,
            Err(e) => {
                error!(player = %player, ?command, error = %e, "command failed");
                vec![CRITICAL_FAILURE_LINE.to_owned()]
            }
        }
    }

    async fn try_run(
        &self,
        player: &PlayerId,
        command: &Command,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, DbError> {
        if command.is_read_only() {
            return self.read(player, command, now).await;
        }

        let lock = self.state.player_lock(player).await;
        let result = {
            let _guard = lock.lock().await;
            self.execute_and_save(player, command, now).await
        };
        self.state.release_player_lock(player, lock).await;
        result
    }

    /// Answer a command that never writes, without taking the player lock.
    async fn read(
        &self,
        player: &PlayerId,
        command: &Command,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, DbError> {
        let record = if *command == Command::Help {
            None
        } else {
            self.state.store.load(player).await?
        };
        let outcome = {
            let mut rng = rand::rng();
            commands::execute(&self.state.ctx, record, player, command, now, &mut rng)
        };
        Ok(outcome.replies)
    }

    async fn execute_and_save(
        &self,
        player: &PlayerId,
        command: &Command,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, DbError> {
        let record = self.state.store.load(player).await?;

        let outcome = {
            let mut rng = rand::rng();
            commands::execute(&self.state.ctx, record, player, command, now, &mut rng)
        };

        if let Some(kingdom) = &outcome.save {
            self.state.store.save(kingdom).await?;
            if let Some(pending) = kingdom.pending_confirmation {
                self.schedule_cleanup(player.clone(), pending.expires_at);
            }
        }

        Ok(outcome.replies)
    }

    /// Clear `player`'s confirmation if it has expired by `now`.
    ///
    /// Returns whether a record was rewritten. Every command re-checks
    /// expiry on its own, so this only keeps stored records tidy.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the record cannot be loaded or saved.
    pub async fn clear_expired_confirmation(
        &self,
        player: &PlayerId,
        now: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let lock = self.state.player_lock(player).await;
        let result = {
            let _guard = lock.lock().await;
            self.clear_if_expired(player, now).await
        };
        self.state.release_player_lock(player, lock).await;
        result
    }

    async fn clear_if_expired(&self, player: &PlayerId, now: DateTime<Utc>) -> Result<bool, DbError> {
        let Some(mut kingdom) = self.state.store.load(player).await? else {
            return Ok(false);
        };
        let expired = kingdom
            .pending_confirmation
            .is_some_and(|pending| !pending.is_live(now));
        if expired {
            kingdom.pending_confirmation = None;
            self.state.store.save(&kingdom).await?;
            debug!(player = %player, "expired confirmation cleared");
        }
        Ok(expired)
    }

    /// Best-effort cleanup once `expires_at` has passed.
    fn schedule_cleanup(&self, player: PlayerId, expires_at: DateTime<Utc>) {
        let service = self.clone();
        tokio::spawn(async move {
            let wait = expires_at
                .signed_duration_since(Utc::now())
                .to_std()
                .unwrap_or_default();
            tokio::time::sleep(wait).await;
            if let Err(e) = service
                .clear_expired_confirmation(&player, Utc::now())
                .await
            {
                warn!(player = %player, error = %e, "confirmation cleanup failed");
            }
        });
    }
}
