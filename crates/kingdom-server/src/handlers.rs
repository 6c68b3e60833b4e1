//! HTTP endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/command` | Run a chat command for a player |
//! | `GET` | `/health` | Liveness and store backend |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use kingdom_core::Command;
use kingdom_types::PlayerId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::service::CommandService;
use crate::state::AppState;

/// Body of `POST /command`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    /// Chat name of the player issuing the command.
    pub player_name: Option<String>,
    /// The command word, including the leading `!`.
    pub command: Option<String>,
    /// Words following the command.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Response of `POST /command`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    /// Lines to post back into chat, in order.
    pub replies: Vec<String>,
}

/// Run one chat command.
///
/// Unknown commands answer with no lines so the bridge stays silent.
///
/// # Errors
///
/// Returns [`ApiError`] if the body is malformed or `playerName` or
/// `command` is missing.
pub async fn post_command(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CommandRequest>, JsonRejection>,
) -> Result<Json<CommandResponse>, ApiError> {
    let Json(request) = body?;

    let player = request
        .player_name
        .as_deref()
        .map(PlayerId::new)
        .filter(|p| !p.is_empty())
        .ok_or(ApiError::MissingField)?;
    let word = request
        .command
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or(ApiError::MissingField)?;

    let Some(command) = Command::parse(word, &request.args) else {
        debug!(player = %player, command = word, "ignoring unknown command");
        return Ok(Json(CommandResponse { replies: Vec::new() }));
    };

    let replies = CommandService::new(state).run(&player, &command).await;
    Ok(Json(CommandResponse { replies }))
}

/// Report liveness.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "store": state.store.kind(),
    }))
}
