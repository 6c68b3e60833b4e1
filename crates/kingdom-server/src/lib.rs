//! Command API server for the Kingdom Petitions game.
//!
//! This crate provides an Axum HTTP server that relays chat commands to the
//! engine:
//!
//! - **`POST /command`** takes `{playerName, command, args}` and answers
//!   `{replies}`, the lines to echo back into chat
//! - **`GET /health`** reports liveness and the store backend in use
//!
//! # Architecture
//!
//! ```text
//! chat bridge ──▶ router ──▶ handlers ──▶ CommandService
//!                                            │
//!                          per-player lock ──┤
//!                                            ▼
//!                          load ──▶ kingdom_core::execute ──▶ save
//! ```
//!
//! Each mutating command is one read-modify-write of a single kingdom
//! record under that player's lock. Different players never contend. The
//! store is the only copy of game state; nothing is cached between
//! requests.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod service;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use service::CommandService;
pub use state::AppState;
