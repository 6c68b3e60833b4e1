//! Persistence boundary for kingdom records.
//!
//! The engine never talks to storage directly. The command service loads a
//! record, runs one command, and saves the result through a
//! [`KingdomStore`]. The store is the only source of truth between calls.
//!
//! # Backends
//!
//! ```text
//! CommandService
//!     |
//!     +-- load / save --> StoreBackend
//!                            |-- MemoryStore     (process-local map, tests and dev)
//!                            +-- DragonflyStore  (kingdom:{player} JSON values)
//! ```
//!
//! # Modules
//!
//! - [`store`] -- The [`KingdomStore`] trait and the [`StoreBackend`] dispatcher
//! - [`memory`] -- In-process store behind a `tokio` lock
//! - [`dragonfly`] -- `Dragonfly` (Redis-compatible) store
//! - [`error`] -- Shared error types

pub mod dragonfly;
pub mod error;
pub mod memory;
pub mod store;

pub use dragonfly::DragonflyStore;
pub use error::DbError;
pub use memory::MemoryStore;
pub use store::{KingdomStore, StoreBackend};
