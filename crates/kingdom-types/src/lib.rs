//! Shared type definitions for the Kingdom Petitions game.
//!
//! This crate is the single source of truth for the persisted kingdom
//! record and the small vocabularies (seasons, tax rates, advisors, stats)
//! that the engine, the store, and the command API all speak.
//!
//! # Modules
//!
//! - [`ids`] -- Player identifier newtype
//! - [`enums`] -- Seasons, tax rates, advisors, decisions, confirmations
//! - [`stats`] -- Numeric kingdom stats, delta maps, and change records
//! - [`flags`] -- Flag payloads used to chain multi-day petitions
//! - [`kingdom`] -- The persisted per-player kingdom record

pub mod enums;
pub mod flags;
pub mod ids;
pub mod kingdom;
pub mod stats;

// Re-export all public types at crate root for convenience.
pub use enums::{Advisor, ConfirmAction, Decision, EndReason, Season, TaxRate};
pub use flags::{FlagValue, JailCohort, PRISONERS_FLAG};
pub use ids::PlayerId;
pub use kingdom::{Kingdom, KingdomPhase, PendingConfirmation, StartingStats};
pub use stats::{Stat, StatChange, StatDeltas, StatSnapshot};
