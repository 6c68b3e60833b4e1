//! Petition scheduling, outcome resolution, and daily upkeep for the
//! Kingdom Petitions game.
//!
//! The engine is pure and synchronous. Callers load a kingdom record, run
//! one command through [`commands::execute`] with an injected random source
//! and clock, and persist whatever comes back. Nothing in this crate does
//! I/O beyond reading the config file.
//!
//! # Modules
//!
//! - [`catalog`] -- Petition definitions, outcomes, and the standard table.
//! - [`commands`] -- Command parsing and the confirmation-gated protocol.
//! - [`config`] -- Configuration loading from `kingdom-config.yaml` into
//!   strongly-typed structs.
//! - [`context`] -- [`GameContext`]: catalog plus config, shared by reference.
//! - [`eligibility`] -- Which petitions may be drawn right now.
//! - [`error`] -- Errors that stop a game from being assembled.
//! - [`presenter`] -- Rendering petitions and opening decision points.
//! - [`report`] -- Change summaries, status, and help text.
//! - [`resolver`] -- Applying an answer to the petition in flight.
//! - [`scheduler`] -- The day-boundary state machine, upkeep, and queue draw.
//!
//! [`GameContext`]: context::GameContext

pub mod catalog;
pub mod commands;
pub mod config;
pub mod context;
pub mod eligibility;
pub mod error;
pub mod presenter;
pub mod report;
pub mod resolver;
pub mod scheduler;

pub use commands::{Command, CommandOutcome, execute};
pub use context::GameContext;
pub use error::EngineError;
