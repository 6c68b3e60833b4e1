//! Type-safe player identifier.
//!
//! Kingdoms are keyed by the chat name of the player who founded them.
//! Wrapping the name keeps it from being confused with event IDs or flag
//! names, which are also plain strings.

use serde::{Deserialize, Serialize};

/// Unique identifier for a player (and therefore for their kingdom).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Create a player identifier from a trimmed chat name.
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_owned())
    }

    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty after trimming.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl core::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for PlayerId {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}
