//! Enumeration types for the Kingdom Petitions game.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Seasons
// ---------------------------------------------------------------------------

/// A season in the kingdom's annual cycle.
///
/// The cycle order and length come from configuration; this enum only
/// names the seasons so events can be gated on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    /// Population grows.
    Spring,
    /// The people are content.
    Summer,
    /// Harvest income.
    Autumn,
    /// The cold saps morale.
    Winter,
}

impl Season {
    /// Parse a season name, case-insensitively. `fall` is accepted for autumn.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "spring" => Some(Self::Spring),
            "summer" => Some(Self::Summer),
            "autumn" | "fall" => Some(Self::Autumn),
            "winter" => Some(Self::Winter),
            _ => None,
        }
    }

    /// Display name used in narrative lines.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Autumn => "Autumn",
            Self::Winter => "Winter",
        }
    }
}

impl core::fmt::Display for Season {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Tax rates
// ---------------------------------------------------------------------------

/// The kingdom's tax level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxRate {
    /// Lowest income, pleases the people.
    Low,
    /// Baseline income.
    Normal,
    /// Highest income, angers the people.
    High,
}

impl TaxRate {
    /// Every tax level, most lenient first.
    pub const ALL: [Self; 3] = [Self::Low, Self::Normal, Self::High];

    /// Parse a tax level name as typed by a player.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "normal" => Some(Self::Normal),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// The most lenient setting; unrest penalties never apply at this level.
    pub const fn most_lenient() -> Self {
        Self::Low
    }

    /// Lowercase key used in commands and configuration.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}

// ---------------------------------------------------------------------------
// Advisors
// ---------------------------------------------------------------------------

/// A member of the royal council that can be hired through petitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisor {
    /// Commands the army; raises military every day.
    General,
    /// Keeps the ledgers; improves tax collection.
    Treasurer,
    /// Runs the spy network; unsettles the people.
    Spymaster,
}

impl Advisor {
    /// Every advisor, in council order.
    pub const ALL: [Self; 3] = [Self::General, Self::Treasurer, Self::Spymaster];
}

// ---------------------------------------------------------------------------
// Decisions and confirmations
// ---------------------------------------------------------------------------

/// The answer given to a petition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// The player said yes.
    Yes,
    /// The player said no.
    No,
    /// Synthetic answer used when a narrative-only petition auto-resolves.
    Acknowledge,
}

/// A destructive command waiting for the player to confirm it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmAction {
    /// Replace the active kingdom with a fresh one.
    Reset,
    /// End the active reign.
    Abdicate,
}

// ---------------------------------------------------------------------------
// End of reign
// ---------------------------------------------------------------------------

/// Why a reign ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The treasury was negative at a day boundary with no rescue in sight.
    Bankrupt,
    /// Happiness fell to zero or below.
    Revolt,
    /// The player gave up the throne.
    Abdicated,
    /// A petition outcome ended the game outright.
    Collapse,
}

impl EndReason {
    /// Short machine-readable key.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Bankrupt => "bankrupt",
            Self::Revolt => "revolt",
            Self::Abdicated => "abdicated",
            Self::Collapse => "collapse",
        }
    }

    /// The line shown to the player when the reign ends.
    pub const fn message(self) -> &'static str {
        match self {
            Self::Bankrupt => "The kingdom is bankrupt!",
            Self::Revolt => "The people have revolted!",
            Self::Abdicated => "You have abdicated the throne.",
            Self::Collapse => "The kingdom has collapsed into chaos.",
        }
    }
}
