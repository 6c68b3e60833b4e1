//! Numeric kingdom stats and the delta maps that mutate them.
//!
//! Every stat is stored as an `i64`. Treasury and happiness may go
//! negative (that is how bankruptcy and revolt are detected); headcounts
//! are clamped at zero when a delta is applied.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A numeric field of the kingdom record that outcomes may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    /// Gold in the royal coffers.
    Treasury,
    /// Public contentment.
    Happiness,
    /// Free citizens.
    Population,
    /// Soldiers under arms.
    Military,
    /// Citizens held in the royal jails.
    JailedPopulation,
}

impl Stat {
    /// Every stat, in report order.
    pub const ALL: [Self; 5] = [
        Self::Treasury,
        Self::Happiness,
        Self::Population,
        Self::Military,
        Self::JailedPopulation,
    ];

    /// Field name used in change summaries.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Treasury => "treasury",
            Self::Happiness => "happiness",
            Self::Population => "population",
            Self::Military => "military",
            Self::JailedPopulation => "jailed",
        }
    }

    /// Whether the stat is a headcount that can never drop below zero.
    pub const fn is_headcount(self) -> bool {
        matches!(
            self,
            Self::Population | Self::Military | Self::JailedPopulation
        )
    }
}

/// A flat map of stat deltas carried by an outcome, season, or advisor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatDeltas(BTreeMap<Stat, i64>);

impl StatDeltas {
    /// An empty delta map.
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build a delta map from `(stat, delta)` pairs. Repeated stats sum.
    pub fn from_pairs(pairs: &[(Stat, i64)]) -> Self {
        let mut deltas = Self::new();
        for &(stat, delta) in pairs {
            deltas.add(stat, delta);
        }
        deltas
    }

    /// Add `delta` to the entry for `stat`.
    pub fn add(&mut self, stat: Stat, delta: i64) {
        let entry = self.0.entry(stat).or_insert(0);
        *entry = entry.saturating_add(delta);
    }

    /// The delta for `stat`, zero when absent.
    pub fn get(&self, stat: Stat) -> i64 {
        self.0.get(&stat).copied().unwrap_or(0)
    }

    /// Iterate over `(stat, delta)` pairs in stat order.
    pub fn iter(&self) -> impl Iterator<Item = (Stat, i64)> + '_ {
        self.0.iter().map(|(&stat, &delta)| (stat, delta))
    }

    /// Whether the map carries no deltas.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A point-in-time copy of every numeric stat, used to report changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatSnapshot(BTreeMap<Stat, i64>);

impl StatSnapshot {
    /// Capture a snapshot from a stat accessor.
    pub fn capture(read: impl Fn(Stat) -> i64) -> Self {
        Self(Stat::ALL.iter().map(|&stat| (stat, read(stat))).collect())
    }

    /// The captured value of `stat`.
    pub fn get(&self, stat: Stat) -> i64 {
        self.0.get(&stat).copied().unwrap_or(0)
    }

    /// Every stat whose value differs between `self` (before) and `after`.
    pub fn changes_to(&self, after: &Self) -> Vec<StatChange> {
        Stat::ALL
            .iter()
            .filter_map(|&stat| {
                let old = self.get(stat);
                let new = after.get(stat);
                (old != new).then_some(StatChange { stat, old, new })
            })
            .collect()
    }
}

/// A single stat that moved, with its old and new values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatChange {
    /// The stat that changed.
    pub stat: Stat,
    /// Value before the change.
    pub old: i64,
    /// Value after the change.
    pub new: i64,
}
