//! Flag payloads used to chain petitions across days.
//!
//! A flag is a named marker on the kingdom record. Outcomes set them,
//! later eligibility predicates read them, and either a clear-list or the
//! consuming outcome removes them.

use serde::{Deserialize, Serialize};

/// Name of the flag that holds the jail cohorts awaiting release.
pub const PRISONERS_FLAG: &str = "prisoners";

/// The payload stored under a flag name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FlagValue {
    /// A bare marker: the flag is simply present.
    Set,
    /// The day something happened (a loan issued, a quest begun).
    Day(u64),
    /// A severity or state label (e.g. an `entrenched` crime gang).
    Label(String),
    /// An amount granted on a given day, to be partially repaid later.
    Grant {
        /// Day the grant was made.
        day: u64,
        /// Amount of gold handed over.
        amount: i64,
    },
    /// Prisoner cohorts waiting for their release day.
    Cohorts(Vec<JailCohort>),
}

impl FlagValue {
    /// The day recorded by a [`FlagValue::Day`] or [`FlagValue::Grant`].
    pub const fn day(&self) -> Option<u64> {
        match self {
            Self::Day(day) | Self::Grant { day, .. } => Some(*day),
            _ => None,
        }
    }

    /// The label recorded by a [`FlagValue::Label`].
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Label(label) => Some(label),
            _ => None,
        }
    }
}

/// A group of citizens jailed together and released together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JailCohort {
    /// Number of prisoners in the cohort.
    pub count: i64,
    /// First day on which the cohort walks free.
    pub release_day: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_reads_through_grants() {
        assert_eq!(FlagValue::Day(5).day(), Some(5));
        assert_eq!(FlagValue::Grant { day: 9, amount: 120 }.day(), Some(9));
        assert_eq!(FlagValue::Set.day(), None);
    }

    #[test]
    fn flag_value_serializes_tagged() {
        let json = serde_json::to_string(&FlagValue::Day(15)).ok();
        assert_eq!(json.as_deref(), Some(r#"{"kind":"day","value":15}"#));
        let marker = serde_json::to_string(&FlagValue::Set).ok();
        assert_eq!(marker.as_deref(), Some(r#"{"kind":"set"}"#));
    }
}
