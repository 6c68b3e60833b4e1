//! The persisted per-player kingdom record.
//!
//! One [`Kingdom`] exists per player. The engine mutates it on every
//! advance or decide call and the store persists it whole. Ended
//! kingdoms are kept (with `game_active = false`) so the length of the
//! last reign can still be reported.
//!
//! # Invariants
//!
//! - `awaiting_decision` implies `current_event_id.is_some()`.
//! - `cursor <= queue.len()`; equality means the day is exhausted.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{Advisor, ConfirmAction, EndReason, Season, TaxRate};
use crate::flags::{FlagValue, JailCohort, PRISONERS_FLAG};
use crate::ids::PlayerId;
use crate::stats::{Stat, StatDeltas, StatSnapshot};

/// Starting values for a freshly founded kingdom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartingStats {
    /// Starting gold.
    #[serde(default = "default_treasury")]
    pub treasury: i64,
    /// Starting happiness.
    #[serde(default = "default_happiness")]
    pub happiness: i64,
    /// Starting population.
    #[serde(default = "default_population")]
    pub population: i64,
    /// Starting military.
    #[serde(default = "default_military")]
    pub military: i64,
    /// Starting tax level.
    #[serde(default = "default_tax_rate")]
    pub tax_rate: TaxRate,
    /// Season the reign begins in.
    #[serde(default = "default_season")]
    pub season: Season,
}

impl Default for StartingStats {
    fn default() -> Self {
        Self {
            treasury: default_treasury(),
            happiness: default_happiness(),
            population: default_population(),
            military: default_military(),
            tax_rate: default_tax_rate(),
            season: default_season(),
        }
    }
}

const fn default_treasury() -> i64 {
    100
}

const fn default_happiness() -> i64 {
    50
}

const fn default_population() -> i64 {
    100
}

const fn default_military() -> i64 {
    10
}

const fn default_tax_rate() -> TaxRate {
    TaxRate::Normal
}

const fn default_season() -> Season {
    Season::Spring
}

/// A destructive command awaiting confirmation, valid until `expires_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingConfirmation {
    /// The command that will run on confirmation.
    pub action: ConfirmAction,
    /// Wall-clock instant after which the confirmation is void.
    pub expires_at: DateTime<Utc>,
}

impl PendingConfirmation {
    /// Whether the confirmation can still be honored at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Where a kingdom currently sits in the command protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KingdomPhase {
    /// The reign has ended; only `create`, `status`, and `help` apply.
    Ended,
    /// A destructive command waits for `confirm`.
    PendingConfirmation,
    /// A petition has been presented and waits for yes or no.
    AwaitingDecision,
    /// Petitions remain in today's queue.
    InDay,
    /// Today's queue is exhausted; the next advance starts a new day.
    DayBoundary,
}

/// The complete persisted state of one player's kingdom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kingdom {
    /// Owner of the kingdom.
    pub player_id: PlayerId,
    /// Days elapsed since founding (0 until the first advance).
    pub day: u64,
    /// Current season.
    pub season: Season,
    /// Day within the current season, starting at 1.
    pub day_of_season: u32,
    /// Gold; negative at a day boundary means bankruptcy.
    pub treasury: i64,
    /// Contentment; not clamped.
    pub happiness: i64,
    /// Free citizens.
    pub population: i64,
    /// Soldiers.
    pub military: i64,
    /// Citizens currently jailed.
    #[serde(default)]
    pub jailed_population: i64,
    /// Current tax level.
    pub tax_rate: TaxRate,
    /// Days until the tax level may change again.
    pub tax_change_cooldown: u32,
    /// Hired advisors.
    #[serde(default)]
    pub advisors: BTreeSet<Advisor>,
    /// Named markers chaining petitions across days.
    #[serde(default)]
    pub flags: BTreeMap<String, FlagValue>,
    /// Unique petitions that have already been resolved.
    #[serde(default)]
    pub resolved_unique: BTreeSet<String>,
    /// Day each petition was last resolved (drives cooldowns).
    #[serde(default)]
    pub last_resolved: BTreeMap<String, u64>,
    /// Today's ordered petition queue.
    #[serde(default)]
    pub queue: Vec<String>,
    /// Index of the next petition to present.
    #[serde(default)]
    pub cursor: usize,
    /// Consecutive day boundaries spent in unrest.
    #[serde(default)]
    pub unrest_streak: u32,
    /// Whether the reign is ongoing.
    pub game_active: bool,
    /// Whether a petition waits for yes or no.
    pub awaiting_decision: bool,
    /// The petition currently waiting for an answer.
    pub current_event_id: Option<String>,
    /// A destructive command waiting for confirmation.
    #[serde(default)]
    pub pending_confirmation: Option<PendingConfirmation>,
    /// Why the reign ended, once it has.
    #[serde(default)]
    pub end_reason: Option<EndReason>,
}

impl Kingdom {
    /// Found a new kingdom for `player_id` at day 0.
    pub fn new(player_id: PlayerId, start: &StartingStats) -> Self {
        Self {
            player_id,
            day: 0,
            season: start.season,
            day_of_season: 1,
            treasury: start.treasury,
            happiness: start.happiness,
            population: start.population,
            military: start.military,
            jailed_population: 0,
            tax_rate: start.tax_rate,
            tax_change_cooldown: 0,
            advisors: BTreeSet::new(),
            flags: BTreeMap::new(),
            resolved_unique: BTreeSet::new(),
            last_resolved: BTreeMap::new(),
            queue: Vec::new(),
            cursor: 0,
            unrest_streak: 0,
            game_active: true,
            awaiting_decision: false,
            current_event_id: None,
            pending_confirmation: None,
            end_reason: None,
        }
    }

    // -----------------------------------------------------------------------
    // Protocol phase
    // -----------------------------------------------------------------------

    /// The live pending confirmation at `now`, ignoring expired ones.
    pub fn live_confirmation(&self, now: DateTime<Utc>) -> Option<PendingConfirmation> {
        self.pending_confirmation.filter(|pending| pending.is_live(now))
    }

    /// Compute the protocol phase at `now`.
    pub fn phase(&self, now: DateTime<Utc>) -> KingdomPhase {
        if !self.game_active {
            KingdomPhase::Ended
        } else if self.live_confirmation(now).is_some() {
            KingdomPhase::PendingConfirmation
        } else if self.awaiting_decision {
            KingdomPhase::AwaitingDecision
        } else if self.is_day_exhausted() {
            KingdomPhase::DayBoundary
        } else {
            KingdomPhase::InDay
        }
    }

    /// Whether a reign has started on this record and not yet produced a day.
    pub const fn is_fresh(&self) -> bool {
        self.day == 0
    }

    /// Whether today's queue has been fully consumed.
    pub fn is_day_exhausted(&self) -> bool {
        self.cursor >= self.queue.len()
    }

    /// Whether petitions remain after the cursor.
    pub fn has_remaining_petitions(&self) -> bool {
        !self.is_day_exhausted()
    }

    /// Soft-destroy the kingdom, keeping its day count.
    pub fn end_reign(&mut self, reason: EndReason) {
        self.game_active = false;
        self.awaiting_decision = false;
        self.current_event_id = None;
        self.pending_confirmation = None;
        self.end_reason = Some(reason);
    }

    // -----------------------------------------------------------------------
    // Stats
    // -----------------------------------------------------------------------

    /// Read a numeric stat.
    pub const fn stat(&self, stat: Stat) -> i64 {
        match stat {
            Stat::Treasury => self.treasury,
            Stat::Happiness => self.happiness,
            Stat::Population => self.population,
            Stat::Military => self.military,
            Stat::JailedPopulation => self.jailed_population,
        }
    }

    /// Add `delta` to a stat. Headcounts are clamped at zero.
    pub fn adjust(&mut self, stat: Stat, delta: i64) {
        let mut value = self.stat(stat).saturating_add(delta);
        if stat.is_headcount() {
            value = value.max(0);
        }
        match stat {
            Stat::Treasury => self.treasury = value,
            Stat::Happiness => self.happiness = value,
            Stat::Population => self.population = value,
            Stat::Military => self.military = value,
            Stat::JailedPopulation => self.jailed_population = value,
        }
    }

    /// Apply every delta in the map.
    pub fn apply(&mut self, deltas: &StatDeltas) {
        for (stat, delta) in deltas.iter() {
            self.adjust(stat, delta);
        }
    }

    /// Capture every numeric stat.
    pub fn snapshot(&self) -> StatSnapshot {
        StatSnapshot::capture(|stat| self.stat(stat))
    }

    // -----------------------------------------------------------------------
    // Advisors and flags
    // -----------------------------------------------------------------------

    /// Whether `advisor` sits on the council.
    pub fn has_advisor(&self, advisor: Advisor) -> bool {
        self.advisors.contains(&advisor)
    }

    /// Hire `advisor`.
    pub fn hire(&mut self, advisor: Advisor) {
        self.advisors.insert(advisor);
    }

    /// Whether the named flag is set.
    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    /// The payload of the named flag.
    pub fn flag(&self, name: &str) -> Option<&FlagValue> {
        self.flags.get(name)
    }

    /// The day recorded on the named flag, if it carries one.
    pub fn flag_day(&self, name: &str) -> Option<u64> {
        self.flags.get(name).and_then(FlagValue::day)
    }

    /// Whether at least `days` have passed since the day on the named flag.
    pub fn days_since_flag_at_least(&self, name: &str, days: u64) -> bool {
        self.flag_day(name)
            .is_some_and(|since| self.day >= since.saturating_add(days))
    }

    /// Set (or overwrite) the named flag.
    pub fn set_flag(&mut self, name: &str, value: FlagValue) {
        self.flags.insert(name.to_owned(), value);
    }

    /// Remove the named flag, returning its payload.
    pub fn clear_flag(&mut self, name: &str) -> Option<FlagValue> {
        self.flags.remove(name)
    }

    // -----------------------------------------------------------------------
    // Jail
    // -----------------------------------------------------------------------

    /// Move up to `count` citizens into jail until `release_day`.
    ///
    /// Returns the number actually jailed (never more than the population).
    pub fn imprison(&mut self, count: i64, release_day: u64) -> i64 {
        let jailed = count.clamp(0, self.population);
        if jailed == 0 {
            return 0;
        }
        self.adjust(Stat::Population, jailed.saturating_neg());
        self.adjust(Stat::JailedPopulation, jailed);
        let mut cohorts = self.jail_cohorts();
        cohorts.push(JailCohort { count: jailed, release_day });
        self.set_flag(PRISONERS_FLAG, FlagValue::Cohorts(cohorts));
        jailed
    }

    /// The jail cohorts awaiting release.
    pub fn jail_cohorts(&self) -> Vec<JailCohort> {
        match self.flags.get(PRISONERS_FLAG) {
            Some(FlagValue::Cohorts(cohorts)) => cohorts.clone(),
            _ => Vec::new(),
        }
    }

    /// Release every cohort whose release day has arrived.
    ///
    /// Returns the number of citizens returned to the population.
    pub fn release_due_prisoners(&mut self) -> i64 {
        let (due, waiting): (Vec<JailCohort>, Vec<JailCohort>) = self
            .jail_cohorts()
            .into_iter()
            .partition(|cohort| cohort.release_day <= self.day);
        if due.is_empty() {
            return 0;
        }

        let released = due
            .iter()
            .fold(0_i64, |acc, cohort| acc.saturating_add(cohort.count))
            .min(self.jailed_population);
        self.adjust(Stat::JailedPopulation, released.saturating_neg());
        self.adjust(Stat::Population, released);

        if waiting.is_empty() {
            self.clear_flag(PRISONERS_FLAG);
        } else {
            self.set_flag(PRISONERS_FLAG, FlagValue::Cohorts(waiting));
        }
        released
    }
}
