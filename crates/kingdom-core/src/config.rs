//! Configuration loading and typed config structures for the Kingdom Petitions game.
//!
//! The canonical configuration lives in `kingdom-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.
//! Every field has a default, so an empty file yields the standard game.

use std::collections::BTreeMap;
use std::path::Path;

use kingdom_types::{Advisor, Season, StartingStats, StatDeltas, TaxRate};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an unplayable game.
    #[error("invalid config: {message}")]
    Invalid {
        /// What is wrong with the configuration.
        message: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level game configuration.
///
/// Mirrors the structure of `kingdom-config.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameConfig {
    /// Starting stats for new kingdoms.
    #[serde(default)]
    pub kingdom: StartingStats,

    /// Season cycle and per-season daily effects.
    #[serde(default)]
    pub time: TimeConfig,

    /// Tax levels and tax-change rate limiting.
    #[serde(default)]
    pub taxes: TaxConfig,

    /// Advisor salaries and passive effects.
    #[serde(default = "default_advisors")]
    pub advisors: BTreeMap<Advisor, AdvisorConfig>,

    /// Unrest warning and revolt thresholds.
    #[serde(default)]
    pub unrest: UnrestConfig,

    /// Recurring flag-gated modifiers applied during upkeep.
    #[serde(default = "default_penalties")]
    pub penalties: Vec<PenaltyConfig>,

    /// Daily queue sizing.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Destructive-command confirmation window.
    #[serde(default)]
    pub confirmation: ConfirmationConfig,

    /// Command API server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            kingdom: StartingStats::default(),
            time: TimeConfig::default(),
            taxes: TaxConfig::default(),
            advisors: default_advisors(),
            unrest: UnrestConfig::default(),
            penalties: default_penalties(),
            schedule: ScheduleConfig::default(),
            confirmation: ConfirmationConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment overrides are not applied here; the binary calls
    /// [`ServerConfig::apply_env_overrides`] once, whether or not a file
    /// was found.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// Does not consult the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time.seasons.is_empty() {
            return Err(invalid("time.seasons must list at least one season"));
        }
        if self.time.season_length == 0 {
            return Err(invalid("time.season_length must be at least 1"));
        }
        if !self.time.seasons.contains(&self.kingdom.season) {
            return Err(invalid("kingdom.season must appear in time.seasons"));
        }
        if let Some(season) = self
            .time
            .effects
            .keys()
            .find(|season| !self.time.seasons.contains(season))
        {
            return Err(invalid(&format!(
                "time.effects names {season}, which is not in time.seasons"
            )));
        }
        if let Some(rate) = TaxRate::ALL
            .iter()
            .find(|rate| !self.taxes.levels.contains_key(rate))
        {
            return Err(invalid(&format!("taxes.levels is missing `{}`", rate.key())));
        }
        if self
            .taxes
            .levels
            .values()
            .any(|level| level.income_per_10_pop < Decimal::ZERO)
        {
            return Err(invalid("taxes income_per_10_pop must not be negative"));
        }
        if self.schedule.min_events_per_day > self.schedule.max_events_per_day {
            return Err(invalid(
                "schedule.min_events_per_day exceeds schedule.max_events_per_day",
            ));
        }
        if self.schedule.max_repeats_per_day == 0 {
            return Err(invalid("schedule.max_repeats_per_day must be at least 1"));
        }
        Ok(())
    }

    /// The tax level settings for `rate`.
    ///
    /// Validation guarantees every level is present; a missing one falls
    /// back to the built-in defaults.
    pub fn tax_level(&self, rate: TaxRate) -> TaxLevelConfig {
        self.taxes
            .levels
            .get(&rate)
            .cloned()
            .unwrap_or_else(|| default_tax_level(rate))
    }

    /// Display name of `advisor`, falling back to the built-in name.
    pub fn advisor_name(&self, advisor: Advisor) -> String {
        self.advisors.get(&advisor).map_or_else(
            || default_advisor(advisor).name,
            |entry| entry.name.clone(),
        )
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid {
        message: message.to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Season cycle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimeConfig {
    /// Days per season.
    #[serde(default = "default_season_length")]
    pub season_length: u32,

    /// Seasons in cycle order.
    #[serde(default = "default_seasons")]
    pub seasons: Vec<Season>,

    /// Flat stat deltas applied every day of each season.
    #[serde(default = "default_season_effects")]
    pub effects: BTreeMap<Season, StatDeltas>,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            season_length: default_season_length(),
            seasons: default_seasons(),
            effects: default_season_effects(),
        }
    }
}

impl TimeConfig {
    /// The season that follows `current` in the cycle.
    ///
    /// A season missing from the cycle restarts it.
    pub fn next_season(&self, current: Season) -> Season {
        let position = self.seasons.iter().position(|&s| s == current);
        let next = position.and_then(|i| i.checked_add(1)).unwrap_or(0);
        self.seasons
            .get(next)
            .or_else(|| self.seasons.first())
            .copied()
            .unwrap_or(current)
    }

    /// Daily deltas for `season` (empty when none are configured).
    pub fn season_effects(&self, season: Season) -> StatDeltas {
        self.effects.get(&season).cloned().unwrap_or_default()
    }
}

const fn default_season_length() -> u32 {
    20
}

fn default_seasons() -> Vec<Season> {
    vec![Season::Spring, Season::Summer, Season::Autumn, Season::Winter]
}

fn default_season_effects() -> BTreeMap<Season, StatDeltas> {
    use kingdom_types::Stat;
    BTreeMap::from([
        (Season::Spring, StatDeltas::from_pairs(&[(Stat::Population, 1)])),
        (Season::Summer, StatDeltas::from_pairs(&[(Stat::Happiness, 1)])),
        (Season::Autumn, StatDeltas::from_pairs(&[(Stat::Treasury, 2)])),
        (Season::Winter, StatDeltas::from_pairs(&[(Stat::Happiness, -1)])),
    ])
}

// ---------------------------------------------------------------------------
// Taxes
// ---------------------------------------------------------------------------

/// Tax configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaxConfig {
    /// Settings for each tax level.
    #[serde(default = "default_tax_levels")]
    pub levels: BTreeMap<TaxRate, TaxLevelConfig>,

    /// Days a player must wait between tax changes.
    #[serde(default = "default_change_cooldown_days")]
    pub change_cooldown_days: u32,

    /// Scale income by `max(1, happiness / 50 + 1)`.
    #[serde(default)]
    pub happiness_multiplier: bool,

    /// Percentage bonus to tax income while the treasurer is hired.
    #[serde(default = "default_treasurer_bonus_pct")]
    pub treasurer_bonus_pct: u32,
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self {
            levels: default_tax_levels(),
            change_cooldown_days: default_change_cooldown_days(),
            happiness_multiplier: false,
            treasurer_bonus_pct: default_treasurer_bonus_pct(),
        }
    }
}

/// Settings for a single tax level.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaxLevelConfig {
    /// Gold collected per ten citizens per day.
    pub income_per_10_pop: Decimal,

    /// Flat happiness change per day at this level.
    #[serde(default)]
    pub happiness_effect: i64,

    /// Display label.
    pub label: String,
}

fn default_tax_levels() -> BTreeMap<TaxRate, TaxLevelConfig> {
    TaxRate::ALL
        .iter()
        .map(|&rate| (rate, default_tax_level(rate)))
        .collect()
}

fn default_tax_level(rate: TaxRate) -> TaxLevelConfig {
    let (income, happiness, label) = match rate {
        TaxRate::Low => (Decimal::new(5, 1), 1, "Low"),
        TaxRate::Normal => (Decimal::ONE, 0, "Normal"),
        TaxRate::High => (Decimal::new(15, 1), -2, "High"),
    };
    TaxLevelConfig {
        income_per_10_pop: income,
        happiness_effect: happiness,
        label: label.to_owned(),
    }
}

const fn default_change_cooldown_days() -> u32 {
    3
}

const fn default_treasurer_bonus_pct() -> u32 {
    10
}

// ---------------------------------------------------------------------------
// Advisors
// ---------------------------------------------------------------------------

/// Salary and passive effects of one advisor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdvisorConfig {
    /// Display name.
    pub name: String,

    /// Gold paid every day.
    #[serde(default)]
    pub salary: i64,

    /// Stat deltas applied every day.
    #[serde(default)]
    pub effects: StatDeltas,
}

fn default_advisors() -> BTreeMap<Advisor, AdvisorConfig> {
    Advisor::ALL
        .iter()
        .map(|&advisor| (advisor, default_advisor(advisor)))
        .collect()
}

fn default_advisor(advisor: Advisor) -> AdvisorConfig {
    use kingdom_types::Stat;
    let (name, salary, effects) = match advisor {
        Advisor::General => ("General Kael", 5, StatDeltas::from_pairs(&[(Stat::Military, 1)])),
        Advisor::Treasurer => ("Lady Elara", 8, StatDeltas::new()),
        Advisor::Spymaster => (
            "The Whisper",
            10,
            StatDeltas::from_pairs(&[(Stat::Happiness, -1)]),
        ),
    };
    AdvisorConfig {
        name: name.to_owned(),
        salary,
        effects,
    }
}

// ---------------------------------------------------------------------------
// Unrest and penalties
// ---------------------------------------------------------------------------

/// Unrest thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnrestConfig {
    /// Happiness at or below which unrest sets in (unless taxes are low).
    #[serde(default = "default_revolt_threshold")]
    pub revolt_threshold: i64,

    /// Happiness penalty per consecutive day of unrest.
    #[serde(default = "default_unrest_base")]
    pub base: i64,

    /// Maximum happiness penalty for a single day.
    #[serde(default = "default_unrest_cap")]
    pub cap: i64,
}

impl Default for UnrestConfig {
    fn default() -> Self {
        Self {
            revolt_threshold: default_revolt_threshold(),
            base: default_unrest_base(),
            cap: default_unrest_cap(),
        }
    }
}

impl UnrestConfig {
    /// Penalty for the given consecutive-unrest streak: `min(base * streak, cap)`.
    pub fn penalty(&self, streak: u32) -> i64 {
        self.base
            .saturating_mul(i64::from(streak))
            .min(self.cap)
    }
}

const fn default_revolt_threshold() -> i64 {
    20
}

const fn default_unrest_base() -> i64 {
    2
}

const fn default_unrest_cap() -> i64 {
    10
}

/// A recurring upkeep modifier (usually a penalty) that applies while a flag is set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PenaltyConfig {
    /// Flag that activates the penalty.
    pub flag: String,

    /// When set, the flag must carry exactly this label. When absent, the
    /// flag must carry no label.
    #[serde(default)]
    pub label: Option<String>,

    /// Deltas applied each day while active.
    #[serde(default)]
    pub effects: StatDeltas,
}

fn default_penalties() -> Vec<PenaltyConfig> {
    use kingdom_types::Stat;
    vec![
        PenaltyConfig {
            flag: "active_crime_gang".to_owned(),
            label: None,
            effects: StatDeltas::from_pairs(&[(Stat::Treasury, -5)]),
        },
        PenaltyConfig {
            flag: "active_crime_gang".to_owned(),
            label: Some("entrenched".to_owned()),
            effects: StatDeltas::from_pairs(&[(Stat::Treasury, -10)]),
        },
        PenaltyConfig {
            flag: "guild_investment".to_owned(),
            label: None,
            effects: StatDeltas::from_pairs(&[(Stat::Treasury, 3)]),
        },
    ]
}

// ---------------------------------------------------------------------------
// Schedule and confirmation
// ---------------------------------------------------------------------------

/// Daily queue sizing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleConfig {
    /// Fewest petitions drawn for a day (if enough are eligible).
    #[serde(default = "default_min_events")]
    pub min_events_per_day: u32,

    /// Most petitions drawn for a day.
    #[serde(default = "default_max_events")]
    pub max_events_per_day: u32,

    /// How many times one petition may appear in a single day's queue.
    #[serde(default = "default_max_repeats")]
    pub max_repeats_per_day: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            min_events_per_day: default_min_events(),
            max_events_per_day: default_max_events(),
            max_repeats_per_day: default_max_repeats(),
        }
    }
}

const fn default_min_events() -> u32 {
    3
}

const fn default_max_events() -> u32 {
    10
}

const fn default_max_repeats() -> u32 {
    2
}

/// Destructive-command confirmation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfirmationConfig {
    /// Seconds a pending confirmation stays valid.
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u32,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
        }
    }
}

const fn default_ttl_seconds() -> u32 {
    30
}

// ---------------------------------------------------------------------------
// Server and logging
// ---------------------------------------------------------------------------

/// Which store backs kingdom records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// In-process map; records vanish on restart.
    #[default]
    Memory,
    /// Dragonfly (Redis-compatible) server.
    Dragonfly,
}

/// Command API server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Store backend.
    #[serde(default)]
    pub store: StoreKind,

    /// Dragonfly connection URL.
    #[serde(default = "default_dragonfly_url")]
    pub dragonfly_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            store: StoreKind::default(),
            dragonfly_url: default_dragonfly_url(),
        }
    }
}

impl ServerConfig {
    /// Apply environment variable overrides to server settings.
    ///
    /// - `KINGDOM_PORT` overrides `port`; an unparsable value is ignored
    /// - `DRAGONFLY_URL` overrides `dragonfly_url`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("KINGDOM_PORT") {
            if let Ok(port) = val.parse() {
                self.port = port;
            }
        }
        if let Ok(val) = std::env::var("DRAGONFLY_URL") {
            self.dragonfly_url = val;
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    3000
}

fn default_dragonfly_url() -> String {
    "redis://localhost:6379".to_owned()
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kingdom_types::Stat;

    use super::*;

    #[test]
    fn empty_yaml_yields_standard_game() {
        let config = GameConfig::parse("").unwrap();
        assert_eq!(config.kingdom.treasury, 100);
        assert_eq!(config.time.season_length, 20);
        assert_eq!(config.time.seasons.len(), 4);
        assert_eq!(config.taxes.change_cooldown_days, 3);
        assert_eq!(config.advisor_name(Advisor::General), "General Kael");
        assert_eq!(config.penalties.len(), 3);
        assert_eq!(config.schedule.max_repeats_per_day, 2);
    }

    #[test]
    fn parse_partial_yaml() {
        let yaml = r#"
kingdom:
  treasury: 250
time:
  season_length: 5
  seasons: [Winter, Spring]
  effects:
    Winter:
      happiness: -3
taxes:
  happiness_multiplier: true
  levels:
    low: { income_per_10_pop: 0.25, happiness_effect: 2, label: "Gentle" }
    normal: { income_per_10_pop: 1, label: "Normal" }
    high: { income_per_10_pop: "2.5", happiness_effect: -4, label: "Crushing" }
advisors:
  general: { name: "General Vex", salary: 7, effects: { military: 2 } }
schedule:
  min_events_per_day: 1
  max_events_per_day: 2
"#;
        let yaml_config = GameConfig::parse(yaml).unwrap();
        assert_eq!(yaml_config.kingdom.treasury, 250);
        assert_eq!(yaml_config.kingdom.happiness, 50);
        assert_eq!(yaml_config.time.season_length, 5);
        assert_eq!(
            yaml_config.time.season_effects(Season::Winter).get(Stat::Happiness),
            -3
        );
        assert!(yaml_config.time.season_effects(Season::Spring).is_empty());
        assert!(yaml_config.taxes.happiness_multiplier);
        assert_eq!(
            yaml_config.tax_level(TaxRate::High).income_per_10_pop,
            Decimal::new(25, 1)
        );
        assert_eq!(yaml_config.advisor_name(Advisor::General), "General Vex");
        assert_eq!(yaml_config.advisors.len(), 1);
        assert_eq!(yaml_config.schedule.max_events_per_day, 2);
    }

    #[test]
    fn rejects_inverted_schedule() {
        let yaml = "schedule:\n  min_events_per_day: 8\n  max_events_per_day: 4\n";
        let err = GameConfig::parse(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn rejects_missing_tax_level() {
        let yaml = r#"
taxes:
  levels:
    low: { income_per_10_pop: 0.5, label: "Low" }
"#;
        let err = GameConfig::parse(yaml).unwrap_err();
        assert!(err.to_string().contains("normal"));
    }

    #[test]
    fn rejects_starting_season_outside_cycle() {
        let yaml = "time:\n  seasons: [Summer, Winter]\n";
        assert!(GameConfig::parse(yaml).is_err());
    }

    #[test]
    fn seasons_cycle_in_order() {
        let time = TimeConfig::default();
        assert_eq!(time.next_season(Season::Spring), Season::Summer);
        assert_eq!(time.next_season(Season::Winter), Season::Spring);
    }

    #[test]
    fn unrest_penalty_escalates_to_cap() {
        let unrest = UnrestConfig::default();
        assert_eq!(unrest.penalty(1), 2);
        assert_eq!(unrest.penalty(3), 6);
        assert_eq!(unrest.penalty(9), 10);
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../kingdom-config.yaml");
        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(GameConfig::parse(&contents).unwrap(), GameConfig::default());
    }

    #[test]
    fn from_file_reads_only_the_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../kingdom-config.yaml");
        let contents = std::fs::read_to_string(&path).unwrap();
        let loaded = GameConfig::from_file(&path).unwrap();
        assert_eq!(loaded, GameConfig::parse(&contents).unwrap());
        assert_eq!(loaded.server, ServerConfig::default());
    }
}
