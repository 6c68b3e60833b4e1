//! Petition definitions and the catalog that holds them.
//!
//! A [`Catalog`] is an immutable, ordered collection of
//! [`EventDefinition`]s. It is built once at startup (usually from
//! [`standard_catalog`]) and passed by reference into the engine, so tests
//! can substitute small synthetic catalogs.
//!
//! Optional capabilities of a definition are modelled explicitly:
//! literal-or-computed text is a [`TextSource`], predicates and effects are
//! `Option<fn>`, and the narrative-only shape is a separate [`Branches`]
//! variant rather than a boolean.

pub mod standard;

use std::collections::{BTreeMap, BTreeSet};

use kingdom_types::{Advisor, Decision, Kingdom, Season, Stat, StatDeltas};

use crate::config::GameConfig;
use crate::resolver::ResolutionContext;

pub use standard::standard_catalog;

/// Total weight, in basis points, of a fully partitioned sub-outcome list.
pub const WEIGHT_SCALE: u32 = 10_000;

/// Errors detected while assembling a catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Two definitions share an ID.
    #[error("duplicate event id `{id}`")]
    DuplicateId {
        /// The repeated ID.
        id: String,
    },

    /// A sub-outcome list's weights exceed the full scale.
    #[error("event `{id}` has sub-outcome weights totalling {total} basis points (max 10000)")]
    WeightOverflow {
        /// The offending event.
        id: String,
        /// Sum of declared weights in basis points.
        total: u32,
    },

    /// A stake range has its bounds reversed.
    #[error("event `{id}` has an empty stake range {min}..={max}")]
    EmptyStake {
        /// The offending event.
        id: String,
        /// Lower bound.
        min: i64,
        /// Upper bound.
        max: i64,
    },
}

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

/// A pure eligibility predicate over kingdom state.
pub type Condition = fn(&Kingdom) -> bool;

/// A pure function producing display text from kingdom state.
pub type TextFn = fn(&TextContext<'_>) -> String;

/// A side-effecting outcome callback.
///
/// May read and write stats and flags directly and stash a custom outcome
/// line in the [`ResolutionContext`].
pub type Effect = fn(&mut Kingdom, &mut ResolutionContext);

/// Read-only inputs available to computed text.
#[derive(Debug, Clone, Copy)]
pub struct TextContext<'a> {
    /// The kingdom being petitioned.
    pub kingdom: &'a Kingdom,
    /// The stake rolled for this presentation, if the event declares one.
    pub stake: Option<i64>,
}

/// Literal or state-dependent display text.
#[derive(Debug, Clone, Copy)]
pub enum TextSource {
    /// A fixed string.
    Static(&'static str),
    /// A pure function of kingdom state.
    Computed(TextFn),
    /// The configured display name of an advisor.
    AdvisorName(Advisor),
}

impl TextSource {
    /// Resolve the text against the current state.
    pub fn render(&self, ctx: &TextContext<'_>, config: &GameConfig) -> String {
        match self {
            Self::Static(text) => (*text).to_owned(),
            Self::Computed(text_fn) => text_fn(ctx),
            Self::AdvisorName(advisor) => config.advisor_name(*advisor),
        }
    }
}

impl From<&'static str> for TextSource {
    fn from(text: &'static str) -> Self {
        Self::Static(text)
    }
}

impl From<TextFn> for TextSource {
    fn from(text_fn: TextFn) -> Self {
        Self::Computed(text_fn)
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// One weighted random variant nested inside an outcome.
#[derive(Debug, Clone)]
pub struct SubOutcome {
    /// Selection weight in basis points of [`WEIGHT_SCALE`].
    pub weight: u32,
    /// Text shown when selected.
    pub text: &'static str,
    /// Replaces the petitioner line of a narrative petition when selected.
    pub petitioner: Option<&'static str>,
    /// Deltas applied in addition to the outcome's own.
    pub deltas: StatDeltas,
    /// Callback run after the outcome's own callback.
    pub effect: Option<Effect>,
}

impl SubOutcome {
    /// A sub-outcome with `weight` basis points and the given text.
    pub const fn new(weight: u32, text: &'static str) -> Self {
        Self {
            weight,
            text,
            petitioner: None,
            deltas: StatDeltas::new(),
            effect: None,
        }
    }

    /// Set the stat deltas.
    #[must_use]
    pub fn deltas(mut self, pairs: &[(Stat, i64)]) -> Self {
        self.deltas = StatDeltas::from_pairs(pairs);
        self
    }

    /// Override the petitioner shown with this variant.
    #[must_use]
    pub const fn petitioner(mut self, petitioner: &'static str) -> Self {
        self.petitioner = Some(petitioner);
        self
    }

    /// Attach a callback.
    #[must_use]
    pub const fn effect(mut self, effect: Effect) -> Self {
        self.effect = Some(effect);
        self
    }
}

/// The consequences attached to one answer.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Base text shown after the answer.
    pub text: &'static str,
    /// Flat stat deltas.
    pub deltas: StatDeltas,
    /// Weighted random variants; at most one is selected per resolution.
    pub sub_outcomes: Vec<SubOutcome>,
    /// Side-effecting callback.
    pub effect: Option<Effect>,
    /// Flags removed after the callback runs.
    pub clear_flags: Vec<&'static str>,
    /// Ends the reign immediately, skipping every other consequence.
    pub game_over: bool,
}

impl Outcome {
    /// An outcome that only shows `text`.
    pub const fn new(text: &'static str) -> Self {
        Self {
            text,
            deltas: StatDeltas::new(),
            sub_outcomes: Vec::new(),
            effect: None,
            clear_flags: Vec::new(),
            game_over: false,
        }
    }

    /// Set the flat stat deltas.
    #[must_use]
    pub fn deltas(mut self, pairs: &[(Stat, i64)]) -> Self {
        self.deltas = StatDeltas::from_pairs(pairs);
        self
    }

    /// Set the weighted random variants.
    #[must_use]
    pub fn random(mut self, sub_outcomes: Vec<SubOutcome>) -> Self {
        self.sub_outcomes = sub_outcomes;
        self
    }

    /// Attach a callback.
    #[must_use]
    pub const fn effect(mut self, effect: Effect) -> Self {
        self.effect = Some(effect);
        self
    }

    /// Flags to remove after resolution.
    #[must_use]
    pub fn clears(mut self, flags: &[&'static str]) -> Self {
        self.clear_flags = flags.to_vec();
        self
    }

    /// Make this outcome end the reign.
    #[must_use]
    pub const fn game_over(mut self) -> Self {
        self.game_over = true;
        self
    }

    /// Select a sub-outcome by cumulative-sum roulette against `roll`
    /// (in basis points). A roll beyond every cumulative weight selects
    /// nothing.
    pub fn pick_sub_outcome(&self, roll: u32) -> Option<&SubOutcome> {
        let mut cumulative: u32 = 0;
        for sub in &self.sub_outcomes {
            cumulative = cumulative.saturating_add(sub.weight);
            if roll < cumulative {
                return Some(sub);
            }
        }
        None
    }

    fn total_weight(&self) -> u32 {
        self.sub_outcomes
            .iter()
            .fold(0_u32, |acc, sub| acc.saturating_add(sub.weight))
    }
}

/// The answer shapes a petition supports.
#[derive(Debug, Clone)]
pub enum Branches {
    /// A yes/no decision.
    Choice {
        /// Consequences of `yes`.
        yes: Outcome,
        /// Consequences of `no`.
        no: Outcome,
    },
    /// No decision; the single outcome is applied on presentation.
    Narrative(Outcome),
}

impl Branches {
    /// The outcome for `decision`.
    ///
    /// Narrative petitions answer every decision with their single outcome;
    /// a choice answered with [`Decision::Acknowledge`] takes the `yes` branch.
    pub const fn outcome(&self, decision: Decision) -> &Outcome {
        match (self, decision) {
            (Self::Choice { no, .. }, Decision::No) => no,
            (Self::Choice { yes, .. }, Decision::Yes | Decision::Acknowledge) => yes,
            (Self::Narrative(outcome), _) => outcome,
        }
    }

    fn outcomes(&self) -> Vec<&Outcome> {
        match self {
            Self::Choice { yes, no } => vec![yes, no],
            Self::Narrative(outcome) => vec![outcome],
        }
    }
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// Inclusive bounds for a random stake rolled when a petition is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakeRange {
    /// Smallest stake.
    pub min: i64,
    /// Largest stake.
    pub max: i64,
}

/// A static, immutable petition definition.
#[derive(Debug, Clone)]
pub struct EventDefinition {
    /// Unique identifier.
    pub id: &'static str,
    /// Who brings the petition.
    pub petitioner: TextSource,
    /// What they say.
    pub text: TextSource,
    /// Extra eligibility predicate.
    pub condition: Option<Condition>,
    /// Only eligible in this season.
    pub season: Option<Season>,
    /// Only eligible while this advisor is hired.
    pub requires_advisor: Option<Advisor>,
    /// Only eligible while this advisor is not hired.
    pub requires_absent_advisor: Option<Advisor>,
    /// Resolved at most once per reign.
    pub unique: bool,
    /// Days after a resolution before the petition may return.
    pub cooldown_days: Option<u64>,
    /// Its presence in a day's queue keeps a negative treasury from being fatal.
    pub rescues_bankruptcy: bool,
    /// Random stake rolled on presentation and shared with resolution.
    pub stake: Option<StakeRange>,
    /// The answer shapes and their consequences.
    pub branches: Branches,
}

impl EventDefinition {
    /// A yes/no petition.
    pub fn choice(
        id: &'static str,
        petitioner: impl Into<TextSource>,
        text: impl Into<TextSource>,
        yes: Outcome,
        no: Outcome,
    ) -> Self {
        Self::with_branches(id, petitioner.into(), text.into(), Branches::Choice { yes, no })
    }

    /// A narrative-only petition that resolves as soon as it is presented.
    pub fn narrative(
        id: &'static str,
        petitioner: impl Into<TextSource>,
        text: impl Into<TextSource>,
        outcome: Outcome,
    ) -> Self {
        Self::with_branches(id, petitioner.into(), text.into(), Branches::Narrative(outcome))
    }

    const fn with_branches(
        id: &'static str,
        petitioner: TextSource,
        text: TextSource,
        branches: Branches,
    ) -> Self {
        Self {
            id,
            petitioner,
            text,
            condition: None,
            season: None,
            requires_advisor: None,
            requires_absent_advisor: None,
            unique: false,
            cooldown_days: None,
            rescues_bankruptcy: false,
            stake: None,
            branches,
        }
    }

    /// Gate on a predicate.
    #[must_use]
    pub const fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Gate on a season.
    #[must_use]
    pub const fn in_season(mut self, season: Season) -> Self {
        self.season = Some(season);
        self
    }

    /// Require a hired advisor.
    #[must_use]
    pub const fn with_advisor(mut self, advisor: Advisor) -> Self {
        self.requires_advisor = Some(advisor);
        self
    }

    /// Require an advisor to be absent.
    #[must_use]
    pub const fn without_advisor(mut self, advisor: Advisor) -> Self {
        self.requires_absent_advisor = Some(advisor);
        self
    }

    /// Allow at most one resolution per reign.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Keep the petition away for `days` after each resolution.
    #[must_use]
    pub const fn cooldown(mut self, days: u64) -> Self {
        self.cooldown_days = Some(days);
        self
    }

    /// Mark the petition as able to save a bankrupt kingdom.
    #[must_use]
    pub const fn rescues_bankruptcy(mut self) -> Self {
        self.rescues_bankruptcy = true;
        self
    }

    /// Roll a stake in `min..=max` when presented.
    #[must_use]
    pub const fn stake(mut self, min: i64, max: i64) -> Self {
        self.stake = Some(StakeRange { min, max });
        self
    }

    /// Whether the petition resolves without a player decision.
    pub const fn is_narrative(&self) -> bool {
        matches!(self.branches, Branches::Narrative(_))
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// An ordered, validated collection of petition definitions.
#[derive(Debug, Clone)]
pub struct Catalog {
    events: Vec<EventDefinition>,
    index: BTreeMap<&'static str, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate IDs and malformed outcomes.
    ///
    /// # Errors
    ///
    /// Returns the first [`CatalogError`] found, in definition order.
    pub fn new(events: Vec<EventDefinition>) -> Result<Self, CatalogError> {
        let mut index = BTreeMap::new();
        let mut seen = BTreeSet::new();
        for (position, event) in events.iter().enumerate() {
            if !seen.insert(event.id) {
                return Err(CatalogError::DuplicateId {
                    id: event.id.to_owned(),
                });
            }
            index.insert(event.id, position);

            if let Some(stake) = event.stake {
                if stake.min > stake.max {
                    return Err(CatalogError::EmptyStake {
                        id: event.id.to_owned(),
                        min: stake.min,
                        max: stake.max,
                    });
                }
            }
            for outcome in event.branches.outcomes() {
                let total = outcome.total_weight();
                if total > WEIGHT_SCALE {
                    return Err(CatalogError::WeightOverflow {
                        id: event.id.to_owned(),
                        total,
                    });
                }
            }
        }
        Ok(Self { events, index })
    }

    /// Look up a definition by ID.
    pub fn get(&self, id: &str) -> Option<&EventDefinition> {
        self.index.get(id).and_then(|&position| self.events.get(position))
    }

    /// Every definition, in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &EventDefinition> {
        self.events.iter()
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
