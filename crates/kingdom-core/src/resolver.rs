//! Outcome resolution: applying an answer to the petition in flight.
//!
//! Resolution order is fixed:
//!
//! 1. A game-over branch ends the reign and nothing else happens.
//! 2. One roulette draw picks at most one sub-outcome.
//! 3. Branch deltas, then sub-outcome deltas, are applied.
//! 4. The branch callback, then the sub-outcome callback, run.
//! 5. The clear-list is applied.
//! 6. Uniqueness and last-resolution day are recorded, the decision is
//!    cleared, and the cursor advances.
//!
//! Transient values (the stake, custom outcome text) live in a
//! [`ResolutionContext`] that exists only for the duration of one call.

use kingdom_types::{Decision, EndReason, Kingdom};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::catalog::{EventDefinition, WEIGHT_SCALE};
use crate::context::GameContext;
use crate::report;

/// Line shown when the petition in flight no longer exists in the catalog.
pub const STALE_EVENT_LINE: &str =
    "An error occurred with your current event. Type !chat to continue.";

/// Scratch state threaded through one resolution and then discarded.
#[derive(Debug)]
pub struct ResolutionContext {
    stake: Option<i64>,
    outcome_text: Option<String>,
    rng: SmallRng,
}

impl ResolutionContext {
    /// Create a context carrying the presentation's stake.
    pub const fn new(stake: Option<i64>, rng: SmallRng) -> Self {
        Self {
            stake,
            outcome_text: None,
            rng,
        }
    }

    /// The stake rolled when the petition was presented.
    pub const fn stake(&self) -> Option<i64> {
        self.stake
    }

    /// Stash a line to show once after the outcome text.
    pub fn set_outcome_text(&mut self, text: impl Into<String>) {
        self.outcome_text = Some(text.into());
    }

    /// Take the stashed line, leaving nothing behind.
    pub fn take_outcome_text(&mut self) -> Option<String> {
        self.outcome_text.take()
    }

    /// A uniform draw in `low..=high`. Reversed bounds yield `low`.
    pub fn roll(&mut self, low: i64, high: i64) -> i64 {
        if low >= high {
            return low;
        }
        self.rng.random_range(low..=high)
    }
}

/// What one resolution produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Narrative lines, in display order.
    pub lines: Vec<String>,
    /// Petitioner override from the selected sub-outcome.
    pub petitioner: Option<&'static str>,
    /// Whether the reign ended.
    pub ended: bool,
}

/// Derive the stake for presenting `event` at the kingdom's current slot.
///
/// The roll is seeded from (player, day, event, cursor), so presentation and
/// resolution agree without persisting the value.
pub fn roll_stake(kingdom: &Kingdom, event: &EventDefinition) -> Option<i64> {
    let range = event.stake?;
    if range.min >= range.max {
        return Some(range.min);
    }
    let mut rng = SmallRng::seed_from_u64(stake_seed(kingdom, event.id));
    Some(rng.random_range(range.min..=range.max))
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a over the slot identity. Text fields are terminated with
/// `0xff`, which never appears in UTF-8.
fn stake_seed(kingdom: &Kingdom, event_id: &str) -> u64 {
    let day = kingdom.day.to_le_bytes();
    let cursor = u64::try_from(kingdom.cursor)
        .unwrap_or(u64::MAX)
        .to_le_bytes();
    let parts: [&[u8]; 6] = [
        kingdom.player_id.as_str().as_bytes(),
        &[0xff],
        &day,
        event_id.as_bytes(),
        &[0xff],
        &cursor,
    ];
    parts
        .iter()
        .flat_map(|part| part.iter())
        .fold(FNV_OFFSET_BASIS, |hash, &byte| {
            (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
        })
}

/// Resolve the petition the kingdom is waiting on.
///
/// The caller has already checked that a decision is pending. If the
/// in-flight ID no longer resolves, the broken slot is skipped and the
/// player is told to advance again.
pub fn resolve_pending(
    ctx: &GameContext,
    kingdom: &mut Kingdom,
    decision: Decision,
    rng: &mut impl Rng,
) -> Vec<String> {
    let event = kingdom
        .current_event_id
        .as_deref()
        .and_then(|id| ctx.catalog.get(id));

    let Some(event) = event else {
        warn!(
            player = %kingdom.player_id,
            event_id = ?kingdom.current_event_id,
            "pending petition missing from catalog, skipping slot"
        );
        kingdom.awaiting_decision = false;
        kingdom.current_event_id = None;
        advance_cursor(kingdom);
        return vec![STALE_EVENT_LINE.to_owned()];
    };

    apply_outcome(kingdom, event, decision, rng).lines
}

/// Apply the branch of `event` chosen by `decision`.
///
/// Used directly for narrative petitions (with [`Decision::Acknowledge`])
/// and through [`resolve_pending`] for answered ones.
pub fn apply_outcome(
    kingdom: &mut Kingdom,
    event: &EventDefinition,
    decision: Decision,
    rng: &mut impl Rng,
) -> Resolution {
    let outcome = event.branches.outcome(decision);
    let mut lines = Vec::new();
    if !outcome.text.is_empty() {
        lines.push(format!("{}, {}", kingdom.player_id, outcome.text));
    }

    if outcome.game_over {
        info!(player = %kingdom.player_id, event_id = event.id, "petition ended the reign");
        kingdom.end_reign(EndReason::Collapse);
        lines.extend(report::reign_ended(kingdom));
        return Resolution {
            lines,
            petitioner: None,
            ended: true,
        };
    }

    let stake = roll_stake(kingdom, event);
    let before = kingdom.snapshot();

    let sub = if outcome.sub_outcomes.is_empty() {
        None
    } else {
        outcome.pick_sub_outcome(rng.random_range(0..WEIGHT_SCALE))
    };

    kingdom.apply(&outcome.deltas);
    if let Some(sub) = sub {
        kingdom.apply(&sub.deltas);
    }

    let mut scratch = ResolutionContext::new(stake, SmallRng::from_rng(rng));
    if let Some(effect) = outcome.effect {
        effect(kingdom, &mut scratch);
    }
    if let Some(effect) = sub.and_then(|s| s.effect) {
        effect(kingdom, &mut scratch);
    }

    for flag in &outcome.clear_flags {
        kingdom.clear_flag(flag);
    }

    if event.unique {
        kingdom.resolved_unique.insert(event.id.to_owned());
    }
    kingdom.last_resolved.insert(event.id.to_owned(), kingdom.day);
    kingdom.awaiting_decision = false;
    kingdom.current_event_id = None;
    advance_cursor(kingdom);

    if let Some(sub) = sub {
        lines.push(sub.text.to_owned());
    }
    if let Some(custom) = scratch.take_outcome_text() {
        lines.push(custom);
    }
    let changes = before.changes_to(&kingdom.snapshot());
    if !changes.is_empty() {
        lines.push(report::format_changes(&changes));
    }
    lines.push(report::remaining_prompt(kingdom));

    debug!(
        player = %kingdom.player_id,
        event_id = event.id,
        ?decision,
        day = kingdom.day,
        cursor = kingdom.cursor,
        "petition resolved"
    );

    Resolution {
        lines,
        petitioner: sub.and_then(|s| s.petitioner),
        ended: false,
    }
}

fn advance_cursor(kingdom: &mut Kingdom) {
    kingdom.cursor = kingdom.cursor.saturating_add(1).min(kingdom.queue.len());
}
