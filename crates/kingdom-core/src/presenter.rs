//! Rendering the next petition and opening the decision point.
//!
//! Presentation is idempotent while a decision is pending: the same prompt
//! is rebuilt from the same state, including the same stake. Narrative
//! petitions never wait for input; they resolve on the spot with
//! [`Decision::Acknowledge`].

use kingdom_types::{Decision, Kingdom};
use rand::Rng;
use tracing::debug;

use crate::catalog::{EventDefinition, TextContext};
use crate::context::GameContext;
use crate::eligibility::is_eligible;
use crate::resolver::{self, STALE_EVENT_LINE};

/// The closing line of every yes/no prompt.
pub const DECISION_PROMPT: &str = "What do you say? (!yes / !no)";

/// Petitioner and body text of `event` as they appear right now.
fn render(ctx: &GameContext, kingdom: &Kingdom, event: &EventDefinition) -> (String, String) {
    let text_ctx = TextContext {
        kingdom,
        stake: resolver::roll_stake(kingdom, event),
    };
    (
        event.petitioner.render(&text_ctx, &ctx.config),
        event.text.render(&text_ctx, &ctx.config),
    )
}

fn header(kingdom: &Kingdom) -> String {
    format!("--- {}'s Kingdom, Day {} ---", kingdom.player_id, kingdom.day)
}

fn petition_lines(kingdom: &Kingdom, petitioner: &str, text: &str) -> Vec<String> {
    let mut lines = vec![header(kingdom), format!("{petitioner} wants to talk.")];
    if !text.is_empty() {
        lines.push(format!("\"{text}\""));
    }
    lines
}

/// Re-emit the prompt for the petition already awaiting a decision.
///
/// Does not touch the record unless the pending ID has gone stale, in which
/// case the slot is skipped exactly as resolution would skip it.
pub fn re_present(ctx: &GameContext, kingdom: &mut Kingdom) -> Vec<String> {
    let event = kingdom
        .current_event_id
        .as_deref()
        .and_then(|id| ctx.catalog.get(id));
    let Some(event) = event else {
        kingdom.awaiting_decision = false;
        kingdom.current_event_id = None;
        kingdom.cursor = kingdom.cursor.saturating_add(1).min(kingdom.queue.len());
        return vec![STALE_EVENT_LINE.to_owned()];
    };
    let (petitioner, text) = render(ctx, kingdom, event);
    let mut lines = petition_lines(kingdom, &petitioner, &text);
    lines.push(DECISION_PROMPT.to_owned());
    lines
}

/// Present the petition at the cursor, skipping slots that went stale.
///
/// Returns `None` when the rest of today's queue was stale (or empty).
pub fn present_next(
    ctx: &GameContext,
    kingdom: &mut Kingdom,
    rng: &mut impl Rng,
) -> Option<Vec<String>> {
    while let Some(id) = kingdom.queue.get(kingdom.cursor) {
        match ctx.catalog.get(id) {
            Some(event) if is_eligible(event, kingdom) => {
                return Some(present(ctx, kingdom, event, rng));
            }
            _ => {
                debug!(
                    player = %kingdom.player_id,
                    event_id = %id,
                    cursor = kingdom.cursor,
                    "skipping stale queue slot"
                );
                kingdom.cursor = kingdom.cursor.saturating_add(1);
            }
        }
    }
    None
}

/// Present `event`: open a decision, or resolve a narrative petition at once.
pub fn present(
    ctx: &GameContext,
    kingdom: &mut Kingdom,
    event: &EventDefinition,
    rng: &mut impl Rng,
) -> Vec<String> {
    let (petitioner, text) = render(ctx, kingdom, event);

    if event.is_narrative() {
        let resolution = resolver::apply_outcome(kingdom, event, Decision::Acknowledge, rng);
        let shown_by = resolution.petitioner.map_or(petitioner, str::to_owned);
        let mut lines = petition_lines(kingdom, &shown_by, &text);
        lines.extend(resolution.lines);
        return lines;
    }

    kingdom.awaiting_decision = true;
    kingdom.current_event_id = Some(event.id.to_owned());
    debug!(player = %kingdom.player_id, event_id = event.id, "petition presented");

    let mut lines = petition_lines(kingdom, &petitioner, &text);
    lines.push(DECISION_PROMPT.to_owned());
    lines
}
