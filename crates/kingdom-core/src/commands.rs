//! The inbound command surface.
//!
//! [`Command::parse`] turns a chat command and its arguments into a typed
//! command; [`execute`] runs it against the player's loaded record (if any)
//! and returns the reply lines plus the record to persist. A player mistake
//! produces one explanatory line and `save: None`, so the stored record is
//! left exactly as it was.
//!
//! Protocol guards, in priority order:
//! - `status` and `help` are always served.
//! - A live confirmation is answered by `!yes`/`!no` (or `!confirm`) before
//!   anything else; `!chat` and `!settax` are refused until it is answered
//!   or expires.
//! - Ended kingdoms accept only `!kcreate`.

use chrono::{DateTime, Duration, Utc};
use kingdom_types::{
    ConfirmAction, Decision, EndReason, Kingdom, KingdomPhase, PendingConfirmation, PlayerId,
    TaxRate,
};
use rand::Rng;
use tracing::{debug, info};

use crate::context::GameContext;
use crate::report;
use crate::resolver;
use crate::scheduler;

/// A parsed player command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `!kcreate`: found a kingdom, or ask to reset an active one.
    Create,
    /// `!kdestroy`: ask to abdicate.
    Destroy,
    /// `!chat`: hear the next petitioner.
    Advance,
    /// `!yes` / `!no`: answer a petition or a pending confirmation.
    Answer(bool),
    /// `!confirm yes|no`: answer a pending confirmation explicitly.
    Confirm(Option<bool>),
    /// `!settax <level>`: change the tax level (raw argument kept for the reply).
    SetTax(Option<String>),
    /// `!status`.
    Status,
    /// `!help`.
    Help,
}

impl Command {
    /// Parse a chat command. Unknown commands yield `None`.
    pub fn parse(command: &str, args: &[String]) -> Option<Self> {
        let first_arg = args.first().map(|arg| arg.trim().to_lowercase());
        let parsed = match command.trim().to_lowercase().as_str() {
            "!kcreate" => Self::Create,
            "!kdestroy" => Self::Destroy,
            "!chat" => Self::Advance,
            "!yes" => Self::Answer(true),
            "!no" => Self::Answer(false),
            "!confirm" => Self::Confirm(match first_arg.as_deref() {
                Some("yes" | "y") => Some(true),
                Some("no" | "n") => Some(false),
                _ => None,
            }),
            "!settax" => Self::SetTax(first_arg),
            "!status" => Self::Status,
            "!help" => Self::Help,
            _ => return None,
        };
        Some(parsed)
    }

    /// Whether the command only reads state.
    pub const fn is_read_only(&self) -> bool {
        matches!(self, Self::Status | Self::Help)
    }
}

/// Reply lines plus the record to persist, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Lines to show the player, in order.
    pub replies: Vec<String>,
    /// The updated record; `None` means nothing changed.
    pub save: Option<Kingdom>,
}

impl CommandOutcome {
    fn reply(line: String) -> Self {
        Self {
            replies: vec![line],
            save: None,
        }
    }

    const fn lines(replies: Vec<String>) -> Self {
        Self {
            replies,
            save: None,
        }
    }

    const fn saved(replies: Vec<String>, kingdom: Kingdom) -> Self {
        Self {
            replies,
            save: Some(kingdom),
        }
    }
}

/// Run `command` for `player` against their stored record.
pub fn execute(
    ctx: &GameContext,
    record: Option<Kingdom>,
    player: &PlayerId,
    command: &Command,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> CommandOutcome {
    debug!(player = %player, ?command, "executing command");

    let mut record = record;
    if let Some(kingdom) = record.as_mut() {
        if kingdom.pending_confirmation.is_some() && kingdom.live_confirmation(now).is_none() {
            kingdom.pending_confirmation = None;
        }
    }

    match command {
        Command::Help => CommandOutcome::lines(report::help()),
        Command::Status => status(ctx, record.as_ref(), player),
        Command::Create => create(ctx, record, player, now),
        Command::Destroy => destroy(ctx, record, player, now),
        Command::Confirm(answer) => confirm(ctx, record, player, *answer, now),
        Command::Answer(answer) => {
            let pending = record
                .as_ref()
                .is_some_and(|k| k.phase(now) == KingdomPhase::PendingConfirmation);
            if pending {
                confirm(ctx, record, player, Some(*answer), now)
            } else {
                let decision = if *answer { Decision::Yes } else { Decision::No };
                decide(ctx, record, player, decision, now, rng)
            }
        }
        Command::Advance => advance(ctx, record, player, now, rng),
        Command::SetTax(level) => set_tax(ctx, record, player, level.as_deref(), now),
    }
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

/// Take the active kingdom for a gameplay command, or the rejection line.
fn active_for_play(
    record: Option<Kingdom>,
    player: &PlayerId,
    now: DateTime<Utc>,
) -> Result<(Kingdom, KingdomPhase), CommandOutcome> {
    let Some(kingdom) = record else {
        return Err(CommandOutcome::reply(report::no_kingdom(player.as_str())));
    };
    match kingdom.phase(now) {
        KingdomPhase::Ended => Err(CommandOutcome::reply(report::no_kingdom(player.as_str()))),
        KingdomPhase::PendingConfirmation => Err(CommandOutcome::reply(format!(
            "{player}, answer the pending confirmation first (!yes / !no)."
        ))),
        phase => Ok((kingdom, phase)),
    }
}

fn confirmation_prompt(ctx: &GameContext, player: &PlayerId, question: &str) -> String {
    format!(
        "{player}, {question} Type !yes (or !confirm yes) within {} seconds to proceed, or !no to cancel.",
        ctx.config.confirmation.ttl_seconds
    )
}

fn request_confirmation(
    ctx: &GameContext,
    kingdom: &mut Kingdom,
    action: ConfirmAction,
    now: DateTime<Utc>,
) {
    let ttl = Duration::seconds(i64::from(ctx.config.confirmation.ttl_seconds));
    kingdom.pending_confirmation = Some(PendingConfirmation {
        action,
        expires_at: now.checked_add_signed(ttl).unwrap_or(now),
    });
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn status(ctx: &GameContext, record: Option<&Kingdom>, player: &PlayerId) -> CommandOutcome {
    record.map_or_else(
        || CommandOutcome::reply(report::no_kingdom(player.as_str())),
        |kingdom| CommandOutcome::lines(report::status(&ctx.config, kingdom)),
    )
}

fn found(ctx: &GameContext, player: &PlayerId) -> CommandOutcome {
    let kingdom = Kingdom::new(player.clone(), &ctx.config.kingdom);
    info!(player = %player, "kingdom founded");
    CommandOutcome::saved(
        vec![
            format!("{player}'s kingdom has been created!"),
            "Type !chat for your first petitioner.".to_owned(),
        ],
        kingdom,
    )
}

fn create(
    ctx: &GameContext,
    record: Option<Kingdom>,
    player: &PlayerId,
    now: DateTime<Utc>,
) -> CommandOutcome {
    match record {
        Some(mut kingdom) if kingdom.game_active => {
            request_confirmation(ctx, &mut kingdom, ConfirmAction::Reset, now);
            let question = format!(
                "you already rule a kingdom (day {}). Start over with a new one?",
                kingdom.day
            );
            CommandOutcome::saved(vec![confirmation_prompt(ctx, player, &question)], kingdom)
        }
        _ => found(ctx, player),
    }
}

fn destroy(
    ctx: &GameContext,
    record: Option<Kingdom>,
    player: &PlayerId,
    now: DateTime<Utc>,
) -> CommandOutcome {
    match record {
        Some(mut kingdom) if kingdom.game_active => {
            request_confirmation(ctx, &mut kingdom, ConfirmAction::Abdicate, now);
            let prompt =
                confirmation_prompt(ctx, player, "are you sure you want to abdicate the throne?");
            CommandOutcome::saved(vec![prompt], kingdom)
        }
        _ => CommandOutcome::reply(report::no_kingdom(player.as_str())),
    }
}

fn confirm(
    ctx: &GameContext,
    record: Option<Kingdom>,
    player: &PlayerId,
    answer: Option<bool>,
    now: DateTime<Utc>,
) -> CommandOutcome {
    let Some(mut kingdom) = record.filter(|k| k.game_active) else {
        return CommandOutcome::reply(format!("{player}, there is nothing to confirm."));
    };
    let Some(pending) = kingdom.live_confirmation(now) else {
        return CommandOutcome::reply(format!(
            "{player}, there is nothing to confirm (or it has expired)."
        ));
    };
    let Some(answer) = answer else {
        return CommandOutcome::reply(format!("{player}, use !confirm yes or !confirm no."));
    };

    kingdom.pending_confirmation = None;
    if !answer {
        return CommandOutcome::saved(vec![format!("{player}, cancelled. Carry on.")], kingdom);
    }

    match pending.action {
        ConfirmAction::Reset => {
            info!(player = %player, old_day = kingdom.day, "kingdom reset");
            found(ctx, player)
        }
        ConfirmAction::Abdicate => {
            kingdom.end_reign(EndReason::Abdicated);
            info!(player = %player, day = kingdom.day, "abdicated");
            CommandOutcome::saved(report::reign_ended(&kingdom), kingdom)
        }
    }
}

fn advance(
    ctx: &GameContext,
    record: Option<Kingdom>,
    player: &PlayerId,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> CommandOutcome {
    let (mut kingdom, _) = match active_for_play(record, player, now) {
        Ok(active) => active,
        Err(rejection) => return rejection,
    };
    let replies = scheduler::advance(ctx, &mut kingdom, now, rng);
    CommandOutcome::saved(replies, kingdom)
}

fn decide(
    ctx: &GameContext,
    record: Option<Kingdom>,
    player: &PlayerId,
    decision: Decision,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> CommandOutcome {
    let (mut kingdom, phase) = match active_for_play(record, player, now) {
        Ok(active) => active,
        Err(rejection) => return rejection,
    };
    if phase != KingdomPhase::AwaitingDecision {
        return CommandOutcome::reply(format!(
            "{player}, no one is waiting for an answer. Type !chat to hear the next petitioner."
        ));
    }
    let replies = resolver::resolve_pending(ctx, &mut kingdom, decision, rng);
    CommandOutcome::saved(replies, kingdom)
}

fn set_tax(
    ctx: &GameContext,
    record: Option<Kingdom>,
    player: &PlayerId,
    level: Option<&str>,
    now: DateTime<Utc>,
) -> CommandOutcome {
    let (mut kingdom, _) = match active_for_play(record, player, now) {
        Ok(active) => active,
        Err(rejection) => return rejection,
    };
    let Some(rate) = level.and_then(TaxRate::parse) else {
        return CommandOutcome::reply(format!(
            "{player}, invalid tax rate. Choose from: low, normal, high."
        ));
    };
    if kingdom.tax_rate == rate {
        return CommandOutcome::reply(format!(
            "{player}, your tax rate is already {}.",
            rate.key()
        ));
    }
    if kingdom.tax_change_cooldown > 0 {
        return CommandOutcome::reply(format!(
            "{player}, you can't change taxes for {} more day(s).",
            kingdom.tax_change_cooldown
        ));
    }

    kingdom.tax_rate = rate;
    kingdom.tax_change_cooldown = ctx.config.taxes.change_cooldown_days;
    info!(player = %player, rate = rate.key(), "tax rate changed");
    let label = ctx.config.tax_level(rate).label;
    CommandOutcome::saved(
        vec![format!("{player}, your kingdom's tax rate is now {label}.")],
        kingdom,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use kingdom_types::StartingStats;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::catalog::{Catalog, EventDefinition, Outcome};
    use crate::config::GameConfig;

    fn ctx() -> GameContext {
        let catalog = Catalog::new(vec![EventDefinition::choice(
            "grandma",
            "An Old Grandma",
            "Spare a coin?",
            Outcome::new("She smiles."),
            Outcome::new("She shuffles away."),
        )])
        .unwrap();
        GameContext::new(catalog, GameConfig::default())
    }

    fn player() -> PlayerId {
        PlayerId::from("Arthur")
    }

    fn active() -> Kingdom {
        Kingdom::new(player(), &StartingStats::default())
    }

    fn run(record: Option<Kingdom>, command: &Command, now: DateTime<Utc>) -> CommandOutcome {
        let mut rng = SmallRng::seed_from_u64(7);
        execute(&ctx(), record, &player(), command, now, &mut rng)
    }

    #[test]
    fn parse_known_and_unknown() {
        assert_eq!(Command::parse("!chat", &[]), Some(Command::Advance));
        assert_eq!(
            Command::parse("!settax", &["HIGH".to_owned()]),
            Some(Command::SetTax(Some("high".to_owned())))
        );
        assert_eq!(
            Command::parse("!confirm", &["yes".to_owned()]),
            Some(Command::Confirm(Some(true)))
        );
        assert_eq!(Command::parse("!dance", &[]), None);
        assert!(Command::Status.is_read_only());
        assert!(!Command::Answer(true).is_read_only());
    }

    #[test]
    fn create_without_record_founds_kingdom() {
        let outcome = run(None, &Command::Create, Utc::now());
        let saved = outcome.save.unwrap();
        assert_eq!(saved.day, 0);
        assert_eq!(saved.treasury, 100);
        assert_eq!(
            outcome.replies.first().map(String::as_str),
            Some("Arthur's kingdom has been created!")
        );
    }

    #[test]
    fn create_over_ended_kingdom_needs_no_confirmation() {
        let mut ended = active();
        ended.day = 12;
        ended.end_reign(EndReason::Bankrupt);
        let outcome = run(Some(ended), &Command::Create, Utc::now());
        let saved = outcome.save.unwrap();
        assert!(saved.game_active);
        assert_eq!(saved.day, 0);
    }

    #[test]
    fn reset_requires_confirmation_within_ttl() {
        let now = Utc::now();
        let mut k = active();
        k.day = 8;

        let asked = run(Some(k), &Command::Create, now);
        let pending = asked.save.unwrap();
        assert!(pending.live_confirmation(now).is_some());
        assert_eq!(pending.day, 8);

        let confirmed = run(Some(pending), &Command::Answer(true), now + Duration::seconds(5));
        let fresh = confirmed.save.unwrap();
        assert_eq!(fresh.day, 0);
        assert!(fresh.pending_confirmation.is_none());
    }

    #[test]
    fn expired_confirmation_is_treated_as_absent() {
        let now = Utc::now();
        let asked = run(Some(active()), &Command::Destroy, now);
        let pending = asked.save.unwrap();

        let late = now + Duration::seconds(31);
        let outcome = run(Some(pending.clone()), &Command::Confirm(Some(true)), late);
        assert!(outcome.save.is_none());
        assert!(outcome.replies.first().unwrap().contains("nothing to confirm"));

        // Gameplay resumes once the window has passed.
        let chat = run(Some(pending), &Command::Advance, late);
        assert!(chat.save.unwrap().game_active);
    }

    #[test]
    fn gameplay_is_refused_while_confirmation_is_live() {
        let now = Utc::now();
        let pending = run(Some(active()), &Command::Destroy, now).save.unwrap();
        for command in [Command::Advance, Command::SetTax(Some("low".to_owned()))] {
            let outcome = run(Some(pending.clone()), &command, now);
            assert!(outcome.save.is_none(), "{command:?} should be refused");
        }
        let status = run(Some(pending), &Command::Status, now);
        assert!(status.save.is_none());
        assert!(status.replies.len() > 3);
    }

    #[test]
    fn abdication_ends_reign_and_keeps_day() {
        let now = Utc::now();
        let mut k = active();
        k.day = 30;
        let pending = run(Some(k), &Command::Destroy, now).save.unwrap();
        let outcome = run(Some(pending), &Command::Answer(true), now);
        let ended = outcome.save.unwrap();
        assert!(!ended.game_active);
        assert_eq!(ended.day, 30);
        assert_eq!(ended.end_reason, Some(EndReason::Abdicated));
    }

    #[test]
    fn declining_confirmation_keeps_kingdom() {
        let now = Utc::now();
        let pending = run(Some(active()), &Command::Destroy, now).save.unwrap();
        let outcome = run(Some(pending), &Command::Answer(false), now);
        let kept = outcome.save.unwrap();
        assert!(kept.game_active);
        assert!(kept.pending_confirmation.is_none());
    }

    #[test]
    fn answering_with_nothing_pending_changes_nothing() {
        let outcome = run(Some(active()), &Command::Answer(true), Utc::now());
        assert!(outcome.save.is_none());
        assert_eq!(outcome.replies.len(), 1);
    }

    #[test]
    fn ended_kingdom_refuses_gameplay() {
        let mut ended = active();
        ended.day = 4;
        ended.end_reign(EndReason::Revolt);
        for command in [Command::Advance, Command::Answer(true), Command::SetTax(None)] {
            let outcome = run(Some(ended.clone()), &command, Utc::now());
            assert!(outcome.save.is_none(), "{command:?} should be refused");
            assert!(outcome.replies.first().unwrap().contains("!kcreate"));
        }
    }

    #[test]
    fn settax_validation() {
        let now = Utc::now();
        let bad = run(Some(active()), &Command::SetTax(Some("extortion".to_owned())), now);
        assert_eq!(
            bad.replies,
            vec!["Arthur, invalid tax rate. Choose from: low, normal, high.".to_owned()]
        );
        assert!(bad.save.is_none());

        let same = run(Some(active()), &Command::SetTax(Some("normal".to_owned())), now);
        assert!(same.replies.first().unwrap().contains("already normal"));

        let changed = run(Some(active()), &Command::SetTax(Some("high".to_owned())), now);
        let k = changed.save.unwrap();
        assert_eq!(k.tax_rate, TaxRate::High);
        assert_eq!(k.tax_change_cooldown, 3);
    }

    #[test]
    fn commands_without_kingdom_explain_how_to_start() {
        for command in [Command::Advance, Command::Status, Command::Destroy] {
            let outcome = run(None, &command, Utc::now());
            assert!(outcome.save.is_none());
            assert!(outcome.replies.first().unwrap().contains("!kcreate"));
        }
    }
}
