//! Daily scheduler: the day-boundary state machine.
//!
//! A kingdom is either mid-day (petitions remain after the cursor) or at a
//! day boundary (the queue is exhausted). Advancing mid-day only presents
//! the next petition. Advancing at a boundary runs, in order:
//!
//! 1. Upkeep (skipped on the very first day of a reign): day and season
//!    counters, seasonal deltas, tax income and tax mood, flag-gated
//!    penalties, advisor salaries and effects, jail releases.
//! 2. A speculative draw of the new day's queue.
//! 3. The bankruptcy check, which is waived when the new queue holds a
//!    petition able to rescue the treasury.
//! 4. The unrest warning and its escalating penalty.
//! 5. The revolt check.
//!
//! A fatal verdict restores the record to its pre-upkeep state before
//! ending the reign, so the final day count is the last day actually
//! played. Upkeep and the day increment happen together, so an empty queue
//! simply concludes that day and the next advance runs upkeep exactly once.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use kingdom_types::{Advisor, EndReason, FlagValue, Kingdom, KingdomPhase, Stat, TaxRate};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::context::GameContext;
use crate::eligibility::eligible_events;
use crate::presenter;
use crate::report::{self, QUIET_DAY_LINE};

/// Shown when every remaining slot of the day went stale.
pub const DAY_CONCLUDED_LINE: &str =
    "No one else comes forward today. Type !chat to begin a new day.";

/// Lines produced by one upkeep pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpkeepReport {
    /// Season notices, release notices, and the daily change summary.
    pub lines: Vec<String>,
    /// Gold collected in taxes.
    pub tax_income: i64,
    /// Citizens released from jail.
    pub released: i64,
}

// ---------------------------------------------------------------------------
// Advance
// ---------------------------------------------------------------------------

/// Advance a kingdom by one step of the protocol.
///
/// Ended kingdoms and kingdoms holding a live confirmation are left
/// untouched; the command layer rejects those before getting here.
pub fn advance(
    ctx: &GameContext,
    kingdom: &mut Kingdom,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> Vec<String> {
    match kingdom.phase(now) {
        KingdomPhase::Ended | KingdomPhase::PendingConfirmation => Vec::new(),
        KingdomPhase::AwaitingDecision => presenter::re_present(ctx, kingdom),
        KingdomPhase::InDay => presenter::present_next(ctx, kingdom, rng)
            .unwrap_or_else(|| vec![DAY_CONCLUDED_LINE.to_owned()]),
        KingdomPhase::DayBoundary => start_day(ctx, kingdom, rng),
    }
}

/// Cross a day boundary: upkeep, queue draw, failure checks, first petition.
fn start_day(ctx: &GameContext, kingdom: &mut Kingdom, rng: &mut impl Rng) -> Vec<String> {
    let mut lines = Vec::new();

    if kingdom.is_fresh() {
        kingdom.day = 1;
        kingdom.queue = draw_queue(ctx, kingdom, rng);
        kingdom.cursor = 0;
        info!(
            player = %kingdom.player_id,
            queued = kingdom.queue.len(),
            "first day of reign"
        );
    } else {
        let before_upkeep = kingdom.clone();
        let upkeep = run_upkeep(&ctx.config, kingdom);
        lines.extend(upkeep.lines);

        let queue = draw_queue(ctx, kingdom, rng);
        if let Some(reason) = boundary_verdict(ctx, kingdom, &queue, &mut lines) {
            *kingdom = before_upkeep;
            kingdom.end_reign(reason);
            info!(
                player = %kingdom.player_id,
                day = kingdom.day,
                reason = reason.key(),
                "reign ended at day boundary"
            );
            lines.extend(report::reign_ended(kingdom));
            return lines;
        }

        kingdom.queue = queue;
        kingdom.cursor = 0;
        info!(
            player = %kingdom.player_id,
            day = kingdom.day,
            season = %kingdom.season,
            tax_income = upkeep.tax_income,
            queued = kingdom.queue.len(),
            "new day"
        );
    }

    match presenter::present_next(ctx, kingdom, rng) {
        Some(petition) => lines.extend(petition),
        None => lines.push(QUIET_DAY_LINE.to_owned()),
    }
    lines
}

/// Decide whether the kingdom survives the boundary.
///
/// Applies the unrest penalty as a side effect and appends any warning.
fn boundary_verdict(
    ctx: &GameContext,
    kingdom: &mut Kingdom,
    queue: &[String],
    lines: &mut Vec<String>,
) -> Option<EndReason> {
    if kingdom.treasury < 0 {
        let rescue = queue.iter().any(|id| {
            ctx.catalog
                .get(id)
                .is_some_and(|event| event.rescues_bankruptcy)
        });
        if !rescue {
            return Some(EndReason::Bankrupt);
        }
        info!(
            player = %kingdom.player_id,
            treasury = kingdom.treasury,
            "treasury negative, rescue petition queued"
        );
    }

    let unrest = &ctx.config.unrest;
    let in_unrest = kingdom.happiness <= unrest.revolt_threshold
        && kingdom.tax_rate != TaxRate::most_lenient();
    if in_unrest {
        kingdom.unrest_streak = kingdom.unrest_streak.saturating_add(1);
        let penalty = unrest.penalty(kingdom.unrest_streak);
        kingdom.adjust(Stat::Happiness, penalty.saturating_neg());
        lines.push(format!(
            "[!] WARNING: Happiness in {}'s kingdom is critically low! Unrest costs {penalty} happiness.",
            kingdom.player_id
        ));
        warn!(
            player = %kingdom.player_id,
            happiness = kingdom.happiness,
            streak = kingdom.unrest_streak,
            "unrest"
        );
    } else {
        kingdom.unrest_streak = 0;
    }

    (kingdom.happiness <= 0).then_some(EndReason::Revolt)
}

// ---------------------------------------------------------------------------
// Upkeep
// ---------------------------------------------------------------------------

/// Run one day's upkeep against `kingdom`.
pub fn run_upkeep(config: &GameConfig, kingdom: &mut Kingdom) -> UpkeepReport {
    let before = kingdom.snapshot();
    let mut lines = Vec::new();

    // (a) calendar
    kingdom.day = kingdom.day.saturating_add(1);
    kingdom.day_of_season = kingdom.day_of_season.saturating_add(1);
    kingdom.tax_change_cooldown = kingdom.tax_change_cooldown.saturating_sub(1);

    // (b) season rollover
    if kingdom.day_of_season > config.time.season_length {
        kingdom.day_of_season = 1;
        kingdom.season = config.time.next_season(kingdom.season);
        lines.push(format!(
            "A new season has begun in {}'s kingdom: {}!",
            kingdom.player_id, kingdom.season
        ));
    }

    // (c) seasonal deltas
    kingdom.apply(&config.time.season_effects(kingdom.season));

    // (d) taxes and penalties
    let tax_income = tax_income(config, kingdom);
    kingdom.adjust(Stat::Treasury, tax_income);
    kingdom.adjust(
        Stat::Happiness,
        config.tax_level(kingdom.tax_rate).happiness_effect,
    );
    for penalty in &config.penalties {
        if penalty_active(kingdom.flag(&penalty.flag), penalty.label.as_deref()) {
            kingdom.apply(&penalty.effects);
        }
    }

    // (e) council
    let council: Vec<Advisor> = kingdom.advisors.iter().copied().collect();
    for advisor in council {
        if let Some(entry) = config.advisors.get(&advisor) {
            kingdom.adjust(Stat::Treasury, entry.salary.saturating_neg());
            kingdom.apply(&entry.effects);
        }
    }

    // (f) jail
    let released = kingdom.release_due_prisoners();
    if released > 0 {
        lines.push(format!(
            "{released} prisoners have served their sentences and return to {}'s population.",
            kingdom.player_id
        ));
    }

    // (g) summary
    let changes = before.changes_to(&kingdom.snapshot());
    if let Some(summary) = report::daily_changes(kingdom, &changes) {
        lines.push(summary);
    }

    debug!(
        player = %kingdom.player_id,
        day = kingdom.day,
        tax_income,
        released,
        "upkeep applied"
    );

    UpkeepReport {
        lines,
        tax_income,
        released,
    }
}

/// Daily tax income: `floor(population / 10 * rate)`, scaled by the
/// optional happiness multiplier and the treasurer bonus.
pub fn tax_income(config: &GameConfig, kingdom: &Kingdom) -> i64 {
    compute_tax_income(config, kingdom).unwrap_or_else(|| {
        warn!(player = %kingdom.player_id, "tax income overflowed, collecting nothing");
        0
    })
}

fn compute_tax_income(config: &GameConfig, kingdom: &Kingdom) -> Option<i64> {
    let rate = config.tax_level(kingdom.tax_rate).income_per_10_pop;
    let mut income = Decimal::from(kingdom.population)
        .checked_div(Decimal::TEN)?
        .checked_mul(rate)?;

    if config.taxes.happiness_multiplier {
        let multiplier = Decimal::from(kingdom.happiness)
            .checked_div(Decimal::from(50))?
            .checked_add(Decimal::ONE)?
            .max(Decimal::ONE);
        income = income.checked_mul(multiplier)?;
    }

    if kingdom.has_advisor(Advisor::Treasurer) {
        let bonus = Decimal::from(config.taxes.treasurer_bonus_pct)
            .checked_div(Decimal::ONE_HUNDRED)?
            .checked_add(Decimal::ONE)?;
        income = income.checked_mul(bonus)?;
    }

    income.floor().to_i64()
}

fn penalty_active(flag: Option<&FlagValue>, label: Option<&str>) -> bool {
    match (flag, label) {
        (None, _) => false,
        (Some(value), Some(wanted)) => value.label() == Some(wanted),
        (Some(value), None) => value.label().is_none(),
    }
}

// ---------------------------------------------------------------------------
// Queue draw
// ---------------------------------------------------------------------------

/// Draw the day's petition queue.
///
/// Picks a target size uniformly in the configured range, then draws that
/// many times from the eligible set, recomputing candidates before each
/// draw so that per-day repeat limits and single-draw uniqueness hold.
/// Stops early when nothing remains eligible.
pub fn draw_queue(ctx: &GameContext, kingdom: &Kingdom, rng: &mut impl Rng) -> Vec<String> {
    let schedule = &ctx.config.schedule;
    let target = rng.random_range(schedule.min_events_per_day..=schedule.max_events_per_day);
    let eligible: Vec<_> = eligible_events(&ctx.catalog, kingdom).collect();

    let mut queue: Vec<String> = Vec::new();
    let mut drawn: BTreeMap<&'static str, u32> = BTreeMap::new();

    for _ in 0..target {
        let candidates: Vec<_> = eligible
            .iter()
            .filter(|event| {
                let times = drawn.get(event.id).copied().unwrap_or(0);
                times < schedule.max_repeats_per_day && !(event.unique && times > 0)
            })
            .collect();
        if candidates.is_empty() {
            break;
        }
        let pick = rng.random_range(0..candidates.len());
        let Some(event) = candidates.get(pick) else {
            break;
        };
        let times = drawn.entry(event.id).or_insert(0);
        *times = times.saturating_add(1);
        queue.push(event.id.to_owned());
    }

    debug!(
        player = %kingdom.player_id,
        target,
        drawn = queue.len(),
        eligible = eligible.len(),
        "queue drawn"
    );
    queue
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kingdom_types::{PlayerId, Season, StartingStats};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::catalog::standard::GUILD_INVESTMENT;
    use crate::catalog::{Catalog, EventDefinition, Outcome};

    fn petition(id: &'static str) -> EventDefinition {
        EventDefinition::choice(id, "Someone", "Something.", Outcome::new("Yes."), Outcome::new("No."))
    }

    fn context(events: Vec<EventDefinition>) -> GameContext {
        GameContext::new(Catalog::new(events).unwrap(), GameConfig::default())
    }

    fn kingdom() -> Kingdom {
        Kingdom::new(PlayerId::from("Arthur"), &StartingStats::default())
    }

    #[test]
    fn upkeep_applies_season_taxes_and_salaries() {
        let config = GameConfig::default();
        let mut k = kingdom();
        k.day = 1;
        k.hire(Advisor::General);

        let report = run_upkeep(&config, &mut k);

        assert_eq!(k.day, 2);
        assert_eq!(k.day_of_season, 2);
        // Spring +1 population; tax 100/10 * 1.0 = 10; salary 5.
        assert_eq!(k.population, 101);
        assert_eq!(report.tax_income, 10);
        assert_eq!(k.treasury, 105);
        assert_eq!(k.military, 11);
        assert!(report.lines.iter().any(|l| l.starts_with("Daily changes for Arthur:")));
    }

    #[test]
    fn prisoners_walk_free_on_their_release_day() {
        let ctx = context(vec![]);
        let mut k = kingdom();
        k.day = 5;
        assert_eq!(k.imprison(12, 7), 12);
        assert_eq!(k.population, 88);
        let mut rng = SmallRng::seed_from_u64(3);

        let lines = advance(&ctx, &mut k, Utc::now(), &mut rng);
        assert_eq!(k.day, 6);
        assert_eq!(k.jailed_population, 12);
        assert!(!lines.iter().any(|l| l.contains("served their sentences")));

        let lines = advance(&ctx, &mut k, Utc::now(), &mut rng);
        assert_eq!(k.day, 7);
        assert_eq!(k.jailed_population, 0);
        // 88 + two days of spring growth + 12 released.
        assert_eq!(k.population, 102);
        assert!(lines.iter().any(|l| {
            l == "12 prisoners have served their sentences and return to Arthur's population."
        }));
        assert!(lines.iter().any(|l| l.contains("jailed 12→0")));
    }

    #[test]
    fn guild_investment_pays_a_daily_dividend() {
        let config = GameConfig::default();
        let mut plain = kingdom();
        plain.day = 2;
        let mut invested = plain.clone();
        invested.set_flag(GUILD_INVESTMENT, FlagValue::Day(1));

        run_upkeep(&config, &mut plain);
        let report = run_upkeep(&config, &mut invested);

        assert_eq!(plain.treasury, 110);
        // Same tax income plus the 3 gold dividend.
        assert_eq!(invested.treasury, 113);
        assert!(report.lines.iter().any(|l| l.contains("treasury 100→113")));
    }

    #[test]
    fn treasurer_and_happiness_multiplier_scale_income() {
        let mut config = GameConfig::default();
        let mut k = kingdom();
        k.population = 200;
        k.tax_rate = TaxRate::High;
        // 200/10 * 1.5 = 30
        assert_eq!(tax_income(&config, &k), 30);
        k.hire(Advisor::Treasurer);
        // 30 * 1.1 = 33
        assert_eq!(tax_income(&config, &k), 33);
        config.taxes.happiness_multiplier = true;
        k.happiness = 75;
        // 30 * 2.5 * 1.1 = 82.5
        assert_eq!(tax_income(&config, &k), 82);
    }

    #[test]
    fn season_rolls_over_after_season_length() {
        let config = GameConfig::default();
        let mut k = kingdom();
        k.day = 20;
        k.day_of_season = 20;
        let report = run_upkeep(&config, &mut k);
        assert_eq!(k.season, Season::Summer);
        assert_eq!(k.day_of_season, 1);
        assert!(report.lines.iter().any(|l| l.contains("A new season has begun")));
    }

    #[test]
    fn crime_gang_penalty_follows_label() {
        let config = GameConfig::default();
        let mut k = kingdom();
        k.day = 1;
        k.set_flag("active_crime_gang", FlagValue::Set);
        run_upkeep(&config, &mut k);
        // +10 taxes -5 siphon
        assert_eq!(k.treasury, 105);

        k.set_flag("active_crime_gang", FlagValue::Label("entrenched".to_owned()));
        run_upkeep(&config, &mut k);
        // +10 taxes -10 siphon
        assert_eq!(k.treasury, 105);
    }

    #[test]
    fn tax_cooldown_ticks_down() {
        let config = GameConfig::default();
        let mut k = kingdom();
        k.day = 1;
        k.tax_change_cooldown = 2;
        run_upkeep(&config, &mut k);
        assert_eq!(k.tax_change_cooldown, 1);
        run_upkeep(&config, &mut k);
        run_upkeep(&config, &mut k);
        assert_eq!(k.tax_change_cooldown, 0);
    }

    #[test]
    fn queue_respects_repeat_limit_and_uniqueness() {
        let ctx = context(vec![petition("common"), petition("rare").unique()]);
        let k = kingdom();
        for seed in 0..50 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let queue = draw_queue(&ctx, &k, &mut rng);
            assert!(queue.len() <= 3, "only 3 slots can be filled: {queue:?}");
            assert!(queue.iter().filter(|id| *id == "common").count() <= 2);
            assert!(queue.iter().filter(|id| *id == "rare").count() <= 1);
        }
    }

    #[test]
    fn queue_size_stays_in_configured_range() {
        let events: Vec<_> = ["a", "b", "c", "d", "e", "f"].into_iter().map(petition).collect();
        let ctx = context(events);
        let k = kingdom();
        for seed in 0..50 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let len = draw_queue(&ctx, &k, &mut rng).len();
            assert!((3..=10).contains(&len));
        }
    }

    #[test]
    fn empty_catalog_gives_quiet_first_day() {
        let ctx = context(vec![]);
        let mut k = kingdom();
        let mut rng = SmallRng::seed_from_u64(3);
        let lines = advance(&ctx, &mut k, Utc::now(), &mut rng);
        assert_eq!(k.day, 1);
        assert_eq!(lines, vec![QUIET_DAY_LINE.to_owned()]);
    }

    #[test]
    fn unrest_escalates_then_resets() {
        let ctx = context(vec![]);
        let mut k = kingdom();
        k.day = 5;
        k.happiness = 20;
        k.tax_rate = TaxRate::Normal;
        let mut rng = SmallRng::seed_from_u64(3);

        let lines = advance(&ctx, &mut k, Utc::now(), &mut rng);
        assert!(lines.iter().any(|l| l.starts_with("[!] WARNING")));
        assert_eq!(k.unrest_streak, 1);
        assert_eq!(k.happiness, 18);

        advance(&ctx, &mut k, Utc::now(), &mut rng);
        assert_eq!(k.unrest_streak, 2);
        assert_eq!(k.happiness, 14);

        k.tax_rate = TaxRate::Low;
        advance(&ctx, &mut k, Utc::now(), &mut rng);
        assert_eq!(k.unrest_streak, 0);
    }

    #[test]
    fn revolt_ends_reign_from_pre_upkeep_state() {
        let ctx = context(vec![]);
        let mut k = kingdom();
        k.day = 9;
        k.happiness = 1;
        let mut rng = SmallRng::seed_from_u64(3);

        let lines = advance(&ctx, &mut k, Utc::now(), &mut rng);

        assert!(!k.game_active);
        assert_eq!(k.end_reason, Some(EndReason::Revolt));
        assert_eq!(k.day, 9);
        assert!(lines.iter().any(|l| l == "Reason: The people have revolted!"));
    }

    #[test]
    fn rescue_petition_defers_bankruptcy() {
        let ctx = context(vec![
            petition("emergency_loan")
                .when(|k| k.treasury <= 0)
                .rescues_bankruptcy(),
        ]);
        let mut k = kingdom();
        k.day = 4;
        k.treasury = -40;
        let mut rng = SmallRng::seed_from_u64(3);

        advance(&ctx, &mut k, Utc::now(), &mut rng);

        assert!(k.game_active);
        assert_eq!(k.day, 5);
        assert_eq!(k.current_event_id.as_deref(), Some("emergency_loan"));
    }
}
