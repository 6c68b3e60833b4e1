//! End-to-end scenarios for the petition engine.
//!
//! These drive the public command surface and engine entry points with
//! seeded randomness and check the behavioral guarantees of the day cycle:
//! upkeep cadence, idempotent presentation, uniqueness, chained flags,
//! weighted sub-outcomes, and terminal conditions.

#![allow(
    clippy::unwrap_used,
    clippy::arithmetic_side_effects,
    clippy::cast_precision_loss,
    clippy::indexing_slicing
)]

use chrono::Utc;
use kingdom_core::catalog::standard::{LOAN_FROM_PRINCE, PRINCE_IS_ENEMY};
use kingdom_core::catalog::{Catalog, EventDefinition, Outcome, SubOutcome};
use kingdom_core::config::GameConfig;
use kingdom_core::eligibility::is_eligible;
use kingdom_core::resolver::{apply_outcome, resolve_pending};
use kingdom_core::{Command, GameContext, execute, scheduler};
use kingdom_types::{Decision, EndReason, FlagValue, Kingdom, PlayerId, StartingStats, Stat};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn player() -> PlayerId {
    PlayerId::from("Arthur")
}

fn fresh() -> Kingdom {
    Kingdom::new(player(), &StartingStats::default())
}

fn standard() -> GameContext {
    GameContext::standard(GameConfig::default()).unwrap()
}

fn synthetic(events: Vec<EventDefinition>) -> GameContext {
    GameContext::new(Catalog::new(events).unwrap(), GameConfig::default())
}

fn quiet_petition(id: &'static str) -> EventDefinition {
    EventDefinition::choice(id, "A Villager", "A small favor?", Outcome::new("Done."), Outcome::new("Fine."))
}

// =========================================================================
// Day cycle
// =========================================================================

#[test]
fn first_advance_starts_day_one_without_upkeep() {
    let ctx = standard();
    let mut rng = SmallRng::seed_from_u64(11);
    let now = Utc::now();

    let created = execute(&ctx, None, &player(), &Command::Create, now, &mut rng);
    let kingdom = created.save.unwrap();
    assert_eq!(kingdom.day, 0);

    let advanced = execute(&ctx, Some(kingdom), &player(), &Command::Advance, now, &mut rng);
    let kingdom = advanced.save.unwrap();

    assert_eq!(kingdom.day, 1);
    assert!(!kingdom.queue.is_empty());
    assert_eq!(kingdom.treasury, 100);
    assert_eq!(kingdom.population, 100);
    assert!(
        !advanced.replies.iter().any(|l| l.starts_with("Daily changes")),
        "first day must not report upkeep: {:?}",
        advanced.replies
    );
    assert!(advanced.replies.iter().any(|l| l.ends_with("wants to talk.")));
}

#[test]
fn upkeep_runs_once_per_day_transition() {
    let ctx = synthetic(vec![quiet_petition("a"), quiet_petition("b"), quiet_petition("c")]);
    let mut rng = SmallRng::seed_from_u64(5);
    let mut kingdom = fresh();
    kingdom.day = 3;
    kingdom.queue = vec!["a".to_owned(), "b".to_owned(), "c".to_owned(), "a".to_owned()];

    let mut upkeep_reports = 0;
    let mut steps = 0;
    while kingdom.day == 3 {
        let lines = scheduler::advance(&ctx, &mut kingdom, Utc::now(), &mut rng);
        upkeep_reports += lines.iter().filter(|l| l.starts_with("Daily changes")).count();
        if kingdom.awaiting_decision && kingdom.day == 3 {
            resolve_pending(&ctx, &mut kingdom, Decision::Yes, &mut rng);
        }
        steps += 1;
        assert!(steps < 20, "day never turned over");
    }

    assert_eq!(kingdom.day, 4);
    assert_eq!(upkeep_reports, 1);
}

#[test]
fn quiet_day_does_not_repeat_upkeep() {
    let ctx = synthetic(vec![]);
    let mut rng = SmallRng::seed_from_u64(5);
    let mut kingdom = fresh();
    kingdom.day = 8;

    scheduler::advance(&ctx, &mut kingdom, Utc::now(), &mut rng);
    assert_eq!(kingdom.day, 9);
    let after_first = kingdom.treasury;

    scheduler::advance(&ctx, &mut kingdom, Utc::now(), &mut rng);
    assert_eq!(kingdom.day, 10);
    // One day of taxes, not two.
    assert_eq!(kingdom.treasury, after_first + 10);
}

#[test]
fn advance_while_awaiting_is_idempotent() {
    let ctx = synthetic(vec![quiet_petition("a"), quiet_petition("b")]);
    let mut rng = SmallRng::seed_from_u64(2);
    let now = Utc::now();
    let mut kingdom = fresh();
    scheduler::advance(&ctx, &mut kingdom, Utc::now(), &mut rng);
    assert!(kingdom.awaiting_decision);

    let first = execute(&ctx, Some(kingdom.clone()), &player(), &Command::Advance, now, &mut rng);
    let again = execute(&ctx, Some(kingdom.clone()), &player(), &Command::Advance, now, &mut rng);

    assert_eq!(first.replies, again.replies);
    assert_eq!(first.save.as_ref(), Some(&kingdom));
    assert_eq!(again.save.as_ref(), Some(&kingdom));
}

#[test]
fn decide_applies_branch_deltas_and_reports_them() {
    let ctx = synthetic(vec![EventDefinition::choice(
        "farm",
        "A Farmer",
        "We need seeds.",
        Outcome::new("The farmers are grateful!").deltas(&[(Stat::Treasury, -50), (Stat::Happiness, 15)]),
        Outcome::new("The farmers despair."),
    )]);
    let mut rng = SmallRng::seed_from_u64(2);
    let mut kingdom = fresh();
    kingdom.day = 1;
    kingdom.queue = vec!["farm".to_owned()];
    kingdom.awaiting_decision = true;
    kingdom.current_event_id = Some("farm".to_owned());

    let outcome = execute(&ctx, Some(kingdom), &player(), &Command::Answer(true), Utc::now(), &mut rng);
    let kingdom = outcome.save.unwrap();

    assert_eq!(kingdom.treasury, 50);
    assert_eq!(kingdom.happiness, 65);
    assert!(outcome.replies.contains(&"treasury 100→50 | happiness 50→65".to_owned()));
    assert!(!kingdom.awaiting_decision);
    assert_eq!(kingdom.cursor, 1);
}

// =========================================================================
// Terminal conditions
// =========================================================================

#[test]
fn negative_treasury_without_rescue_is_bankruptcy() {
    let ctx = standard();
    let mut rng = SmallRng::seed_from_u64(8);
    let mut kingdom = fresh();
    kingdom.day = 7;
    kingdom.treasury = -5;
    kingdom.population = 0;
    kingdom.set_flag(PRINCE_IS_ENEMY, FlagValue::Set);

    let outcome = execute(&ctx, Some(kingdom), &player(), &Command::Advance, Utc::now(), &mut rng);
    let kingdom = outcome.save.unwrap();

    assert!(!kingdom.game_active);
    assert_eq!(kingdom.end_reason, Some(EndReason::Bankrupt));
    assert_eq!(kingdom.day, 7);
    assert!(outcome.replies.contains(&"Reason: The kingdom is bankrupt!".to_owned()));

    let after = execute(&ctx, Some(kingdom), &player(), &Command::Advance, Utc::now(), &mut rng);
    assert!(after.save.is_none());
}

#[test]
fn prince_loan_rescues_negative_treasury() {
    let offer = standard().catalog.get("prince_loan_offer").unwrap().clone();
    let ctx = synthetic(vec![offer]);
    let mut rng = SmallRng::seed_from_u64(8);
    let mut kingdom = fresh();
    kingdom.day = 7;
    kingdom.treasury = -5;
    kingdom.population = 0;

    let outcome = execute(&ctx, Some(kingdom), &player(), &Command::Advance, Utc::now(), &mut rng);
    let kingdom = outcome.save.unwrap();

    assert!(kingdom.game_active);
    assert_eq!(kingdom.day, 8);
    assert!(kingdom.queue.iter().any(|id| id == "prince_loan_offer"));
}

// =========================================================================
// Taxes
// =========================================================================

#[test]
fn second_tax_change_inside_cooldown_is_rejected() {
    let ctx = standard();
    let mut rng = SmallRng::seed_from_u64(1);
    let now = Utc::now();
    let mut kingdom = fresh();
    kingdom.day = 2;

    let first = execute(
        &ctx,
        Some(kingdom),
        &player(),
        &Command::SetTax(Some("high".to_owned())),
        now,
        &mut rng,
    );
    assert_eq!(
        first.replies,
        vec!["Arthur, your kingdom's tax rate is now High.".to_owned()]
    );
    let kingdom = first.save.unwrap();

    let second = execute(
        &ctx,
        Some(kingdom),
        &player(),
        &Command::SetTax(Some("low".to_owned())),
        now,
        &mut rng,
    );
    assert_eq!(
        second.replies,
        vec!["Arthur, you can't change taxes for 3 more day(s).".to_owned()]
    );
    assert!(second.save.is_none());
}

// =========================================================================
// Chains and uniqueness
// =========================================================================

#[test]
fn prince_loan_collection_waits_ten_days() {
    let ctx = standard();
    let collection = ctx.catalog.get("prince_loan_collection").unwrap();
    let mut kingdom = fresh();
    kingdom.set_flag(LOAN_FROM_PRINCE, FlagValue::Day(5));

    for day in 0..15 {
        kingdom.day = day;
        assert!(!is_eligible(collection, &kingdom), "fired early on day {day}");
    }
    kingdom.day = 15;
    assert!(is_eligible(collection, &kingdom));
}

#[test]
fn taking_the_loan_records_the_day() {
    let ctx = standard();
    let offer = ctx.catalog.get("prince_loan_offer").unwrap();
    let mut rng = SmallRng::seed_from_u64(4);
    let mut kingdom = fresh();
    kingdom.day = 5;
    kingdom.treasury = -20;
    kingdom.queue = vec![offer.id.to_owned()];

    apply_outcome(&mut kingdom, offer, Decision::Yes, &mut rng);

    assert_eq!(kingdom.treasury, 480);
    assert_eq!(kingdom.flag_day(LOAN_FROM_PRINCE), Some(5));
}

#[test]
fn resolved_unique_petitions_never_return() {
    let ctx = standard();
    let mut rng = SmallRng::seed_from_u64(6);

    for event in ctx.catalog.iter().filter(|e| e.unique) {
        let mut kingdom = fresh();
        kingdom.day = 40;
        kingdom.queue = vec![event.id.to_owned()];
        apply_outcome(&mut kingdom, event, Decision::Yes, &mut rng);

        for _ in 0..20 {
            let mut sample = kingdom.clone();
            sample.day = rng.random_range(1..500);
            sample.treasury = rng.random_range(-100..1_000);
            sample.happiness = rng.random_range(-10..100);
            sample.jailed_population = rng.random_range(0..50);
            sample.game_active = true;
            assert!(!is_eligible(event, &sample), "{} returned", event.id);
        }
    }
}

// =========================================================================
// Weighted sub-outcomes
// =========================================================================

#[test]
fn sub_outcome_frequencies_match_weights() {
    const TRIALS: u32 = 10_000;
    let weights = [1_000_u32, 1_500, 5_000, 2_500];
    let ctx = synthetic(vec![EventDefinition::choice(
        "raid",
        "A Scout",
        "Goblins!",
        Outcome::new("Charge!").random(vec![
            SubOutcome::new(weights[0], "one").deltas(&[(Stat::Treasury, 1)]),
            SubOutcome::new(weights[1], "two").deltas(&[(Stat::Treasury, 2)]),
            SubOutcome::new(weights[2], "three").deltas(&[(Stat::Treasury, 3)]),
            SubOutcome::new(weights[3], "four").deltas(&[(Stat::Treasury, 4)]),
        ]),
        Outcome::new("Hide."),
    )]);
    let event = ctx.catalog.get("raid").unwrap();
    let mut base = fresh();
    base.day = 1;
    base.queue = vec!["raid".to_owned()];

    let mut rng = SmallRng::seed_from_u64(2024);
    let mut counts = [0_u32; 4];
    for _ in 0..TRIALS {
        let mut kingdom = base.clone();
        apply_outcome(&mut kingdom, event, Decision::Yes, &mut rng);
        let picked = usize::try_from(kingdom.treasury - base.treasury - 1).unwrap();
        counts[picked] += 1;
    }

    let chi_square: f64 = counts
        .iter()
        .zip(weights)
        .map(|(&observed, weight)| {
            let expected = f64::from(TRIALS) * f64::from(weight) / 10_000.0;
            let diff = f64::from(observed) - expected;
            diff * diff / expected
        })
        .sum();
    // Three degrees of freedom, p = 0.001.
    assert!(chi_square < 16.27, "chi-square {chi_square} for {counts:?}");
}

// =========================================================================
// Long play
// =========================================================================

#[test]
fn long_reign_keeps_record_consistent() {
    let ctx = standard();
    let mut rng = SmallRng::seed_from_u64(99);
    let now = Utc::now();
    let mut record = execute(&ctx, None, &player(), &Command::Create, now, &mut rng).save;

    for _ in 0..600 {
        let Some(kingdom) = record.clone() else { break };
        if !kingdom.game_active {
            break;
        }
        let command = if kingdom.awaiting_decision {
            Command::Answer(rng.random_bool(0.5))
        } else {
            Command::Advance
        };
        let outcome = execute(&ctx, Some(kingdom), &player(), &command, now, &mut rng);
        assert!(!outcome.replies.is_empty());
        if let Some(saved) = outcome.save {
            assert!(saved.cursor <= saved.queue.len());
            if saved.awaiting_decision {
                let id = saved.current_event_id.as_deref().unwrap();
                assert!(ctx.catalog.get(id).is_some());
            }
            assert!(saved.population >= 0);
            assert!(saved.military >= 0);
            record = Some(saved);
        }
    }

    let kingdom = record.unwrap();
    assert!(kingdom.day > 1);
}
