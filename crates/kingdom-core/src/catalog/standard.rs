//! The standard petition table.
//!
//! Chains communicate through flags. Each chain's flag names are declared
//! once here so the setting outcome, the gating predicate, and the
//! consuming outcome cannot drift apart.

use kingdom_types::{Advisor, FlagValue, Kingdom, Season, Stat};

use super::{
    Catalog, CatalogError, EventDefinition, Outcome, SubOutcome, TextContext, TextSource,
};
use crate::resolver::ResolutionContext;

/// Set when the fallen noble was helped; carries the day and the gold given.
pub const HELPED_FALLEN_NOBLE: &str = "helped_fallen_noble";
/// Set when the fallen noble was turned away.
pub const REJECTED_FALLEN_NOBLE: &str = "rejected_fallen_noble";
/// Set while a crime gang operates; labelled `entrenched` once it digs in.
pub const ACTIVE_CRIME_GANG: &str = "active_crime_gang";
/// Label of a crime gang tolerated by the crown.
pub const ENTRENCHED: &str = "entrenched";
/// Day the prince's loan was taken.
pub const LOAN_FROM_PRINCE: &str = "loan_from_prince";
/// Set once the prince's loan has been refused.
pub const PRINCE_IS_ENEMY: &str = "prince_is_enemy";
/// Day the kid set out on an adventure.
pub const KID_ON_ADVENTURE: &str = "kid_on_adventure";
/// Set once the ball has revealed its hiding place.
pub const KNOWS_BALL_LOCATION: &str = "knows_ball_location";
/// Day the ball's hiding place was revealed to the cat.
pub const REVEALED_BALL_LOCATION: &str = "revealed_ball_location";
/// Day the cat was lied to.
pub const LIED_TO_CAT: &str = "lied_to_cat";
/// Day the blighted farmers were helped.
pub const HELPED_FARMER_BLIGHT: &str = "helped_farmer_blight";
/// Set after the shady merchant's first deal.
pub const TRUSTED_SHADY_MERCHANT: &str = "trusted_shady_merchant";
/// Set while the treasurer's guild investment pays a daily dividend.
pub const GUILD_INVESTMENT: &str = "guild_investment";

/// Stake used when a noble petition is resolved without a rolled stake.
const NOBLE_FALLBACK_GOLD: i64 = 250;
/// Days a captured criminal spends in jail.
const SENTENCE_DAYS: u64 = 2;
/// Citizens each soldier can arrest.
const ARRESTS_PER_SOLDIER: i64 = 3;
/// Days a devil's bargain stays away after being heard.
const DEVIL_COOLDOWN_DAYS: u64 = 30;
/// Days a seasonal petition stays away after being heard.
const SEASONAL_COOLDOWN_DAYS: u64 = 20;

/// Build the standard catalog.
///
/// # Errors
///
/// Returns [`CatalogError`] if any definition fails validation.
pub fn standard_catalog() -> Result<Catalog, CatalogError> {
    let mut events = Vec::new();
    events.extend(fallen_noble_chain());
    events.extend(crime_chain());
    events.extend(prince_loan_chain());
    events.extend(kid_adventure_chain());
    events.extend(ball_and_cat_chain());
    events.extend(advisor_events());
    events.extend(farmer_chain());
    events.extend(merchant_chain());
    events.extend(town_events());
    events.extend(seasonal_events());
    Catalog::new(events)
}

// ---------------------------------------------------------------------------
// Fallen noble
// ---------------------------------------------------------------------------

fn fallen_noble_chain() -> Vec<EventDefinition> {
    vec![
        EventDefinition::choice(
            "fallen_noble_plea",
            "A Desperate Fallen Noble",
            TextSource::Computed(noble_plea_text),
            Outcome::new(
                "He falls to one knee, overcome with gratitude. 'You will not regret this, my lord.' He takes the resources and leaves with renewed hope.",
            )
            .deltas(&[(Stat::Happiness, 5)])
            .effect(fund_fallen_noble),
            Outcome::new(
                "His face hardens. 'I see. So this is the compassion you show your loyal subjects.' He storms out of the throne room.",
            )
            .deltas(&[(Stat::Happiness, -5)])
            .effect(reject_fallen_noble),
        )
        .unique()
        .stake(100, 250)
        .when(|k| !k.has_flag(HELPED_FALLEN_NOBLE) && !k.has_flag(REJECTED_FALLEN_NOBLE)),
        EventDefinition::narrative(
            "fallen_noble_outcome",
            "A Messenger",
            "",
            Outcome::new("")
                .random(vec![
                    SubOutcome::new(
                        5_000,
                        "The noble you aided has returned! 'My lord, my family is safe, and we devote our cause to you.' He returns your soldiers, new followers, and a portion of the funds.",
                    )
                    .petitioner("The Grateful Noble")
                    .deltas(&[
                        (Stat::Population, 30),
                        (Stat::Military, 30),
                        (Stat::Happiness, 10),
                    ])
                    .effect(repay_half_of_grant),
                    SubOutcome::new(
                        5_000,
                        "Sir, we've searched for the fallen noble you aided, but he and his 'family' have vanished without a trace. It seems you've been had.",
                    )
                    .petitioner("The Guard Captain")
                    .deltas(&[(Stat::Happiness, -15)]),
                ])
                .clears(&[HELPED_FALLEN_NOBLE]),
        )
        .unique()
        .when(|k| k.days_since_flag_at_least(HELPED_FALLEN_NOBLE, 3)),
        EventDefinition::choice(
            "spymaster_fallen_noble_plot",
            TextSource::AdvisorName(Advisor::Spymaster),
            "A whisper... The fallen noble you turned away has gathered his kin out of spite. They plot against you. For 25 gold, I can 'discourage' them.",
            Outcome::new(
                "The problem is dealt with. The dissent is silenced, but your act of suppression inspires no one.",
            )
            .deltas(&[(Stat::Treasury, -25)])
            .clears(&[REJECTED_FALLEN_NOBLE]),
            Outcome::new("You let them be. Their hateful whispers spread, and dissent grows.")
                .deltas(&[(Stat::Happiness, -15)])
                .clears(&[REJECTED_FALLEN_NOBLE]),
        )
        .with_advisor(Advisor::Spymaster)
        .unique()
        .when(|k| k.has_flag(REJECTED_FALLEN_NOBLE)),
    ]
}

fn noble_plea_text(ctx: &TextContext<'_>) -> String {
    let gold = ctx.stake.unwrap_or(NOBLE_FALLBACK_GOLD);
    format!(
        "My lord, my family has lost everything. May I have {gold} gold, 20 soldiers, and 30 citizens to help us relocate? We will find a way to repay you someday, I swear it."
    )
}

fn fund_fallen_noble(kingdom: &mut Kingdom, ctx: &mut ResolutionContext) {
    let gold = ctx.stake().unwrap_or(NOBLE_FALLBACK_GOLD);
    kingdom.adjust(Stat::Treasury, gold.saturating_neg());
    kingdom.adjust(Stat::Military, -20);
    kingdom.adjust(Stat::Population, -30);
    kingdom.set_flag(
        HELPED_FALLEN_NOBLE,
        FlagValue::Grant {
            day: kingdom.day,
            amount: gold,
        },
    );
}

fn reject_fallen_noble(kingdom: &mut Kingdom, _ctx: &mut ResolutionContext) {
    kingdom.set_flag(REJECTED_FALLEN_NOBLE, FlagValue::Set);
}

fn repay_half_of_grant(kingdom: &mut Kingdom, _ctx: &mut ResolutionContext) {
    let granted = match kingdom.flag(HELPED_FALLEN_NOBLE) {
        Some(&FlagValue::Grant { amount, .. }) => amount,
        _ => return,
    };
    kingdom.adjust(Stat::Treasury, granted.checked_div(2).unwrap_or_default());
}

// ---------------------------------------------------------------------------
// Crime and punishment
// ---------------------------------------------------------------------------

fn crime_chain() -> Vec<EventDefinition> {
    vec![
        EventDefinition::choice(
            "crime_wave",
            "The Guard Captain",
            TextSource::Computed(crime_wave_text),
            Outcome::new("You order the arrests. Your guards move to enforce the law.")
                .effect(crack_down_on_crime),
            Outcome::new(
                "You show mercy, but the criminals are emboldened. They form a gang and will keep stealing from the populace until they are dealt with.",
            )
            .deltas(&[(Stat::Happiness, -20), (Stat::Treasury, -100)])
            .effect(form_crime_gang),
        )
        .unique()
        .when(|k| k.happiness < 30),
        EventDefinition::choice(
            "black_market_emerges",
            TextSource::AdvisorName(Advisor::Spymaster),
            "My liege, my whispers have found a black market flourishing in the slums. It is run by the gang you spared. What are your orders?",
            Outcome::new(
                "You allow the market to operate. Cheap goods please the masses, but the gang becomes more entrenched.",
            )
            .deltas(&[(Stat::Happiness, 15)])
            .effect(entrench_crime_gang),
            Outcome::new(
                "You order a raid. Your soldiers smash the stalls and scatter the criminals, but the people who relied on that market are angry.",
            )
            .deltas(&[(Stat::Happiness, -15), (Stat::Military, -5)]),
        )
        .with_advisor(Advisor::Spymaster)
        .unique()
        .when(|k| k.has_flag(ACTIVE_CRIME_GANG)),
        EventDefinition::narrative(
            "jails_overflowing",
            "The Guard Captain",
            TextSource::Computed(jails_overflowing_text),
            Outcome::new(
                "You nod, acknowledging the captain's concerns. The cost of justice is high indeed.",
            )
            .deltas(&[(Stat::Happiness, -2)]),
        )
        .unique()
        .when(|k| k.jailed_population > 20),
        EventDefinition::narrative(
            "treasurer_crime_report",
            TextSource::AdvisorName(Advisor::Treasurer),
            TextSource::Computed(treasurer_crime_text),
            Outcome::new("You thank your treasurer for the grim but necessary accounting.")
                .deltas(&[(Stat::Treasury, -10)]),
        )
        .with_advisor(Advisor::Treasurer)
        .unique()
        .when(|k| k.jailed_population > 15 || k.has_flag(ACTIVE_CRIME_GANG)),
    ]
}

fn crime_wave_text(ctx: &TextContext<'_>) -> String {
    format!(
        "Sir, with happiness at a dismal {}, a crime wave has erupted! We've caught several citizens robbing their neighbors. Shall we imprison them to make an example?",
        ctx.kingdom.happiness
    )
}

fn jails_overflowing_text(ctx: &TextContext<'_>) -> String {
    format!(
        "Sir, the jails are overflowing with the {} souls we imprisoned. The upkeep is a constant drain.",
        ctx.kingdom.jailed_population
    )
}

fn treasurer_crime_text(ctx: &TextContext<'_>) -> String {
    if ctx.kingdom.has_flag(ACTIVE_CRIME_GANG) {
        "My liege, our productivity is plummeting due to this crime wave!".to_owned()
    } else {
        format!(
            "My liege, the ledgers don't lie. With {} able-bodied workers in jail, our tax income has taken a noticeable hit.",
            ctx.kingdom.jailed_population
        )
    }
}

/// Jail 10 to 15 percent of the population, limited by what the guards can
/// hold. A partial sweep leaves an organized gang behind.
fn crack_down_on_crime(kingdom: &mut Kingdom, ctx: &mut ResolutionContext) {
    let percent = ctx.roll(10, 15);
    let criminals = kingdom
        .population
        .saturating_mul(percent)
        .checked_div(100)
        .unwrap_or_default();
    let capacity = kingdom.military.saturating_mul(ARRESTS_PER_SOLDIER);
    let release_day = kingdom.day.saturating_add(SENTENCE_DAYS);

    if capacity >= criminals {
        kingdom.imprison(criminals, release_day);
        kingdom.adjust(Stat::Happiness, 10);
        kingdom.clear_flag(ACTIVE_CRIME_GANG);
        ctx.set_outcome_text("The operation is a complete success! All ringleaders are jailed.");
    } else {
        kingdom.imprison(capacity, release_day);
        kingdom.adjust(Stat::Happiness, 5);
        kingdom.set_flag(ACTIVE_CRIME_GANG, FlagValue::Set);
        ctx.set_outcome_text(
            "Your military is stretched thin! The guards capture some criminals, but many slip through the net, angered and organized.",
        );
    }
}

fn form_crime_gang(kingdom: &mut Kingdom, _ctx: &mut ResolutionContext) {
    kingdom.set_flag(ACTIVE_CRIME_GANG, FlagValue::Set);
}

fn entrench_crime_gang(kingdom: &mut Kingdom, _ctx: &mut ResolutionContext) {
    kingdom.set_flag(ACTIVE_CRIME_GANG, FlagValue::Label(ENTRENCHED.to_owned()));
}

// ---------------------------------------------------------------------------
// The prince's loan
// ---------------------------------------------------------------------------

fn prince_loan_chain() -> Vec<EventDefinition> {
    vec![
        EventDefinition::choice(
            "prince_loan_offer",
            "The Smug Prince of Almorg",
            "Your Majesty. I couldn't help but notice your... empty-looking treasury. I would be delighted to lend you 500 gold. I'll return for it in 10 days, of course.",
            Outcome::new("He smirks. 'A pleasure doing business.' Your kingdom is saved, for now.")
                .deltas(&[(Stat::Treasury, 500)])
                .effect(take_prince_loan),
            Outcome::new(
                "You refuse his charity. With no funds and no prospects, your kingdom collapses into chaos.",
            )
            .game_over(),
        )
        .unique()
        .rescues_bankruptcy()
        .when(|k| k.treasury <= 0 && !k.has_flag(PRINCE_IS_ENEMY)),
        EventDefinition::choice(
            "prince_loan_collection",
            "The Smug Prince of Almorg",
            "I've returned as promised for my 500 gold. I trust it's ready?",
            Outcome::new("He counts the coins and nods. 'Until next time.' The debt is settled.")
                .deltas(&[(Stat::Treasury, -500)])
                .clears(&[LOAN_FROM_PRINCE]),
            Outcome::new("You refuse to pay. This is an act of war! His army marches on your kingdom.")
                .effect(declare_prince_enemy)
                .random(vec![
                    SubOutcome::new(
                        5_000,
                        "Against the odds, your forces claim a stunning victory! The debt is erased by the sword.",
                    )
                    .deltas(&[(Stat::Military, -10), (Stat::Happiness, 20)]),
                    SubOutcome::new(
                        5_000,
                        "His professional army crushes yours. Your defeat is swift and humiliating.",
                    )
                    .deltas(&[
                        (Stat::Military, -20),
                        (Stat::Population, -15),
                        (Stat::Happiness, -25),
                        (Stat::Treasury, -50),
                    ]),
                ])
                .clears(&[LOAN_FROM_PRINCE]),
        )
        .unique()
        .when(|k| k.days_since_flag_at_least(LOAN_FROM_PRINCE, 10)),
    ]
}

fn take_prince_loan(kingdom: &mut Kingdom, _ctx: &mut ResolutionContext) {
    kingdom.set_flag(LOAN_FROM_PRINCE, FlagValue::Day(kingdom.day));
}

fn declare_prince_enemy(kingdom: &mut Kingdom, _ctx: &mut ResolutionContext) {
    kingdom.set_flag(PRINCE_IS_ENEMY, FlagValue::Set);
}

// ---------------------------------------------------------------------------
// The kid's adventure
// ---------------------------------------------------------------------------

fn kid_adventure_chain() -> Vec<EventDefinition> {
    vec![
        EventDefinition::choice(
            "kid_adventure_start",
            "An Eager-Eyed Kid",
            "Your Majesty! I'm going on a grand adventure! I just need a bit of funding... and maybe a few guards to carry my stuff. Please?",
            Outcome::new("He cheers and runs off, the guards struggling to keep up. Your people are charmed.")
                .deltas(&[(Stat::Treasury, -25), (Stat::Military, -10), (Stat::Happiness, 5)])
                .effect(send_kid_adventuring),
            Outcome::new("The kid's face falls. He kicks a rock and trudges away.")
                .deltas(&[(Stat::Happiness, -10)]),
        )
        .when(|k| k.treasury >= 25 && k.military >= 10 && !k.has_flag(KID_ON_ADVENTURE)),
        EventDefinition::choice(
            "kid_adventure_return",
            "The Guard Captain",
            "He's back! The kid has returned from his adventure, muddy but triumphant. Shall we see what he found?",
            Outcome::new("You welcome the young hero back!")
                .deltas(&[(Stat::Military, 10)])
                .random(adventure_haul([500, 2_500, 5_000, 2_000]))
                .clears(&[KID_ON_ADVENTURE]),
            Outcome::new(
                "You offer a perfunctory greeting before inspecting the haul. The kid looks a little disappointed.",
            )
            .deltas(&[(Stat::Military, 10), (Stat::Happiness, -2)])
            .random(adventure_haul([300, 2_200, 5_500, 2_000]))
            .clears(&[KID_ON_ADVENTURE]),
        )
        .unique()
        .when(|k| k.days_since_flag_at_least(KID_ON_ADVENTURE, 3)),
    ]
}

/// The kid's possible finds, rarest first, with the given weights.
fn adventure_haul(weights: [u32; 4]) -> Vec<SubOutcome> {
    let [gem, hoard, purse, rock] = weights;
    vec![
        SubOutcome::new(gem, "He found a dragon's nest and snagged a giant gem while it slept!")
            .deltas(&[(Stat::Treasury, 500)]),
        SubOutcome::new(hoard, "He stumbled upon a goblin treasure hoard!")
            .deltas(&[(Stat::Treasury, 200)]),
        SubOutcome::new(purse, "He found a lost merchant's purse on the road.")
            .deltas(&[(Stat::Treasury, 50)]),
        SubOutcome::new(rock, "He proudly presents you with a... weirdly shaped rock.")
            .deltas(&[(Stat::Treasury, 1)]),
    ]
}

fn send_kid_adventuring(kingdom: &mut Kingdom, _ctx: &mut ResolutionContext) {
    kingdom.set_flag(KID_ON_ADVENTURE, FlagValue::Day(kingdom.day));
}

// ---------------------------------------------------------------------------
// The ball and the cat
// ---------------------------------------------------------------------------

fn ball_and_cat_chain() -> Vec<EventDefinition> {
    vec![
        EventDefinition::narrative(
            "ball_hiding_plea",
            "A muffled voice from under your throne",
            "psst... it's me, the ball. I'm hiding from that cat, he won't stop chasing me. Don't tell him I'm here, okay??",
            Outcome::new("You silently acknowledge the... unusual plea from the terrified ball.")
                .effect(learn_ball_location),
        )
        .unique()
        .when(|k| !k.has_flag(KNOWS_BALL_LOCATION)),
        EventDefinition::choice(
            "cat_looking_for_ball",
            "A small, anxious-looking cat",
            "Mrow... pardon, your Majesty. I seem to have misplaced my favorite ball. It's red, very bouncy, and answers to the name 'Sir Reginald.' Have you seen it?",
            Outcome::new(
                "You point a finger under the throne. The cat's eyes light up and it pounces toward the spot. You hear a tiny, muffled scream.",
            )
            .effect(reveal_ball_location)
            .clears(&[KNOWS_BALL_LOCATION]),
            Outcome::new(
                "You shake your head. The cat's ears droop and it slinks away to continue its search. You feel a strange sense of relief from under the throne.",
            )
            .deltas(&[(Stat::Happiness, -1)])
            .effect(lie_to_cat)
            .clears(&[KNOWS_BALL_LOCATION]),
        )
        .unique()
        .when(|k| k.has_flag(KNOWS_BALL_LOCATION)),
        EventDefinition::narrative(
            "cat_quest_cat_reward",
            "The happy cat, batting Sir Reginald the ball",
            "I've got him! Thanks to your tip, he's all mine again. As thanks for your honesty, I brought you a gift I found. It's very shiny.",
            Outcome::new(
                "The cat drops a large, glittering diamond at your feet. It must have belonged to a visiting noble.",
            )
            .deltas(&[(Stat::Treasury, 150), (Stat::Happiness, 5)])
            .clears(&[REVEALED_BALL_LOCATION]),
        )
        .unique()
        .when(|k| k.days_since_flag_at_least(REVEALED_BALL_LOCATION, 3)),
        EventDefinition::narrative(
            "ball_quest_ball_reward",
            "The Guard Captain, looking puzzled",
            "Your Majesty, the oddest thing. We keep finding exquisite, perfectly preserved mice behind the tapestries. The royal chefs say they're a rare delicacy. A... gift, perhaps?",
            Outcome::new(
                "You graciously accept the strange but valuable tribute. The people are pleased with the unexpected bounty for the royal kitchens.",
            )
            .deltas(&[(Stat::Population, 10), (Stat::Happiness, 10)])
            .clears(&[LIED_TO_CAT]),
        )
        .unique()
        .when(|k| k.days_since_flag_at_least(LIED_TO_CAT, 3)),
    ]
}

fn learn_ball_location(kingdom: &mut Kingdom, _ctx: &mut ResolutionContext) {
    kingdom.set_flag(KNOWS_BALL_LOCATION, FlagValue::Set);
}

fn reveal_ball_location(kingdom: &mut Kingdom, _ctx: &mut ResolutionContext) {
    kingdom.set_flag(REVEALED_BALL_LOCATION, FlagValue::Day(kingdom.day));
}

fn lie_to_cat(kingdom: &mut Kingdom, _ctx: &mut ResolutionContext) {
    kingdom.set_flag(LIED_TO_CAT, FlagValue::Day(kingdom.day));
}

// ---------------------------------------------------------------------------
// Advisors
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_lines)]
fn advisor_events() -> Vec<EventDefinition> {
    vec![
        EventDefinition::choice(
            "recruit_general",
            "A battle-scarred soldier",
            "My liege, our army is disorganized. For a salary, the legendary General Kael could lead our troops.",
            Outcome::new("General Kael accepts your offer.")
                .deltas(&[(Stat::Military, 10)])
                .effect(hire_general),
            Outcome::new("You decline. The army remains a rudderless ship.")
                .deltas(&[(Stat::Happiness, -5)]),
        )
        .without_advisor(Advisor::General),
        EventDefinition::choice(
            "recruit_treasurer",
            "A guild merchant",
            "Your Majesty, the economy is a tangled mess. Lady Elara's services are costly, but she can make tax collection 10% more effective.",
            Outcome::new("Lady Elara joins your council.").effect(hire_treasurer),
            Outcome::new("You decide your current methods are sufficient."),
        )
        .without_advisor(Advisor::Treasurer)
        .when(|k| k.treasury > 200),
        EventDefinition::choice(
            "recruit_spymaster",
            "A cloaked figure",
            "Knowledge is power, your Majesty. Secrets are a weapon. I can be your weapon... for a price.",
            Outcome::new("The figure nods. 'My whispers will serve you.'").effect(hire_spymaster),
            Outcome::new("The figure melts back into the shadows."),
        )
        .without_advisor(Advisor::Spymaster),
        EventDefinition::choice(
            "general_report",
            TextSource::AdvisorName(Advisor::General),
            TextSource::Computed(general_report_text),
            Outcome::new("The training exercises are a success!")
                .deltas(&[(Stat::Treasury, -50), (Stat::Military, 15)]),
            Outcome::new("'As you command,' the General says, disappointed.")
                .deltas(&[(Stat::Happiness, -5)]),
        )
        .with_advisor(Advisor::General),
        EventDefinition::choice(
            "treasurer_report",
            TextSource::AdvisorName(Advisor::Treasurer),
            "Sire, I've identified an opportunity to invest 100 gold in the merchant guilds. It's a safe venture that should provide a steady return.",
            Outcome::new(
                "The investment pays off, providing a small but reliable boost to our daily income.",
            )
            .deltas(&[(Stat::Treasury, -100)])
            .effect(invest_in_guilds),
            Outcome::new("'A missed opportunity, but your decision is final,' your treasurer notes in her ledger."),
        )
        .with_advisor(Advisor::Treasurer)
        .when(|k| k.treasury >= 100 && !k.has_flag(GUILD_INVESTMENT)),
        EventDefinition::choice(
            "spymaster_report",
            TextSource::AdvisorName(Advisor::Spymaster),
            "A whisper... A noble family plots against you. For 25 gold, I can... 'discourage' them.",
            Outcome::new("The problem is dealt with. The nobles are suddenly very loyal.")
                .deltas(&[(Stat::Treasury, -25), (Stat::Happiness, 10)]),
            Outcome::new("You let them be. Dissent grows.").deltas(&[(Stat::Happiness, -15)]),
        )
        .with_advisor(Advisor::Spymaster),
    ]
}

fn general_report_text(ctx: &TextContext<'_>) -> String {
    format!(
        "My liege, our military strength is {}. I request 50 gold for training exercises.",
        ctx.kingdom.military
    )
}

fn hire_general(kingdom: &mut Kingdom, _ctx: &mut ResolutionContext) {
    kingdom.hire(Advisor::General);
}

fn hire_treasurer(kingdom: &mut Kingdom, _ctx: &mut ResolutionContext) {
    kingdom.hire(Advisor::Treasurer);
}

fn hire_spymaster(kingdom: &mut Kingdom, _ctx: &mut ResolutionContext) {
    kingdom.hire(Advisor::Spymaster);
}

fn invest_in_guilds(kingdom: &mut Kingdom, _ctx: &mut ResolutionContext) {
    kingdom.set_flag(GUILD_INVESTMENT, FlagValue::Day(kingdom.day));
}

// ---------------------------------------------------------------------------
// Farmers and merchants
// ---------------------------------------------------------------------------

fn farmer_chain() -> Vec<EventDefinition> {
    vec![
        EventDefinition::choice(
            "farmer_blight",
            "A Farmer",
            "My liege, a terrible blight has struck our fields! We need 50 gold for new seeds.",
            Outcome::new("The farmers are grateful! They promise to remember your generosity.")
                .deltas(&[(Stat::Treasury, -50), (Stat::Happiness, 15)])
                .effect(help_blighted_farmers),
            Outcome::new("The farmers despair.")
                .deltas(&[(Stat::Happiness, -15), (Stat::Population, -10)]),
        )
        .when(|k| !k.has_flag(HELPED_FARMER_BLIGHT)),
        EventDefinition::choice(
            "farmer_gratitude",
            "The Farmer You Helped",
            "Your Majesty! Thanks to your aid, we had a bountiful harvest. Please, accept this share of our profits as thanks!",
            Outcome::new("You graciously accept their gift. The people's loyalty deepens.")
                .deltas(&[(Stat::Treasury, 75), (Stat::Happiness, 10)])
                .clears(&[HELPED_FARMER_BLIGHT]),
            Outcome::new("You refuse, stating it was your duty. They are touched by your humility.")
                .deltas(&[(Stat::Happiness, 15)])
                .clears(&[HELPED_FARMER_BLIGHT]),
        )
        .unique()
        .when(|k| k.days_since_flag_at_least(HELPED_FARMER_BLIGHT, 15)),
    ]
}

fn help_blighted_farmers(kingdom: &mut Kingdom, _ctx: &mut ResolutionContext) {
    kingdom.set_flag(HELPED_FARMER_BLIGHT, FlagValue::Day(kingdom.day));
}

fn merchant_chain() -> Vec<EventDefinition> {
    vec![
        EventDefinition::choice(
            "shady_merchant",
            "A Shady Merchant",
            "Psst... a small investment of 20 gold could double your return!",
            Outcome::new("The gamble pays off!")
                .deltas(&[(Stat::Treasury, 20)])
                .effect(trust_shady_merchant),
            Outcome::new("You wisely refuse.").deltas(&[(Stat::Happiness, 5)]),
        ),
        EventDefinition::choice(
            "shady_merchant_big_deal",
            "The Shady Merchant",
            "You trusted me once, and it paid off! Now for a real opportunity. An overseas venture. It requires 200 gold. Are you in?",
            Outcome::new("You hand over the coin pouch... the merchant scurries away.")
                .deltas(&[(Stat::Treasury, -200)])
                .random(vec![
                    SubOutcome::new(
                        5_000,
                        "He returns with a chest of foreign silks! The investment was a massive success!",
                    )
                    .deltas(&[(Stat::Treasury, 500)]),
                    SubOutcome::new(5_000, "You never see him again. You've been had.")
                        .deltas(&[(Stat::Happiness, -20)]),
                ])
                .clears(&[TRUSTED_SHADY_MERCHANT]),
            Outcome::new("You decide not to press your luck. The merchant shrugs and disappears.")
                .clears(&[TRUSTED_SHADY_MERCHANT]),
        )
        .unique()
        .when(|k| k.has_flag(TRUSTED_SHADY_MERCHANT) && k.treasury >= 200),
    ]
}

fn trust_shady_merchant(kingdom: &mut Kingdom, _ctx: &mut ResolutionContext) {
    kingdom.set_flag(TRUSTED_SHADY_MERCHANT, FlagValue::Set);
}

// ---------------------------------------------------------------------------
// Town life
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_lines)]
fn town_events() -> Vec<EventDefinition> {
    vec![
        EventDefinition::choice(
            "grandma_coffee",
            "An Old Grandma",
            "Oh, dearie. I'd love a nice cup of coffee from the tavern, but I'm a few coins short. Could you spare a bit of gold for an old woman?",
            Outcome::new("She blesses you with a warm smile. The tavern patrons notice your kindness.")
                .deltas(&[(Stat::Treasury, -3), (Stat::Happiness, 3)]),
            Outcome::new("She shuffles away sadly. It was only a few coins."),
        ),
        EventDefinition::choice(
            "devil_bargain",
            "A handsome, well-dressed man",
            "Greetings. I represent a foreign power with vast resources. I can solve your financial woes instantly. All I ask is a small tithe of your population. Say, 10 souls?",
            Outcome::new("He smiles, and it doesn't reach his eyes. 'The payment has been collected.'")
                .deltas(&[(Stat::Population, -10), (Stat::Treasury, 200), (Stat::Happiness, -25)]),
            Outcome::new("He vanishes in a puff of smoke. Your moral clarity inspires your people.")
                .deltas(&[(Stat::Happiness, 5), (Stat::Population, 5)]),
        )
        .cooldown(DEVIL_COOLDOWN_DAYS),
        EventDefinition::choice(
            "alchemist_offer",
            "An Eccentric Alchemist",
            "Behold! My 'Elixir of Fortitude'! For just 40 gold, I can supply it to your guards. Their resolve will be unbreakable!",
            Outcome::new("The alchemist mixes a bubbling green potion for the guards.")
                .deltas(&[(Stat::Treasury, -40), (Stat::Military, 10), (Stat::Happiness, -5)]),
            Outcome::new("'Your loss!' the alchemist mutters, storming off."),
        )
        .when(|k| k.military > 15),
        EventDefinition::choice(
            "inventor_proposal",
            "A Pragmatic Inventor",
            "Your Majesty, I have designed a new plow that could revolutionize our farming. I need 100 gold to build the prototypes.",
            Outcome::new("The investment pays off! Food production increases.")
                .deltas(&[(Stat::Treasury, -100), (Stat::Population, 15)]),
            Outcome::new(
                "The inventor sadly packs up her blueprints and seeks a more forward-thinking patron.",
            )
            .deltas(&[(Stat::Happiness, -5)]),
        )
        .when(|k| k.population > 120),
        EventDefinition::choice(
            "border_dispute",
            "A Stressed Diplomat",
            "A dispute has arisen with a neighboring kingdom over border territories. We can press our claim with military might, or seek a peaceful resolution.",
            Outcome::new("You send soldiers to secure the border. The neighbor backs down, for now.")
                .deltas(&[(Stat::Military, 5), (Stat::Happiness, -5)]),
            Outcome::new(
                "You cede the disputed land to keep the peace. Your neighbor is pleased, but some of your people see it as weakness.",
            )
            .deltas(&[(Stat::Treasury, 20), (Stat::Happiness, -10)]),
        )
        .when(|k| k.day > 50),
        EventDefinition::choice(
            "traveling_circus",
            "A Traveling Circus",
            "For 30 gold, our circus will perform and lift the spirits of your citizens!",
            Outcome::new("The circus is a hit!")
                .deltas(&[(Stat::Treasury, -30), (Stat::Happiness, 25)]),
            Outcome::new("The circus packs up and leaves.").deltas(&[(Stat::Happiness, -5)]),
        ),
        EventDefinition::choice(
            "goblin_raid",
            "A Scout",
            TextSource::Computed(goblin_raid_text),
            Outcome::new("You order your troops to engage the goblin raiding party!").random(vec![
                SubOutcome::new(
                    1_000,
                    "A stunning victory! Your troops crushed the goblins and found their treasure stash!",
                )
                .deltas(&[(Stat::Treasury, 75), (Stat::Happiness, 15)]),
                SubOutcome::new(
                    1_500,
                    "A stunning victory! Your troops routed the goblins and recovered a cache of surprisingly well-made goblin armor.",
                )
                .deltas(&[(Stat::Military, 10), (Stat::Happiness, 15)]),
                SubOutcome::new(
                    5_000,
                    "You repel the goblins, but not without cost. The western farms are safe, for now.",
                )
                .deltas(&[(Stat::Military, -5), (Stat::Happiness, 10), (Stat::Treasury, -10)]),
                SubOutcome::new(
                    2_500,
                    "The goblins were more numerous than expected! They broke your lines and pillaged freely before retreating.",
                )
                .deltas(&[(Stat::Military, -10), (Stat::Happiness, -15), (Stat::Population, -5)]),
            ]),
            Outcome::new(
                "You decide not to risk an engagement. The goblins raid several farms before retreating.",
            )
            .deltas(&[(Stat::Happiness, -15), (Stat::Population, -10), (Stat::Treasury, -20)]),
        )
        .when(|k| k.military < 30),
        EventDefinition::choice(
            "migrant_group",
            "The Guard Captain",
            "A group of 20 migrants has arrived at the gates, seeking refuge.",
            Outcome::new("You welcome them. They are hardworking and grateful.")
                .deltas(&[(Stat::Population, 20), (Stat::Happiness, 5)]),
            Outcome::new("You turn the migrants away.").deltas(&[(Stat::Happiness, -10)]),
        ),
    ]
}

fn goblin_raid_text(ctx: &TextContext<'_>) -> String {
    format!(
        "Goblins are raiding the western farms! Our military strength is only {}! We must act!",
        ctx.kingdom.military
    )
}

// ---------------------------------------------------------------------------
// Seasons
// ---------------------------------------------------------------------------

fn seasonal_events() -> Vec<EventDefinition> {
    vec![
        EventDefinition::choice(
            "spring_festival",
            "A Cheerful Villager",
            "Let's celebrate the end of winter with a grand Spring Festival! It will cost 40 gold.",
            Outcome::new("The festival is a joyous success!")
                .deltas(&[(Stat::Treasury, -40), (Stat::Happiness, 25)]),
            Outcome::new("You cancel the festival.").deltas(&[(Stat::Happiness, -10)]),
        )
        .in_season(Season::Spring)
        .cooldown(SEASONAL_COOLDOWN_DAYS),
        EventDefinition::choice(
            "summer_drought",
            "A Worried Farmer",
            "There has been no rain for weeks! Our crops are withering. We need 50 gold for irrigation.",
            Outcome::new("The irrigation effort saves the harvest!")
                .deltas(&[(Stat::Treasury, -50), (Stat::Population, 5)]),
            Outcome::new("The crops fail under the blazing sun.")
                .deltas(&[(Stat::Happiness, -10), (Stat::Population, -10)]),
        )
        .in_season(Season::Summer)
        .cooldown(SEASONAL_COOLDOWN_DAYS),
        EventDefinition::choice(
            "autumn_harvest_bonus",
            "The Royal Treasurer",
            "My liege, the autumn harvest has been exceptionally bountiful! We have a surplus of 100 gold.",
            Outcome::new("You order a feast to celebrate!")
                .deltas(&[(Stat::Treasury, 50), (Stat::Happiness, 10)]),
            Outcome::new("You wisely store the entire surplus.")
                .deltas(&[(Stat::Treasury, 100), (Stat::Happiness, -5)]),
        )
        .in_season(Season::Autumn)
        .cooldown(SEASONAL_COOLDOWN_DAYS),
        EventDefinition::choice(
            "winter_blizzard",
            "The Guard Captain",
            "A fierce blizzard has buried the kingdom in snow! We need 70 gold for a relief effort.",
            Outcome::new("The relief effort is a success!")
                .deltas(&[(Stat::Treasury, -70), (Stat::Happiness, 20), (Stat::Population, 5)]),
            Outcome::new("The kingdom remains paralyzed. Some do not survive the cold.")
                .deltas(&[(Stat::Happiness, -20), (Stat::Population, -15)]),
        )
        .in_season(Season::Winter)
        .cooldown(SEASONAL_COOLDOWN_DAYS),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use kingdom_types::{Decision, PlayerId, StartingStats};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::catalog::WEIGHT_SCALE;
    use crate::config::GameConfig;
    use crate::context::GameContext;
    use crate::eligibility::is_eligible;
    use crate::resolver::apply_outcome;

    fn ctx() -> GameContext {
        GameContext::new(standard_catalog().unwrap(), GameConfig::default())
    }

    fn kingdom() -> Kingdom {
        let mut k = Kingdom::new(PlayerId::from("Arthur"), &StartingStats::default());
        k.day = 5;
        k
    }

    fn eligible(ctx: &GameContext, id: &str, k: &Kingdom) -> bool {
        is_eligible(ctx.catalog.get(id).unwrap(), k)
    }

    fn resolve(ctx: &GameContext, id: &str, k: &mut Kingdom, decision: Decision, seed: u64) {
        let event = ctx.catalog.get(id).unwrap();
        k.queue = vec![id.to_owned()];
        k.cursor = 0;
        let mut rng = SmallRng::seed_from_u64(seed);
        apply_outcome(k, event, decision, &mut rng);
    }

    #[test]
    fn catalog_builds_and_weights_fit() {
        let catalog = standard_catalog().unwrap();
        assert!(catalog.len() > 30);
        for event in catalog.iter() {
            for decision in [Decision::Yes, Decision::No] {
                let outcome = event.branches.outcome(decision);
                let total: u32 = outcome.sub_outcomes.iter().map(|s| s.weight).sum();
                assert!(
                    outcome.sub_outcomes.is_empty() || total == WEIGHT_SCALE,
                    "{} weights total {total}",
                    event.id
                );
            }
        }
    }

    #[test]
    fn fallen_noble_grant_uses_rolled_stake() {
        let ctx = ctx();
        let mut k = kingdom();
        k.treasury = 1_000;
        let event = ctx.catalog.get("fallen_noble_plea").unwrap();
        k.queue = vec![event.id.to_owned()];
        let stake = crate::resolver::roll_stake(&k, event).unwrap();
        assert!((100..=250).contains(&stake));

        resolve(&ctx, "fallen_noble_plea", &mut k, Decision::Yes, 1);

        assert_eq!(k.treasury, 1_000 - stake);
        assert_eq!(k.military, 0);
        assert_eq!(k.population, 70);
        assert_eq!(
            k.flag(HELPED_FALLEN_NOBLE),
            Some(&FlagValue::Grant { day: 5, amount: stake })
        );
        assert!(!eligible(&ctx, "fallen_noble_plea", &k));
    }

    #[test]
    fn fallen_noble_outcome_waits_three_days_and_clears_flag() {
        let ctx = ctx();
        let mut k = kingdom();
        k.set_flag(HELPED_FALLEN_NOBLE, FlagValue::Grant { day: 5, amount: 200 });
        k.day = 7;
        assert!(!eligible(&ctx, "fallen_noble_outcome", &k));
        k.day = 8;
        assert!(eligible(&ctx, "fallen_noble_outcome", &k));

        let before = k.treasury;
        resolve(&ctx, "fallen_noble_outcome", &mut k, Decision::Acknowledge, 3);
        assert!(!k.has_flag(HELPED_FALLEN_NOBLE));
        assert!(k.treasury == before || k.treasury == before + 100);
    }

    #[test]
    fn rejected_noble_plot_needs_spymaster() {
        let ctx = ctx();
        let mut k = kingdom();
        resolve(&ctx, "fallen_noble_plea", &mut k, Decision::No, 1);
        assert!(k.has_flag(REJECTED_FALLEN_NOBLE));
        assert!(!eligible(&ctx, "spymaster_fallen_noble_plot", &k));
        k.hire(Advisor::Spymaster);
        assert!(eligible(&ctx, "spymaster_fallen_noble_plot", &k));
    }

    #[test]
    fn crackdown_with_strong_guard_jails_everyone() {
        let ctx = ctx();
        let mut k = kingdom();
        k.happiness = 20;
        k.military = 100;
        k.set_flag(ACTIVE_CRIME_GANG, FlagValue::Set);

        resolve(&ctx, "crime_wave", &mut k, Decision::Yes, 9);

        assert!((10..=15).contains(&k.jailed_population));
        assert_eq!(k.population + k.jailed_population, 100);
        assert_eq!(k.happiness, 30);
        assert!(!k.has_flag(ACTIVE_CRIME_GANG));
        assert_eq!(k.jail_cohorts().first().map(|c| c.release_day), Some(7));
    }

    #[test]
    fn crackdown_with_thin_guard_leaves_gang() {
        let ctx = ctx();
        let mut k = kingdom();
        k.happiness = 20;
        k.military = 2;

        resolve(&ctx, "crime_wave", &mut k, Decision::Yes, 9);

        assert_eq!(k.jailed_population, 6);
        assert_eq!(k.happiness, 25);
        assert_eq!(k.flag(ACTIVE_CRIME_GANG), Some(&FlagValue::Set));
    }

    #[test]
    fn tolerated_black_market_entrenches_gang() {
        let ctx = ctx();
        let mut k = kingdom();
        k.hire(Advisor::Spymaster);
        k.set_flag(ACTIVE_CRIME_GANG, FlagValue::Set);
        resolve(&ctx, "black_market_emerges", &mut k, Decision::Yes, 1);
        assert_eq!(
            k.flag(ACTIVE_CRIME_GANG).and_then(FlagValue::label),
            Some(ENTRENCHED)
        );
    }

    #[test]
    fn refusing_prince_ends_reign() {
        let ctx = ctx();
        let mut k = kingdom();
        k.treasury = -5;
        assert!(eligible(&ctx, "prince_loan_offer", &k));
        resolve(&ctx, "prince_loan_offer", &mut k, Decision::No, 1);
        assert!(!k.game_active);
        assert_eq!(k.treasury, -5);
    }

    #[test]
    fn refusing_collection_makes_prince_an_enemy() {
        let ctx = ctx();
        let mut k = kingdom();
        k.set_flag(LOAN_FROM_PRINCE, FlagValue::Day(2));
        k.day = 12;
        resolve(&ctx, "prince_loan_collection", &mut k, Decision::No, 4);
        assert!(!k.has_flag(LOAN_FROM_PRINCE));
        assert!(k.has_flag(PRINCE_IS_ENEMY));
        k.treasury = -10;
        assert!(!eligible(&ctx, "prince_loan_offer", &k));
    }

    #[test]
    fn recruitment_hires_and_retires_the_offer() {
        let ctx = ctx();
        let mut k = kingdom();
        assert!(eligible(&ctx, "recruit_general", &k));
        assert!(!eligible(&ctx, "general_report", &k));
        resolve(&ctx, "recruit_general", &mut k, Decision::Yes, 1);
        assert!(k.has_advisor(Advisor::General));
        assert_eq!(k.military, 20);
        assert!(!eligible(&ctx, "recruit_general", &k));
        assert!(eligible(&ctx, "general_report", &k));
    }

    #[test]
    fn cat_chain_branches_by_answer() {
        let ctx = ctx();
        let mut honest = kingdom();
        resolve(&ctx, "ball_hiding_plea", &mut honest, Decision::Acknowledge, 1);
        let mut liar = honest.clone();

        resolve(&ctx, "cat_looking_for_ball", &mut honest, Decision::Yes, 1);
        resolve(&ctx, "cat_looking_for_ball", &mut liar, Decision::No, 1);

        assert!(!honest.has_flag(KNOWS_BALL_LOCATION));
        assert_eq!(honest.flag_day(REVEALED_BALL_LOCATION), Some(5));
        assert_eq!(liar.flag_day(LIED_TO_CAT), Some(5));

        honest.day = 8;
        liar.day = 8;
        assert!(eligible(&ctx, "cat_quest_cat_reward", &honest));
        assert!(!eligible(&ctx, "ball_quest_ball_reward", &honest));
        assert!(eligible(&ctx, "ball_quest_ball_reward", &liar));
    }

    #[test]
    fn seasonal_petitions_follow_the_calendar() {
        let ctx = ctx();
        let mut k = kingdom();
        assert!(eligible(&ctx, "spring_festival", &k));
        assert!(!eligible(&ctx, "winter_blizzard", &k));
        k.season = Season::Winter;
        assert!(eligible(&ctx, "winter_blizzard", &k));
    }

    #[test]
    fn advisor_petitioner_uses_configured_name() {
        let ctx = ctx();
        let k = kingdom();
        let event = ctx.catalog.get("general_report").unwrap();
        let text_ctx = TextContext {
            kingdom: &k,
            stake: None,
        };
        assert_eq!(event.petitioner.render(&text_ctx, &ctx.config), "General Kael");
        assert_eq!(
            event.text.render(&text_ctx, &ctx.config),
            "My liege, our military strength is 10. I request 50 gold for training exercises."
        );
    }
}
