//! Player-facing text: change summaries, status, help, and end-of-reign lines.

use kingdom_types::{Kingdom, StatChange};

use crate::config::GameConfig;

/// Shown when a day's queue comes up empty.
pub const QUIET_DAY_LINE: &str =
    "The kingdom is quiet today. No one has come to petition the throne.";

/// Format moved stats as `treasury 100→50 | happiness 50→65`.
pub fn format_changes(changes: &[StatChange]) -> String {
    changes
        .iter()
        .map(|change| format!("{} {}→{}", change.stat.key(), change.old, change.new))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// The upkeep summary line, or `None` when nothing moved.
pub fn daily_changes(kingdom: &Kingdom, changes: &[StatChange]) -> Option<String> {
    if changes.is_empty() {
        return None;
    }
    Some(format!(
        "Daily changes for {}: {}",
        kingdom.player_id,
        format_changes(changes)
    ))
}

/// Trailing prompt after a resolution.
pub fn remaining_prompt(kingdom: &Kingdom) -> String {
    if kingdom.has_remaining_petitions() {
        "More petitioners await. Type !chat to hear the next one.".to_owned()
    } else {
        "That was the last petitioner today. Type !chat to begin a new day.".to_owned()
    }
}

/// The two lines announcing the end of a reign.
pub fn reign_ended(kingdom: &Kingdom) -> Vec<String> {
    let mut lines = vec![format!(
        "--- {}'s reign has ended after {} days. ---",
        kingdom.player_id, kingdom.day
    )];
    if let Some(reason) = kingdom.end_reason {
        lines.push(format!("Reason: {}", reason.message()));
    }
    lines
}

/// Full status report for an active kingdom, or the final tally of an ended one.
pub fn status(config: &GameConfig, kingdom: &Kingdom) -> Vec<String> {
    let player = &kingdom.player_id;
    if !kingdom.game_active {
        let reason = kingdom
            .end_reason
            .map_or("Unknown.", |reason| reason.message());
        return vec![
            format!("{player}, your reign ended after {} days. {reason}", kingdom.day),
            "Type !kcreate to found a new kingdom.".to_owned(),
        ];
    }

    let tax = config.tax_level(kingdom.tax_rate);
    let tax_line = if kingdom.tax_change_cooldown > 0 {
        format!(
            "Tax Rate: {} (locked for {} more day(s))",
            tax.label, kingdom.tax_change_cooldown
        )
    } else {
        format!("Tax Rate: {}", tax.label)
    };

    let council = if kingdom.advisors.is_empty() {
        "None".to_owned()
    } else {
        kingdom
            .advisors
            .iter()
            .map(|&advisor| config.advisor_name(advisor))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut lines = vec![
        format!("--- {player}'s Kingdom Status (Day {}) ---", kingdom.day),
        format!("Treasury: {}", kingdom.treasury),
        format!("Happiness: {}", kingdom.happiness),
        format!("Population: {}", kingdom.population),
        format!("Military: {}", kingdom.military),
    ];
    if kingdom.jailed_population > 0 {
        lines.push(format!("Jailed: {}", kingdom.jailed_population));
    }
    lines.push(tax_line);
    lines.push(format!(
        "Season: {} (day {} of {})",
        kingdom.season, kingdom.day_of_season, config.time.season_length
    ));
    lines.push(format!("Council: {council}"));
    lines
}

/// Reply for a player with no kingdom at all.
pub fn no_kingdom(player: &str) -> String {
    format!("{player}, you don't have a kingdom. Type !kcreate to begin.")
}

/// The command reference.
pub fn help() -> Vec<String> {
    [
        "--- Kingdom Petitions Help ---",
        "!kcreate: Create your kingdom (or start over, with confirmation).",
        "!chat: Hear the next petitioner. When today's petitioners are done, a new day begins.",
        "!yes / !no: Answer the petitioner (or a pending confirmation).",
        "!confirm yes|no: Answer a pending confirmation.",
        "!status: Show the full status of your kingdom.",
        "!settax low|normal|high: Set your tax rate.",
        "!kdestroy: Abdicate the throne and end your reign (with confirmation).",
        "!help: Show this message.",
    ]
    .iter()
    .map(|&line| line.to_owned())
    .collect()
}
