//! Which petitions may be drawn right now.
//!
//! Eligibility is a pure, deterministic function of a definition and the
//! kingdom record. Randomness belongs to queue selection, never here.

use kingdom_types::Kingdom;

use crate::catalog::{Catalog, EventDefinition};

/// Whether `event` may be offered to `kingdom` in its current state.
///
/// All of the following must hold:
/// - the condition predicate (if any) is true;
/// - the season constraint (if any) matches;
/// - a required advisor is hired and a forbidden one is not;
/// - a unique petition has never been resolved;
/// - any cooldown since the last resolution has elapsed.
pub fn is_eligible(event: &EventDefinition, kingdom: &Kingdom) -> bool {
    if event.season.is_some_and(|season| season != kingdom.season) {
        return false;
    }
    if event
        .requires_advisor
        .is_some_and(|advisor| !kingdom.has_advisor(advisor))
    {
        return false;
    }
    if event
        .requires_absent_advisor
        .is_some_and(|advisor| kingdom.has_advisor(advisor))
    {
        return false;
    }
    if event.unique && kingdom.resolved_unique.contains(event.id) {
        return false;
    }
    if let Some(cooldown) = event.cooldown_days {
        let cooling = kingdom
            .last_resolved
            .get(event.id)
            .is_some_and(|&last| last.saturating_add(cooldown) > kingdom.day);
        if cooling {
            return false;
        }
    }
    event.condition.is_none_or(|condition| condition(kingdom))
}

/// Every eligible definition, in catalog order.
pub fn eligible_events<'a>(
    catalog: &'a Catalog,
    kingdom: &'a Kingdom,
) -> impl Iterator<Item = &'a EventDefinition> + 'a {
    catalog.iter().filter(move |event| is_eligible(event, kingdom))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kingdom_types::{Advisor, FlagValue, PlayerId, Season, StartingStats};

    use super::*;
    use crate::catalog::Outcome;

    fn kingdom() -> Kingdom {
        let mut k = Kingdom::new(PlayerId::from("Arthur"), &StartingStats::default());
        k.day = 10;
        k
    }

    fn event(id: &'static str) -> EventDefinition {
        EventDefinition::choice(id, "Someone", "Something.", Outcome::new("Yes."), Outcome::new("No."))
    }

    #[test]
    fn season_gate() {
        let e = event("festival").in_season(Season::Winter);
        let mut k = kingdom();
        assert!(!is_eligible(&e, &k));
        k.season = Season::Winter;
        assert!(is_eligible(&e, &k));
    }

    #[test]
    fn advisor_presence_and_absence() {
        let report = event("report").with_advisor(Advisor::General);
        let recruit = event("recruit").without_advisor(Advisor::General);
        let mut k = kingdom();
        assert!(!is_eligible(&report, &k));
        assert!(is_eligible(&recruit, &k));
        k.hire(Advisor::General);
        assert!(is_eligible(&report, &k));
        assert!(!is_eligible(&recruit, &k));
    }

    #[test]
    fn resolved_unique_never_returns() {
        let e = event("once").unique();
        let mut k = kingdom();
        assert!(is_eligible(&e, &k));
        k.resolved_unique.insert("once".to_owned());
        for day in [10, 100, 10_000] {
            k.day = day;
            assert!(!is_eligible(&e, &k));
        }
    }

    #[test]
    fn cooldown_window() {
        let e = event("bargain").cooldown(30);
        let mut k = kingdom();
        k.last_resolved.insert("bargain".to_owned(), 5);
        k.day = 34;
        assert!(!is_eligible(&e, &k));
        k.day = 35;
        assert!(is_eligible(&e, &k));
    }

    #[test]
    fn condition_reads_flags() {
        let e = event("collection")
            .when(|k| k.days_since_flag_at_least("loan_from_prince", 10));
        let mut k = kingdom();
        assert!(!is_eligible(&e, &k));
        k.set_flag("loan_from_prince", FlagValue::Day(5));
        k.day = 14;
        assert!(!is_eligible(&e, &k));
        k.day = 15;
        assert!(is_eligible(&e, &k));
    }

    #[test]
    fn eligible_events_keeps_catalog_order() {
        let catalog = Catalog::new(vec![
            event("a"),
            event("b").in_season(Season::Summer),
            event("c"),
        ])
        .unwrap();
        let k = kingdom();
        let ids: Vec<_> = eligible_events(&catalog, &k).map(|e| e.id).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }
}
