//! Entity resolution
//!
//! Joins the staged pages of one run into three key-indexed tables, one
//! row per fighter, event and bout. Each table is an arena keyed by
//! [`StableKey`]; bouts point at fighters and events by key, with an
//! explicit marker on every reference that does not resolve.
//!
//! # Order of work
//! 1. Fighter and event tables, built in parallel from their directories
//! 2. Bout table, linked against both
//! 3. Bout-derived fighter and event attributes (counts, card order)

mod bout;
mod event;
mod fighter;

pub use bout::{Bout, BoutLinks, BoutSource};
pub use event::{is_ufc_event, Event, EventSource};
pub use fighter::{Fighter, FighterSource};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{info, info_span, warn};

use ufcstats_common::Result;

use crate::keys::{KeyRegistry, StableKey};
use crate::run::RunContext;
use crate::staged::StagedRecordSet;

/// State of one foreign key on a bout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefStatus {
    /// Points at a row of this run's dimension table
    Resolved,
    /// Has a key, but no dimension row in this run
    Orphan,
    /// The source gave no URL to key on
    Missing,
}

impl RefStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefStatus::Resolved => "resolved",
            RefStatus::Orphan => "orphan",
            RefStatus::Missing => "missing",
        }
    }

    pub fn is_resolved(&self) -> bool {
        *self == RefStatus::Resolved
    }
}

impl std::fmt::Display for RefStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts describing how a run resolved
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionReport {
    pub fighters: usize,
    pub events: usize,
    pub bouts: usize,
    /// Directory rows with no URL to key on
    pub unkeyed_rows: usize,
    pub duplicate_fighters: usize,
    pub duplicate_events: usize,
    pub duplicate_bouts: usize,
    pub unmatched_fighter_details: usize,
    pub unmatched_fight_details: usize,
    /// Events listed on bout pages but absent from the event directory
    pub unmatched_event_listings: usize,
    pub orphan_event_refs: usize,
    pub orphan_fighter_refs: usize,
    pub missing_event_refs: usize,
    pub missing_fighter_refs: usize,
}

impl ResolutionReport {
    /// References that did not resolve, orphaned or missing
    pub fn unresolved_refs(&self) -> usize {
        self.orphan_event_refs
            + self.orphan_fighter_refs
            + self.missing_event_refs
            + self.missing_fighter_refs
    }
}

/// One entity table plus the bookkeeping from building it
#[derive(Debug)]
pub struct EntityTable<T> {
    pub rows: BTreeMap<StableKey, T>,
    pub registry: KeyRegistry,
    pub duplicates: usize,
    pub unmatched: usize,
    pub unkeyed: usize,
}

/// Resolved, key-ordered tables of one run
#[derive(Debug, Clone)]
pub struct ResolvedTables {
    pub fighters: BTreeMap<StableKey, Fighter>,
    pub events: BTreeMap<StableKey, Event>,
    pub bouts: BTreeMap<StableKey, Bout>,
    pub report: ResolutionReport,
}

/// Joins a complete staged record set into entity tables
pub struct EntityResolver<'a> {
    staged: &'a StagedRecordSet,
}

impl<'a> EntityResolver<'a> {
    /// The resolver takes the whole staged set; there is no partial resolve
    pub fn new(staged: &'a StagedRecordSet) -> Self {
        Self { staged }
    }

    pub fn resolve(&self, ctx: &RunContext) -> Result<ResolvedTables> {
        let _span = info_span!("resolve", run_date = %ctx.run_date()).entered();
        let staged = self.staged;

        let (fighters, events) = ctx.install(|| {
            rayon::join(
                || fighter::build(&staged.fighter_directory, &staged.fighter_details),
                || event::build(&staged.event_directory, &staged.bout_listings),
            )
        });
        let mut fighters = fighters?;
        let mut events = events?;

        let bouts = bout::build(
            &staged.bout_listings,
            &staged.fight_details,
            bout::LinkRegistries {
                fighters: &mut fighters.registry,
                events: &mut events.registry,
            },
            &fighters.rows,
            &events.rows,
        )?;

        let mut report = ResolutionReport {
            fighters: fighters.rows.len(),
            events: events.rows.len(),
            bouts: bouts.rows.len(),
            unkeyed_rows: fighters.unkeyed + events.unkeyed,
            duplicate_fighters: fighters.duplicates,
            duplicate_events: events.duplicates,
            duplicate_bouts: bouts.duplicates,
            unmatched_fighter_details: fighters.unmatched,
            unmatched_fight_details: bouts.unmatched,
            unmatched_event_listings: events.unmatched,
            ..Default::default()
        };
        for bout in bouts.rows.values() {
            let links = &bout.links;
            match links.event_ref {
                RefStatus::Orphan => report.orphan_event_refs += 1,
                RefStatus::Missing => report.missing_event_refs += 1,
                RefStatus::Resolved => {},
            }
            for status in [links.fighter_1_ref, links.fighter_2_ref] {
                match status {
                    RefStatus::Orphan => report.orphan_fighter_refs += 1,
                    RefStatus::Missing => report.missing_fighter_refs += 1,
                    RefStatus::Resolved => {},
                }
            }
        }

        let mut tables = ResolvedTables {
            fighters: fighters.rows,
            events: events.rows,
            bouts: bouts.rows,
            report,
        };
        enrich_from_bouts(&mut tables);

        let report = &tables.report;
        info!(
            fighters = report.fighters,
            events = report.events,
            bouts = report.bouts,
            duplicates = report.duplicate_fighters + report.duplicate_events + report.duplicate_bouts,
            unmatched_fighter_details = report.unmatched_fighter_details,
            unmatched_fight_details = report.unmatched_fight_details,
            "Resolved entities"
        );
        if report.unresolved_refs() > 0 {
            warn!(
                orphan_event_refs = report.orphan_event_refs,
                orphan_fighter_refs = report.orphan_fighter_refs,
                missing_event_refs = report.missing_event_refs,
                missing_fighter_refs = report.missing_fighter_refs,
                "Bouts reference entities missing from this run; the scrape may be partial"
            );
        }

        Ok(tables)
    }
}

/// Fill in the fighter and event attributes that depend on resolved bouts
fn enrich_from_bouts(tables: &mut ResolvedTables) {
    let mut card: HashMap<StableKey, Vec<(i64, StableKey)>> = HashMap::new();
    let mut female_bouts: HashMap<StableKey, usize> = HashMap::new();

    for bout in tables.bouts.values() {
        let event = bout
            .links
            .event_key
            .as_ref()
            .filter(|_| bout.links.event_ref.is_resolved())
            .and_then(|key| tables.events.get(key));

        if let Some(event) = event {
            card.entry(event.key.clone())
                .or_default()
                .push((bout.links.ordinal, bout.key.clone()));
        }

        for fighter_key in bout.resolved_fighters() {
            if let Some(fighter) = tables.fighters.get_mut(fighter_key) {
                fighter.bout_count += 1;
                if bout.is_ufc {
                    fighter.is_ufc_fighter = true;
                }
                if bout.is_female_bout() {
                    *female_bouts.entry(fighter_key.clone()).or_default() += 1;
                }
            }
        }
    }

    for (key, mut bouts) in card {
        bouts.sort();
        if let Some(event) = tables.events.get_mut(&key) {
            event.bout_keys = bouts.into_iter().map(|(_, k)| k).collect();
        }
    }

    // strict majority; ties and fighters without bouts stay false
    for (key, female) in female_bouts {
        if let Some(fighter) = tables.fighters.get_mut(&key) {
            fighter.is_female = female * 2 > fighter.bout_count;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::coerce::domain::coerce_bout_class;
    use crate::coerce::Coerced;
    use crate::config::PipelineConfig;
    use crate::staged::{StagedBoutListing, StagedEventDirectory, StagedFighterDirectory};
    use ufcstats_common::RunDate;

    const EVENT: &str = "http://ufcstats.com/event-details/e1";

    fn fighter(id: &str) -> StagedFighterDirectory {
        StagedFighterDirectory {
            fighter_url: format!("http://ufcstats.com/fighter-details/{}", id),
            fighter_name: Coerced::Valid(id.to_string()),
            ..Default::default()
        }
    }

    fn bout(id: &str, f1: &str, f2: &str, order: i64, class: &str) -> StagedBoutListing {
        StagedBoutListing {
            fight_url: format!("http://ufcstats.com/fight-details/{}", id),
            event_url: EVENT.to_string(),
            fighter_1_url: format!("http://ufcstats.com/fighter-details/{}", f1),
            fighter_2_url: format!("http://ufcstats.com/fighter-details/{}", f2),
            fight_order: Coerced::Valid(order),
            bout_class: coerce_bout_class(class),
            ..Default::default()
        }
    }

    fn staged(bouts: Vec<StagedBoutListing>) -> StagedRecordSet {
        StagedRecordSet {
            run_date: RunDate::parse("2026-01-24").unwrap(),
            event_directory: vec![StagedEventDirectory {
                event_url: EVENT.to_string(),
                event_name: Coerced::Valid("UFC 300".to_string()),
                ..Default::default()
            }],
            bout_listings: bouts,
            fight_details: vec![],
            fighter_directory: vec![fighter("a"), fighter("b"), fighter("c")],
            fighter_details: vec![],
        }
    }

    fn resolve(set: &StagedRecordSet) -> ResolvedTables {
        let ctx = RunContext::new(
            PipelineConfig::default().with_worker_threads(2),
            RunDate::parse("2026-01-24").unwrap(),
        )
        .unwrap();
        EntityResolver::new(set).resolve(&ctx).unwrap()
    }

    fn fighter_row<'t>(tables: &'t ResolvedTables, id: &str) -> &'t Fighter {
        tables
            .fighters
            .values()
            .find(|f| f.key.ident() == id)
            .unwrap()
    }

    #[test]
    fn test_orphan_fighter_2_is_kept_and_marked() {
        let set = staged(vec![bout("x", "a", "ghost", 1, "Lightweight Bout")]);
        let tables = resolve(&set);

        assert_eq!(tables.bouts.len(), 1);
        let bout = tables.bouts.values().next().unwrap();
        assert_eq!(bout.links.event_ref, RefStatus::Resolved);
        assert_eq!(bout.links.fighter_1_ref, RefStatus::Resolved);
        assert_eq!(bout.links.fighter_2_ref, RefStatus::Orphan);

        assert_eq!(tables.fighters.len(), 3);
        assert_eq!(tables.report.orphan_fighter_refs, 1);
        assert_eq!(tables.report.unresolved_refs(), 1);
    }

    #[test]
    fn test_bout_derived_attributes() {
        let set = staged(vec![
            bout("x2", "a", "b", 2, "Women's Flyweight Bout"),
            bout("x1", "a", "c", 1, "Women's Flyweight Bout"),
            bout("x3", "b", "c", 3, "Lightweight Bout"),
        ]);
        let tables = resolve(&set);

        let event = tables.events.values().next().unwrap();
        assert!(event.is_ufc);
        assert_eq!(event.bout_count(), 3);
        let card: Vec<&str> = event.bout_keys.iter().map(|k| k.as_str()).collect();
        assert_eq!(card, ["bout:x1", "bout:x2", "bout:x3"]);

        let a = fighter_row(&tables, "a");
        assert_eq!(a.bout_count, 2);
        assert!(a.is_female);
        assert!(a.is_ufc_fighter);

        // one of two bouts is female: a tie stays false
        let b = fighter_row(&tables, "b");
        assert_eq!(b.bout_count, 2);
        assert!(!b.is_female);
    }

    #[test]
    fn test_is_ufc_fighter_from_orphaned_ufc_event() {
        let mut listing = bout("x", "a", "b", 1, "Lightweight Bout");
        listing.event_url = "http://ufcstats.com/event-details/unlisted".to_string();
        listing.event_name = Coerced::Valid("UFC 300: Pereira vs. Hill".to_string());
        let mut other = bout("y", "c", "ghost", 1, "Lightweight Bout");
        other.event_url = "http://ufcstats.com/event-details/unlisted2".to_string();
        other.event_name = Coerced::Valid("Strikeforce: Nashville".to_string());
        let tables = resolve(&staged(vec![listing, other]));

        let bout = tables.bouts.values().find(|b| b.key.as_str() == "bout:x").unwrap();
        assert_eq!(bout.links.event_ref, RefStatus::Orphan);
        assert!(bout.is_ufc);

        let a = fighter_row(&tables, "a");
        assert_eq!(a.bout_count, 1);
        assert!(a.is_ufc_fighter);
        assert!(!fighter_row(&tables, "c").is_ufc_fighter);
    }

    #[test]
    fn test_fighter_without_bouts() {
        let tables = resolve(&staged(vec![]));
        let c = fighter_row(&tables, "c");
        assert_eq!(c.bout_count, 0);
        assert!(!c.is_female);
        assert!(!c.is_ufc_fighter);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let set = staged(vec![
            bout("x2", "a", "b", 2, "Lightweight Bout"),
            bout("x1", "c", "ghost", 1, "Lightweight Bout"),
        ]);
        let first = resolve(&set);
        let second = resolve(&set);
        assert_eq!(first.fighters, second.fighters);
        assert_eq!(first.events, second.events);
        assert_eq!(first.bouts, second.bouts);
        assert_eq!(first.report, second.report);
    }
}
