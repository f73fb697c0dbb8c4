//! Bout entities: event-page listings enriched with fight pages
//!
//! Every listing row becomes a bout, whether or not its fighters and event
//! resolve. Unresolved references are marked, never dropped.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use ufcstats_common::Result;

use super::{EntityTable, RefStatus};
use crate::coerce::{Attempts, BoutClass, Coerced, MethodResult, Outcome};
use crate::completeness::{merge_field, FieldStatus, Flagged};
use crate::keys::{composite_bout_key, EntityKind, KeyRegistry, StableKey};
use crate::resolve::event::{is_ufc_event, Event};
use crate::resolve::fighter::Fighter;
use crate::staged::{StagedBoutListing, StagedFightDetails};

/// The pages one bout was seen on
#[derive(Debug, Clone, Copy)]
pub enum BoutSource<'a> {
    ListingOnly(&'a StagedBoutListing),
    WithDetails {
        listing: &'a StagedBoutListing,
        details: &'a StagedFightDetails,
    },
}

/// Foreign keys and card position worked out before merging
#[derive(Debug, Clone, PartialEq)]
pub struct BoutLinks {
    pub event_key: Option<StableKey>,
    pub fighter_1_key: Option<StableKey>,
    pub fighter_2_key: Option<StableKey>,
    pub event_ref: RefStatus,
    pub fighter_1_ref: RefStatus,
    pub fighter_2_ref: RefStatus,
    pub ordinal: i64,
}

impl<'a> BoutSource<'a> {
    pub fn listing(&self) -> &'a StagedBoutListing {
        match self {
            BoutSource::ListingOnly(listing) => listing,
            BoutSource::WithDetails { listing, .. } => listing,
        }
    }

    /// Merge into one bout row; a valid fight-page value beats the listing
    pub fn merge(&self, key: StableKey, links: BoutLinks) -> Bout {
        let listing = self.listing();
        let mut bout = Bout {
            key,
            fight_url: listing.fight_url.clone(),
            links,
            has_details: false,
            is_ufc: listing.event_name.value().is_some_and(|name| is_ufc_event(name)),
            bout_class: listing.bout_class.clone(),
            method: listing.method.clone(),
            method_detail: method_detail(&listing.method),
            end_round: listing.end_round.clone(),
            end_time: listing.end_time.clone(),
            time_format: Coerced::Missing,
            referee: Coerced::Missing,
            fighter_1_result: listing.fighter_1_result.clone(),
            fighter_2_result: listing.fighter_2_result.clone(),
            kd_1: listing.kd_1.clone(),
            kd_2: listing.kd_2.clone(),
            sig_str_landed_1: listing.str_1.clone(),
            sig_str_landed_2: listing.str_2.clone(),
            sig_str_attempted_1: Coerced::Missing,
            sig_str_attempted_2: Coerced::Missing,
            td_landed_1: listing.td_1.clone(),
            td_landed_2: listing.td_2.clone(),
            sub_1: listing.sub_1.clone(),
            sub_2: listing.sub_2.clone(),
            td_attempted_1: Coerced::Missing,
            td_attempted_2: Coerced::Missing,
            ctrl_1: Coerced::Missing,
            ctrl_2: Coerced::Missing,
        };

        if let BoutSource::WithDetails { details, .. } = self {
            bout.has_details = true;
            bout.bout_class = merge_field(&details.bout_class, &listing.bout_class);
            bout.method = merge_field(&details.method, &listing.method);
            // detail text follows whichever page the method came from
            if details.method.is_valid() || !listing.method.is_valid() {
                bout.method_detail =
                    merge_field(&details.details, &method_detail(&details.method));
            }
            bout.end_round = merge_field(&details.end_round, &listing.end_round);
            bout.end_time = merge_field(&details.end_time, &listing.end_time);
            bout.time_format = details.time_format.clone();
            bout.referee = details.referee.clone();
            bout.fighter_1_result = merge_field(&details.fighter_1_result, &listing.fighter_1_result);
            bout.fighter_2_result = merge_field(&details.fighter_2_result, &listing.fighter_2_result);
            bout.kd_1 = merge_field(&details.kd_1, &listing.kd_1);
            bout.kd_2 = merge_field(&details.kd_2, &listing.kd_2);
            bout.sig_str_landed_1 = merge_field(&landed(&details.sig_str_1), &listing.str_1);
            bout.sig_str_landed_2 = merge_field(&landed(&details.sig_str_2), &listing.str_2);
            bout.sig_str_attempted_1 = attempted(&details.sig_str_1);
            bout.sig_str_attempted_2 = attempted(&details.sig_str_2);
            bout.td_landed_1 = merge_field(&landed(&details.td_1), &listing.td_1);
            bout.td_landed_2 = merge_field(&landed(&details.td_2), &listing.td_2);
            bout.td_attempted_1 = attempted(&details.td_1);
            bout.td_attempted_2 = attempted(&details.td_2);
            bout.ctrl_1 = details.ctrl_1.clone();
            bout.ctrl_2 = details.ctrl_2.clone();
        }
        bout
    }
}

fn landed(a: &Coerced<Attempts>) -> Coerced<i64> {
    a.as_ref().map(|a| a.landed)
}

fn attempted(a: &Coerced<Attempts>) -> Coerced<i64> {
    a.as_ref().map(|a| a.attempted)
}

/// Finish detail trailing the method; a method with no detail counts as missing
fn method_detail(method: &Coerced<MethodResult>) -> Coerced<String> {
    match method {
        Coerced::Valid(MethodResult {
            detail: Some(detail),
            ..
        }) => Coerced::Valid(detail.clone()),
        Coerced::Valid(_) | Coerced::Missing => Coerced::Missing,
        Coerced::Unparseable => Coerced::Unparseable,
    }
}

/// One row of `fact_bout`
#[derive(Debug, Clone, PartialEq)]
pub struct Bout {
    pub key: StableKey,
    pub fight_url: String,
    pub links: BoutLinks,
    pub has_details: bool,
    /// From the resolved event, else from the listing's event name
    pub is_ufc: bool,
    pub bout_class: Coerced<BoutClass>,
    pub method: Coerced<MethodResult>,
    pub method_detail: Coerced<String>,
    pub end_round: Coerced<i64>,
    pub end_time: Coerced<i64>,
    pub time_format: Coerced<String>,
    pub referee: Coerced<String>,
    pub fighter_1_result: Coerced<Outcome>,
    pub fighter_2_result: Coerced<Outcome>,
    pub kd_1: Coerced<i64>,
    pub kd_2: Coerced<i64>,
    pub sig_str_landed_1: Coerced<i64>,
    pub sig_str_attempted_1: Coerced<i64>,
    pub sig_str_landed_2: Coerced<i64>,
    pub sig_str_attempted_2: Coerced<i64>,
    pub td_landed_1: Coerced<i64>,
    pub td_attempted_1: Coerced<i64>,
    pub td_landed_2: Coerced<i64>,
    pub td_attempted_2: Coerced<i64>,
    pub sub_1: Coerced<i64>,
    pub sub_2: Coerced<i64>,
    pub ctrl_1: Coerced<i64>,
    pub ctrl_2: Coerced<i64>,
}

impl Bout {
    pub fn has_winner(&self) -> bool {
        self.fighter_1_result.value() == Some(&Outcome::Win)
            || self.fighter_2_result.value() == Some(&Outcome::Win)
    }

    pub fn is_female_bout(&self) -> bool {
        self.bout_class.value().is_some_and(|c| c.is_female)
    }

    /// Fighter keys whose reference resolved, in corner order
    pub fn resolved_fighters(&self) -> impl Iterator<Item = &StableKey> {
        [
            (&self.links.fighter_1_key, self.links.fighter_1_ref),
            (&self.links.fighter_2_key, self.links.fighter_2_ref),
        ]
        .into_iter()
        .filter(|(_, status)| status.is_resolved())
        .filter_map(|(key, _)| key.as_ref())
    }
}

impl Flagged for Bout {
    fn field_statuses(&self) -> Vec<(&'static str, FieldStatus)> {
        vec![
            ("weight_class", self.bout_class.status()),
            ("method", self.method.status()),
            ("method_detail", self.method_detail.status()),
            ("end_round", self.end_round.status()),
            ("end_time", self.end_time.status()),
            ("time_format", self.time_format.status()),
            ("referee", self.referee.status()),
            ("fighter_1_result", self.fighter_1_result.status()),
            ("fighter_2_result", self.fighter_2_result.status()),
            ("kd_1", self.kd_1.status()),
            ("kd_2", self.kd_2.status()),
            ("sig_str_landed_1", self.sig_str_landed_1.status()),
            ("sig_str_attempted_1", self.sig_str_attempted_1.status()),
            ("sig_str_landed_2", self.sig_str_landed_2.status()),
            ("sig_str_attempted_2", self.sig_str_attempted_2.status()),
            ("td_landed_1", self.td_landed_1.status()),
            ("td_attempted_1", self.td_attempted_1.status()),
            ("td_landed_2", self.td_landed_2.status()),
            ("td_attempted_2", self.td_attempted_2.status()),
            ("sub_1", self.sub_1.status()),
            ("sub_2", self.sub_2.status()),
            ("ctrl_1", self.ctrl_1.status()),
            ("ctrl_2", self.ctrl_2.status()),
        ]
    }
}

fn ref_status<T>(key: Option<&StableKey>, table: &BTreeMap<StableKey, T>) -> RefStatus {
    match key {
        None => RefStatus::Missing,
        Some(k) if table.contains_key(k) => RefStatus::Resolved,
        Some(_) => RefStatus::Orphan,
    }
}

/// Key registries shared with the fighter and event tables, so a URL seen
/// on a bout must map to the key its dimension row was given
pub(super) struct LinkRegistries<'r> {
    pub fighters: &'r mut KeyRegistry,
    pub events: &'r mut KeyRegistry,
}

/// Build the bout table from event-page listings, enriching with fight pages
pub(super) fn build(
    listings: &[StagedBoutListing],
    details: &[StagedFightDetails],
    registries: LinkRegistries<'_>,
    fighters: &BTreeMap<StableKey, Fighter>,
    events: &BTreeMap<StableKey, Event>,
) -> Result<EntityTable<Bout>> {
    let mut registry = KeyRegistry::new(EntityKind::Bout);
    let mut card_position: HashMap<Option<StableKey>, i64> = HashMap::new();
    let mut listed: BTreeMap<StableKey, (&StagedBoutListing, BoutLinks)> = BTreeMap::new();
    let mut duplicates = 0;

    for row in listings {
        let event_key = registries.events.derive(&row.event_url)?;
        let fighter_1_key = registries.fighters.derive(&row.fighter_1_url)?;
        let fighter_2_key = registries.fighters.derive(&row.fighter_2_url)?;

        let position = card_position.entry(event_key.clone()).or_insert(0);
        *position += 1;
        let ordinal = row.fight_order.value().copied().unwrap_or(*position);

        let key = match registry.derive(&row.fight_url)? {
            Some(key) => key,
            None => {
                let key = composite_bout_key(
                    event_key.as_ref(),
                    fighter_1_key.as_ref(),
                    fighter_2_key.as_ref(),
                    Some(ordinal),
                );
                registry.register(key.as_str(), &key)?;
                key
            },
        };

        let links = BoutLinks {
            event_ref: ref_status(event_key.as_ref(), events),
            fighter_1_ref: ref_status(fighter_1_key.as_ref(), fighters),
            fighter_2_ref: ref_status(fighter_2_key.as_ref(), fighters),
            event_key,
            fighter_1_key,
            fighter_2_key,
            ordinal,
        };
        for (name, status) in [
            ("event", links.event_ref),
            ("fighter_1", links.fighter_1_ref),
            ("fighter_2", links.fighter_2_ref),
        ] {
            if !status.is_resolved() {
                debug!("Bout {}: {} reference is {}", key, name, status);
            }
        }

        match listed.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert((row, links));
            },
            Entry::Occupied(slot) => {
                debug!("Duplicate bout listing for {}", slot.key());
                duplicates += 1;
            },
        }
    }

    let mut fight_pages: HashMap<StableKey, &StagedFightDetails> = HashMap::new();
    let mut unmatched = 0;
    for row in details {
        match registry.derive(&row.fight_url)? {
            Some(key) if listed.contains_key(&key) => {
                if fight_pages.contains_key(&key) {
                    debug!("Duplicate fight page for {}", key);
                    duplicates += 1;
                } else {
                    fight_pages.insert(key, row);
                }
            },
            other => {
                debug!("Fight page with no event listing: {:?}", other);
                unmatched += 1;
            },
        }
    }

    let rows = listed
        .into_iter()
        .map(|(key, (listing, links))| {
            let source = match fight_pages.get(&key) {
                Some(&details) => BoutSource::WithDetails { listing, details },
                None => BoutSource::ListingOnly(listing),
            };
            let mut bout = source.merge(key.clone(), links);
            let event = bout
                .links
                .event_key
                .as_ref()
                .filter(|_| bout.links.event_ref.is_resolved())
                .and_then(|k| events.get(k));
            if let Some(event) = event {
                bout.is_ufc = event.is_ufc;
            }
            (key, bout)
        })
        .collect();

    Ok(EntityTable {
        rows,
        registry,
        duplicates,
        unmatched,
        unkeyed: 0,
    })
}
