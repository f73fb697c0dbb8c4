//! Event entities: directory rows enriched with their event page

use chrono::NaiveDate;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

use ufcstats_common::Result;

use super::EntityTable;
use crate::coerce::{Coerced, Location};
use crate::completeness::{merge_field, FieldStatus, Flagged};
use crate::keys::{EntityKind, KeyRegistry, StableKey};
use crate::staged::{StagedBoutListing, StagedEventDirectory};

/// The pages one event was seen on
///
/// The event page has no row of its own; its header fields repeat on every
/// bout it lists, so the first listed bout stands in for it.
#[derive(Debug, Clone, Copy)]
pub enum EventSource<'a> {
    DirectoryOnly(&'a StagedEventDirectory),
    WithListing {
        directory: &'a StagedEventDirectory,
        listing: &'a StagedBoutListing,
    },
}

impl<'a> EventSource<'a> {
    pub fn directory(&self) -> &'a StagedEventDirectory {
        match self {
            EventSource::DirectoryOnly(directory) => directory,
            EventSource::WithListing { directory, .. } => directory,
        }
    }

    pub fn merge(&self, key: StableKey) -> Event {
        let directory = self.directory();
        let (event_name, event_date, location) = match self {
            EventSource::DirectoryOnly(_) => (
                directory.event_name.clone(),
                directory.event_date.clone(),
                directory.location.clone(),
            ),
            EventSource::WithListing { listing, .. } => (
                merge_field(&listing.event_name, &directory.event_name),
                merge_field(&listing.event_date, &directory.event_date),
                merge_field(&listing.event_location, &directory.location),
            ),
        };

        let is_ufc = event_name.value().is_some_and(|name| is_ufc_event(name));
        Event {
            key,
            event_url: directory.event_url.clone(),
            event_name,
            event_date,
            location,
            is_ufc,
            bout_keys: Vec::new(),
        }
    }
}

/// UFC-branded cards, as opposed to the other promotions UFCStats lists
pub fn is_ufc_event(name: &str) -> bool {
    let upper = name.to_uppercase();
    upper.starts_with("UFC ") || upper.contains("UFC FIGHT NIGHT")
}

/// One row of `dim_event`
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub key: StableKey,
    pub event_url: String,
    pub event_name: Coerced<String>,
    pub event_date: Coerced<NaiveDate>,
    pub location: Coerced<Location>,
    pub is_ufc: bool,
    /// Resolved bouts in card order
    pub bout_keys: Vec<StableKey>,
}

impl Event {
    pub fn bout_count(&self) -> usize {
        self.bout_keys.len()
    }
}

impl Flagged for Event {
    fn field_statuses(&self) -> Vec<(&'static str, FieldStatus)> {
        vec![
            ("event_name", self.event_name.status()),
            ("event_date", self.event_date.status()),
            ("event_location", self.location.status()),
        ]
    }
}

/// Build the event table from the directory, enriching with listing headers
pub(super) fn build(
    directory: &[StagedEventDirectory],
    listings: &[StagedBoutListing],
) -> Result<EntityTable<Event>> {
    let mut registry = KeyRegistry::new(EntityKind::Event);
    let mut listed: BTreeMap<StableKey, &StagedEventDirectory> = BTreeMap::new();
    let mut duplicates = 0;
    let mut unkeyed = 0;

    for row in directory {
        let Some(key) = registry.derive(&row.event_url)? else {
            warn!("Event directory row without a URL: {:?}", row.event_name.value());
            unkeyed += 1;
            continue;
        };
        match listed.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(row);
            },
            Entry::Occupied(slot) => {
                debug!("Duplicate event directory row for {}", slot.key());
                duplicates += 1;
            },
        }
    }

    let mut first_listing: HashMap<StableKey, &StagedBoutListing> = HashMap::new();
    let mut unlisted: HashSet<StableKey> = HashSet::new();
    for row in listings {
        let Some(key) = registry.derive(&row.event_url)? else {
            continue;
        };
        if listed.contains_key(&key) {
            first_listing.entry(key).or_insert(row);
        } else if unlisted.insert(key.clone()) {
            debug!("Event page {} has no directory row", key);
        }
    }

    let rows = listed
        .into_iter()
        .map(|(key, directory)| {
            let source = match first_listing.get(&key) {
                Some(&listing) => EventSource::WithListing { directory, listing },
                None => EventSource::DirectoryOnly(directory),
            };
            (key.clone(), source.merge(key))
        })
        .collect();

    Ok(EntityTable {
        rows,
        registry,
        duplicates,
        unmatched: unlisted.len(),
        unkeyed,
    })
}
