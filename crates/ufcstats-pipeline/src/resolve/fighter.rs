//! Fighter entities: directory rows enriched with profile pages

use chrono::NaiveDate;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use ufcstats_common::Result;

use super::EntityTable;
use crate::coerce::Coerced;
use crate::completeness::{merge_field, FieldStatus, Flagged};
use crate::keys::{EntityKind, KeyRegistry, StableKey};
use crate::staged::{StagedFighterDetails, StagedFighterDirectory};

/// The pages one fighter was seen on
#[derive(Debug, Clone, Copy)]
pub enum FighterSource<'a> {
    DirectoryOnly(&'a StagedFighterDirectory),
    WithDetail {
        directory: &'a StagedFighterDirectory,
        detail: &'a StagedFighterDetails,
    },
}

impl<'a> FighterSource<'a> {
    pub fn directory(&self) -> &'a StagedFighterDirectory {
        match self {
            FighterSource::DirectoryOnly(directory) => directory,
            FighterSource::WithDetail { directory, .. } => directory,
        }
    }

    /// Merge into one fighter row; a valid profile value beats the listing
    pub fn merge(&self, key: StableKey) -> Fighter {
        let directory = self.directory();
        let mut fighter = Fighter {
            key,
            fighter_url: directory.fighter_url.clone(),
            has_details: false,
            fighter_name: directory.fighter_name.clone(),
            first_name: directory.first_name.clone(),
            last_name: directory.last_name.clone(),
            nickname: directory.nickname.clone(),
            stance: directory.stance.clone(),
            height: directory.height.clone(),
            weight: directory.weight.clone(),
            reach: directory.reach.clone(),
            wins: directory.wins.clone(),
            losses: directory.losses.clone(),
            draws: directory.draws.clone(),
            dob: Coerced::Missing,
            slpm: Coerced::Missing,
            str_acc: Coerced::Missing,
            sapm: Coerced::Missing,
            str_def: Coerced::Missing,
            td_avg: Coerced::Missing,
            td_acc: Coerced::Missing,
            td_def: Coerced::Missing,
            sub_avg: Coerced::Missing,
            bout_count: 0,
            is_ufc_fighter: false,
            is_female: false,
        };

        if let FighterSource::WithDetail { detail, .. } = self {
            fighter.has_details = true;
            fighter.first_name = merge_field(&detail.first_name, &directory.first_name);
            fighter.last_name = merge_field(&detail.last_name, &directory.last_name);
            fighter.dob = detail.dob.clone();
            fighter.slpm = detail.slpm.clone();
            fighter.str_acc = detail.str_acc.clone();
            fighter.sapm = detail.sapm.clone();
            fighter.str_def = detail.str_def.clone();
            fighter.td_avg = detail.td_avg.clone();
            fighter.td_acc = detail.td_acc.clone();
            fighter.td_def = detail.td_def.clone();
            fighter.sub_avg = detail.sub_avg.clone();
        }
        fighter
    }
}

/// One row of `dim_fighter`
#[derive(Debug, Clone, PartialEq)]
pub struct Fighter {
    pub key: StableKey,
    pub fighter_url: String,
    pub has_details: bool,
    pub fighter_name: Coerced<String>,
    pub first_name: Coerced<String>,
    pub last_name: Coerced<String>,
    pub nickname: Coerced<String>,
    pub stance: Coerced<String>,
    pub height: Coerced<i64>,
    pub weight: Coerced<i64>,
    pub reach: Coerced<f64>,
    pub dob: Coerced<NaiveDate>,
    pub wins: Coerced<i64>,
    pub losses: Coerced<i64>,
    pub draws: Coerced<i64>,
    pub slpm: Coerced<f64>,
    pub str_acc: Coerced<f64>,
    pub sapm: Coerced<f64>,
    pub str_def: Coerced<f64>,
    pub td_avg: Coerced<f64>,
    pub td_acc: Coerced<f64>,
    pub td_def: Coerced<f64>,
    pub sub_avg: Coerced<f64>,

    // filled in from resolved bouts
    pub bout_count: usize,
    pub is_ufc_fighter: bool,
    pub is_female: bool,
}

impl Flagged for Fighter {
    /// Profile fields are only flagged when a profile page was scraped;
    /// `has_details` covers the rest
    fn field_statuses(&self) -> Vec<(&'static str, FieldStatus)> {
        let mut statuses = vec![
            ("fighter_name", self.fighter_name.status()),
            ("first_name", self.first_name.status()),
            ("last_name", self.last_name.status()),
            ("nickname", self.nickname.status()),
            ("stance", self.stance.status()),
            ("height", self.height.status()),
            ("weight", self.weight.status()),
            ("reach", self.reach.status()),
            ("wins", self.wins.status()),
            ("losses", self.losses.status()),
            ("draws", self.draws.status()),
        ];
        if self.has_details {
            statuses.extend([
                ("dob", self.dob.status()),
                ("slpm", self.slpm.status()),
                ("str_acc", self.str_acc.status()),
                ("sapm", self.sapm.status()),
                ("str_def", self.str_def.status()),
                ("td_avg", self.td_avg.status()),
                ("td_acc", self.td_acc.status()),
                ("td_def", self.td_def.status()),
                ("sub_avg", self.sub_avg.status()),
            ]);
        }
        statuses
    }
}

/// Build the fighter table from the directory, enriching with profiles
///
/// The directory enumerates the population: a profile row whose fighter is
/// not listed is counted as unmatched and dropped.
pub(super) fn build(
    directory: &[StagedFighterDirectory],
    details: &[StagedFighterDetails],
) -> Result<EntityTable<Fighter>> {
    let mut registry = KeyRegistry::new(EntityKind::Fighter);
    let mut listed: BTreeMap<StableKey, &StagedFighterDirectory> = BTreeMap::new();
    let mut duplicates = 0;
    let mut unkeyed = 0;

    for row in directory {
        let Some(key) = registry.derive(&row.fighter_url)? else {
            warn!("Fighter directory row without a URL: {:?}", row.fighter_name.value());
            unkeyed += 1;
            continue;
        };
        match listed.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(row);
            },
            Entry::Occupied(slot) => {
                debug!("Duplicate fighter directory row for {}", slot.key());
                duplicates += 1;
            },
        }
    }

    let mut profiles: HashMap<StableKey, &StagedFighterDetails> = HashMap::new();
    let mut unmatched = 0;
    for row in details {
        match registry.derive(&row.fighter_url)? {
            Some(key) if listed.contains_key(&key) => {
                if profiles.contains_key(&key) {
                    debug!("Duplicate fighter profile for {}", key);
                    duplicates += 1;
                } else {
                    profiles.insert(key, row);
                }
            },
            other => {
                debug!("Fighter profile with no directory row: {:?}", other);
                unmatched += 1;
            },
        }
    }

    let rows = listed
        .into_iter()
        .map(|(key, directory)| {
            let source = match profiles.get(&key) {
                Some(&detail) => FighterSource::WithDetail { directory, detail },
                None => FighterSource::DirectoryOnly(directory),
            };
            (key.clone(), source.merge(key))
        })
        .collect();

    Ok(EntityTable {
        rows,
        registry,
        duplicates,
        unmatched,
        unkeyed,
    })
}
