//! Raw row shapes, one per extracted page type
//!
//! Every field is the string exactly as the extractor wrote it. Optional
//! columns default to the empty string, which coerces to missing.

use serde::Deserialize;

use super::PageKind;

/// A row of one raw page table
pub trait RawRow {
    const PAGE: PageKind;

    /// Run date the extractor stamped on the row
    fn snapshot(&self) -> &str;
}

/// `event_directory`: one row per event in the completed-events list
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EventDirectoryRow {
    pub event_url: String,
    pub event_name: String,
    pub event_date_raw: String,
    pub event_location_raw: String,
    pub snapshot: String,
}

/// `event_details`: one row per bout listed on an event page
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EventDetailsRow {
    #[serde(alias = "bout_url")]
    pub fight_url: String,
    pub event_url: String,
    pub event_name: String,
    pub fighter_1_url: String,
    pub fighter_2_url: String,
    #[serde(alias = "bout_order")]
    pub fight_order: String,
    pub snapshot: String,

    pub event_date_raw: String,
    pub event_location_raw: String,
    pub fighter_1_name: String,
    pub fighter_2_name: String,
    pub fighter_1_result: String,
    pub fighter_2_result: String,
    pub kd_1: String,
    pub kd_2: String,
    pub str_1: String,
    pub str_2: String,
    pub td_1: String,
    pub td_2: String,
    pub sub_1: String,
    pub sub_2: String,
    pub weight_class_raw: String,
    pub method_raw: String,
    pub round_raw: String,
    pub time_raw: String,
}

/// `fight_details`: one row per fight page
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FightDetailsRow {
    #[serde(alias = "bout_url")]
    pub fight_url: String,
    pub event_url: String,
    pub fighter_1_url: String,
    pub fighter_2_url: String,
    pub weight_class_raw: String,
    pub method_raw: String,
    pub round_raw: String,
    pub time_raw: String,
    pub snapshot: String,

    pub time_format_raw: String,
    pub referee_raw: String,
    pub details_raw: String,
    pub fighter_1_result: String,
    pub fighter_2_result: String,
    pub kd_1: String,
    pub kd_2: String,
    pub sig_str_1: String,
    pub sig_str_2: String,
    pub td_1: String,
    pub td_2: String,
    pub ctrl_1: String,
    pub ctrl_2: String,
}

/// `fighter_directory`: one row per fighter in the A-Z listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FighterDirectoryRow {
    pub fighter_url: String,
    pub fighter_name: String,
    pub height_raw: String,
    pub weight_raw: String,
    pub reach_raw: String,
    pub snapshot: String,

    pub first_name: String,
    pub last_name: String,
    pub nickname_raw: String,
    pub stance_raw: String,
    pub w_raw: String,
    pub l_raw: String,
    pub d_raw: String,
    pub belt_raw: String,
}

/// `fighter_details`: one row per fighter profile page
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FighterDetailsRow {
    pub fighter_url: String,
    pub first_name: String,
    pub last_name: String,
    pub dob_raw: String,
    pub slpm: String,
    pub str_acc: String,
    pub sapm: String,
    pub str_def: String,
    pub td_avg: String,
    pub td_acc: String,
    pub td_def: String,
    pub sub_avg: String,
    pub snapshot: String,
}

macro_rules! raw_row {
    ($row:ty, $page:expr) => {
        impl RawRow for $row {
            const PAGE: PageKind = $page;

            fn snapshot(&self) -> &str {
                &self.snapshot
            }
        }
    };
}

raw_row!(EventDirectoryRow, PageKind::EventDirectory);
raw_row!(EventDetailsRow, PageKind::EventDetails);
raw_row!(FightDetailsRow, PageKind::FightDetails);
raw_row!(FighterDirectoryRow, PageKind::FighterDirectory);
raw_row!(FighterDetailsRow, PageKind::FighterDetails);
