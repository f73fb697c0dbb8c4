//! Typed staged rows
//!
//! Same grain as the raw rows they come from. URL columns stay raw strings;
//! they are the row's source identity and are only turned into keys during
//! resolution.

use chrono::NaiveDate;

use crate::coerce::{
    coerce_attempts, coerce_date, coerce_decimal, coerce_duration, coerce_height, coerce_integer,
    coerce_percentage, coerce_reach, coerce_text, coerce_weight, domain::coerce_bout_class,
    domain::coerce_location, domain::coerce_method, domain::coerce_outcome, Attempts, BoutClass,
    Coerced, DateFormat, Location, MethodResult, Outcome,
};
use crate::completeness::{FieldStatus, Flagged};
use crate::raw::{
    EventDetailsRow, EventDirectoryRow, FightDetailsRow, FighterDetailsRow, FighterDirectoryRow,
    RawRow,
};
use crate::table::RecordBuilder;

/// A staged row and how it is built from its raw counterpart
pub trait StagedRow: Flagged + Default + Send + Sized {
    type Raw: RawRow + Sync;

    fn stage(raw: &Self::Raw) -> Self;

    /// Append this row's columns, typed fields followed by their status
    fn write_record(&self, rec: &mut RecordBuilder);
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagedEventDirectory {
    pub event_url: String,
    pub event_name: Coerced<String>,
    pub event_date: Coerced<NaiveDate>,
    pub location: Coerced<Location>,
    pub snapshot: String,
}

impl StagedRow for StagedEventDirectory {
    type Raw = EventDirectoryRow;

    fn stage(raw: &EventDirectoryRow) -> Self {
        Self {
            event_url: raw.event_url.clone(),
            event_name: coerce_text(&raw.event_name),
            event_date: coerce_date(&raw.event_date_raw, DateFormat::Long),
            location: coerce_location(&raw.event_location_raw),
            snapshot: raw.snapshot.clone(),
        }
    }

    fn write_record(&self, rec: &mut RecordBuilder) {
        rec.text("event_url", &self.event_url)
            .field("event_name", &self.event_name)
            .field("event_date", &self.event_date)
            .field("event_location", &self.location)
            .text("snapshot", &self.snapshot);
    }
}

impl Flagged for StagedEventDirectory {
    fn field_statuses(&self) -> Vec<(&'static str, FieldStatus)> {
        vec![
            ("event_name", self.event_name.status()),
            ("event_date", self.event_date.status()),
            ("event_location", self.location.status()),
        ]
    }
}

/// One bout as listed on an event page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagedBoutListing {
    pub fight_url: String,
    pub event_url: String,
    pub fighter_1_url: String,
    pub fighter_2_url: String,
    pub event_name: Coerced<String>,
    pub fight_order: Coerced<i64>,
    pub event_date: Coerced<NaiveDate>,
    pub event_location: Coerced<Location>,
    pub fighter_1_name: Coerced<String>,
    pub fighter_2_name: Coerced<String>,
    pub fighter_1_result: Coerced<Outcome>,
    pub fighter_2_result: Coerced<Outcome>,
    pub kd_1: Coerced<i64>,
    pub kd_2: Coerced<i64>,
    pub str_1: Coerced<i64>,
    pub str_2: Coerced<i64>,
    pub td_1: Coerced<i64>,
    pub td_2: Coerced<i64>,
    pub sub_1: Coerced<i64>,
    pub sub_2: Coerced<i64>,
    pub bout_class: Coerced<BoutClass>,
    pub method: Coerced<MethodResult>,
    pub end_round: Coerced<i64>,
    pub end_time: Coerced<i64>,
    pub snapshot: String,
}

impl StagedRow for StagedBoutListing {
    type Raw = EventDetailsRow;

    fn stage(raw: &EventDetailsRow) -> Self {
        Self {
            fight_url: raw.fight_url.clone(),
            event_url: raw.event_url.clone(),
            fighter_1_url: raw.fighter_1_url.clone(),
            fighter_2_url: raw.fighter_2_url.clone(),
            event_name: coerce_text(&raw.event_name),
            fight_order: coerce_integer(&raw.fight_order),
            event_date: coerce_date(&raw.event_date_raw, DateFormat::Long),
            event_location: coerce_location(&raw.event_location_raw),
            fighter_1_name: coerce_text(&raw.fighter_1_name),
            fighter_2_name: coerce_text(&raw.fighter_2_name),
            fighter_1_result: coerce_outcome(&raw.fighter_1_result),
            fighter_2_result: coerce_outcome(&raw.fighter_2_result),
            kd_1: coerce_integer(&raw.kd_1),
            kd_2: coerce_integer(&raw.kd_2),
            str_1: coerce_integer(&raw.str_1),
            str_2: coerce_integer(&raw.str_2),
            td_1: coerce_integer(&raw.td_1),
            td_2: coerce_integer(&raw.td_2),
            sub_1: coerce_integer(&raw.sub_1),
            sub_2: coerce_integer(&raw.sub_2),
            bout_class: coerce_bout_class(&raw.weight_class_raw),
            method: coerce_method(&raw.method_raw),
            end_round: coerce_integer(&raw.round_raw),
            end_time: coerce_duration(&raw.time_raw),
            snapshot: raw.snapshot.clone(),
        }
    }

    fn write_record(&self, rec: &mut RecordBuilder) {
        rec.text("fight_url", &self.fight_url)
            .text("event_url", &self.event_url)
            .text("fighter_1_url", &self.fighter_1_url)
            .text("fighter_2_url", &self.fighter_2_url)
            .field("event_name", &self.event_name)
            .field("fight_order", &self.fight_order)
            .field("event_date", &self.event_date)
            .field("event_location", &self.event_location)
            .field("fighter_1_name", &self.fighter_1_name)
            .field("fighter_2_name", &self.fighter_2_name)
            .field("fighter_1_result", &self.fighter_1_result)
            .field("fighter_2_result", &self.fighter_2_result)
            .field("kd_1", &self.kd_1)
            .field("kd_2", &self.kd_2)
            .field("str_1", &self.str_1)
            .field("str_2", &self.str_2)
            .field("td_1", &self.td_1)
            .field("td_2", &self.td_2)
            .field("sub_1", &self.sub_1)
            .field("sub_2", &self.sub_2);
        write_bout_class(rec, &self.bout_class);
        write_method(rec, &self.method);
        rec.field("end_round", &self.end_round)
            .field("end_time_sec", &self.end_time)
            .text("snapshot", &self.snapshot);
    }
}

impl Flagged for StagedBoutListing {
    fn field_statuses(&self) -> Vec<(&'static str, FieldStatus)> {
        vec![
            ("event_name", self.event_name.status()),
            ("fight_order", self.fight_order.status()),
            ("event_date", self.event_date.status()),
            ("event_location", self.event_location.status()),
            ("fighter_1_name", self.fighter_1_name.status()),
            ("fighter_2_name", self.fighter_2_name.status()),
            ("fighter_1_result", self.fighter_1_result.status()),
            ("fighter_2_result", self.fighter_2_result.status()),
            ("kd_1", self.kd_1.status()),
            ("kd_2", self.kd_2.status()),
            ("str_1", self.str_1.status()),
            ("str_2", self.str_2.status()),
            ("td_1", self.td_1.status()),
            ("td_2", self.td_2.status()),
            ("sub_1", self.sub_1.status()),
            ("sub_2", self.sub_2.status()),
            ("weight_class", self.bout_class.status()),
            ("method", self.method.status()),
            ("end_round", self.end_round.status()),
            ("end_time", self.end_time.status()),
        ]
    }
}

/// One fight page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagedFightDetails {
    pub fight_url: String,
    pub event_url: String,
    pub fighter_1_url: String,
    pub fighter_2_url: String,
    pub bout_class: Coerced<BoutClass>,
    pub method: Coerced<MethodResult>,
    pub end_round: Coerced<i64>,
    pub end_time: Coerced<i64>,
    pub time_format: Coerced<String>,
    pub referee: Coerced<String>,
    pub details: Coerced<String>,
    pub fighter_1_result: Coerced<Outcome>,
    pub fighter_2_result: Coerced<Outcome>,
    pub kd_1: Coerced<i64>,
    pub kd_2: Coerced<i64>,
    pub sig_str_1: Coerced<Attempts>,
    pub sig_str_2: Coerced<Attempts>,
    pub td_1: Coerced<Attempts>,
    pub td_2: Coerced<Attempts>,
    pub ctrl_1: Coerced<i64>,
    pub ctrl_2: Coerced<i64>,
    pub snapshot: String,
}

impl StagedRow for StagedFightDetails {
    type Raw = FightDetailsRow;

    fn stage(raw: &FightDetailsRow) -> Self {
        Self {
            fight_url: raw.fight_url.clone(),
            event_url: raw.event_url.clone(),
            fighter_1_url: raw.fighter_1_url.clone(),
            fighter_2_url: raw.fighter_2_url.clone(),
            bout_class: coerce_bout_class(&raw.weight_class_raw),
            method: coerce_method(&raw.method_raw),
            end_round: coerce_integer(&raw.round_raw),
            end_time: coerce_duration(&raw.time_raw),
            time_format: coerce_text(&raw.time_format_raw),
            referee: coerce_text(&raw.referee_raw),
            details: coerce_text(&raw.details_raw),
            fighter_1_result: coerce_outcome(&raw.fighter_1_result),
            fighter_2_result: coerce_outcome(&raw.fighter_2_result),
            kd_1: coerce_integer(&raw.kd_1),
            kd_2: coerce_integer(&raw.kd_2),
            sig_str_1: coerce_attempts(&raw.sig_str_1),
            sig_str_2: coerce_attempts(&raw.sig_str_2),
            td_1: coerce_attempts(&raw.td_1),
            td_2: coerce_attempts(&raw.td_2),
            ctrl_1: coerce_duration(&raw.ctrl_1),
            ctrl_2: coerce_duration(&raw.ctrl_2),
            snapshot: raw.snapshot.clone(),
        }
    }

    fn write_record(&self, rec: &mut RecordBuilder) {
        rec.text("fight_url", &self.fight_url)
            .text("event_url", &self.event_url)
            .text("fighter_1_url", &self.fighter_1_url)
            .text("fighter_2_url", &self.fighter_2_url);
        write_bout_class(rec, &self.bout_class);
        write_method(rec, &self.method);
        rec.field("end_round", &self.end_round)
            .field("end_time_sec", &self.end_time)
            .field("time_format", &self.time_format)
            .field("referee", &self.referee)
            .field("details", &self.details)
            .field("fighter_1_result", &self.fighter_1_result)
            .field("fighter_2_result", &self.fighter_2_result)
            .field("kd_1", &self.kd_1)
            .field("kd_2", &self.kd_2)
            .field("sig_str_1", &self.sig_str_1)
            .field("sig_str_2", &self.sig_str_2)
            .field("td_1", &self.td_1)
            .field("td_2", &self.td_2)
            .field("ctrl_sec_1", &self.ctrl_1)
            .field("ctrl_sec_2", &self.ctrl_2)
            .text("snapshot", &self.snapshot);
    }
}

impl Flagged for StagedFightDetails {
    fn field_statuses(&self) -> Vec<(&'static str, FieldStatus)> {
        vec![
            ("weight_class", self.bout_class.status()),
            ("method", self.method.status()),
            ("end_round", self.end_round.status()),
            ("end_time", self.end_time.status()),
            ("time_format", self.time_format.status()),
            ("referee", self.referee.status()),
            ("details", self.details.status()),
            ("fighter_1_result", self.fighter_1_result.status()),
            ("fighter_2_result", self.fighter_2_result.status()),
            ("kd_1", self.kd_1.status()),
            ("kd_2", self.kd_2.status()),
            ("sig_str_1", self.sig_str_1.status()),
            ("sig_str_2", self.sig_str_2.status()),
            ("td_1", self.td_1.status()),
            ("td_2", self.td_2.status()),
            ("ctrl_1", self.ctrl_1.status()),
            ("ctrl_2", self.ctrl_2.status()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagedFighterDirectory {
    pub fighter_url: String,
    pub fighter_name: Coerced<String>,
    pub first_name: Coerced<String>,
    pub last_name: Coerced<String>,
    pub nickname: Coerced<String>,
    pub stance: Coerced<String>,
    pub height: Coerced<i64>,
    pub weight: Coerced<i64>,
    pub reach: Coerced<f64>,
    pub wins: Coerced<i64>,
    pub losses: Coerced<i64>,
    pub draws: Coerced<i64>,
    pub belt: Coerced<String>,
    pub snapshot: String,
}

impl StagedRow for StagedFighterDirectory {
    type Raw = FighterDirectoryRow;

    fn stage(raw: &FighterDirectoryRow) -> Self {
        Self {
            fighter_url: raw.fighter_url.clone(),
            fighter_name: coerce_text(&raw.fighter_name),
            first_name: coerce_text(&raw.first_name),
            last_name: coerce_text(&raw.last_name),
            nickname: coerce_text(&raw.nickname_raw),
            stance: coerce_text(&raw.stance_raw),
            height: coerce_height(&raw.height_raw),
            weight: coerce_weight(&raw.weight_raw),
            reach: coerce_reach(&raw.reach_raw),
            wins: coerce_integer(&raw.w_raw),
            losses: coerce_integer(&raw.l_raw),
            draws: coerce_integer(&raw.d_raw),
            belt: coerce_text(&raw.belt_raw),
            snapshot: raw.snapshot.clone(),
        }
    }

    fn write_record(&self, rec: &mut RecordBuilder) {
        rec.text("fighter_url", &self.fighter_url)
            .field("fighter_name", &self.fighter_name)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("nickname", &self.nickname)
            .field("stance", &self.stance)
            .field("height_in", &self.height)
            .field("weight_lb", &self.weight)
            .field("reach_in", &self.reach)
            .field("wins", &self.wins)
            .field("losses", &self.losses)
            .field("draws", &self.draws)
            .field("belt", &self.belt)
            .text("snapshot", &self.snapshot);
    }
}

impl Flagged for StagedFighterDirectory {
    fn field_statuses(&self) -> Vec<(&'static str, FieldStatus)> {
        vec![
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
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagedFighterDetails {
    pub fighter_url: String,
    pub first_name: Coerced<String>,
    pub last_name: Coerced<String>,
    pub dob: Coerced<NaiveDate>,
    pub slpm: Coerced<f64>,
    pub str_acc: Coerced<f64>,
    pub sapm: Coerced<f64>,
    pub str_def: Coerced<f64>,
    pub td_avg: Coerced<f64>,
    pub td_acc: Coerced<f64>,
    pub td_def: Coerced<f64>,
    pub sub_avg: Coerced<f64>,
    pub snapshot: String,
}

impl StagedRow for StagedFighterDetails {
    type Raw = FighterDetailsRow;

    fn stage(raw: &FighterDetailsRow) -> Self {
        Self {
            fighter_url: raw.fighter_url.clone(),
            first_name: coerce_text(&raw.first_name),
            last_name: coerce_text(&raw.last_name),
            dob: coerce_date(&raw.dob_raw, DateFormat::Short),
            slpm: coerce_decimal(&raw.slpm),
            str_acc: coerce_percentage(&raw.str_acc),
            sapm: coerce_decimal(&raw.sapm),
            str_def: coerce_percentage(&raw.str_def),
            td_avg: coerce_decimal(&raw.td_avg),
            td_acc: coerce_percentage(&raw.td_acc),
            td_def: coerce_percentage(&raw.td_def),
            sub_avg: coerce_decimal(&raw.sub_avg),
            snapshot: raw.snapshot.clone(),
        }
    }

    fn write_record(&self, rec: &mut RecordBuilder) {
        rec.text("fighter_url", &self.fighter_url)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("dob", &self.dob)
            .field("slpm", &self.slpm)
            .field("str_acc", &self.str_acc)
            .field("sapm", &self.sapm)
            .field("str_def", &self.str_def)
            .field("td_avg", &self.td_avg)
            .field("td_acc", &self.td_acc)
            .field("td_def", &self.td_def)
            .field("sub_avg", &self.sub_avg)
            .text("snapshot", &self.snapshot);
    }
}

impl Flagged for StagedFighterDetails {
    fn field_statuses(&self) -> Vec<(&'static str, FieldStatus)> {
        vec![
            ("first_name", self.first_name.status()),
            ("last_name", self.last_name.status()),
            ("dob", self.dob.status()),
            ("slpm", self.slpm.status()),
            ("str_acc", self.str_acc.status()),
            ("sapm", self.sapm.status()),
            ("str_def", self.str_def.status()),
            ("td_avg", self.td_avg.status()),
            ("td_acc", self.td_acc.status()),
            ("td_def", self.td_def.status()),
            ("sub_avg", self.sub_avg.status()),
        ]
    }
}

/// Weight class and its two flags share the source cell, and its status
fn write_bout_class(rec: &mut RecordBuilder, class: &Coerced<BoutClass>) {
    rec.field("weight_class", &class.as_ref().map(|c| c.weight_class))
        .field("is_title_bout", &class.as_ref().map(|c| c.is_title))
        .field("is_female_bout", &class.as_ref().map(|c| c.is_female));
}

fn write_method(rec: &mut RecordBuilder, method: &Coerced<MethodResult>) {
    rec.field("method", &method.as_ref().map(|m| m.method))
        .field(
            "method_detail",
            &method
                .as_ref()
                .map(|m| m.detail.clone().unwrap_or_default()),
        );
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::coerce::{Method, WeightClass};

    #[test]
    fn test_fighter_directory_scenarios() {
        let raw = FighterDirectoryRow {
            fighter_url: "http://ufcstats.com/fighter-details/a".to_string(),
            fighter_name: "Jon Jones".to_string(),
            height_raw: "6' 1\"".to_string(),
            weight_raw: "205 lbs.".to_string(),
            reach_raw: "".to_string(),
            ..Default::default()
        };
        let staged = StagedFighterDirectory::stage(&raw);

        assert_eq!(staged.fighter_url, raw.fighter_url);
        assert_eq!(staged.height, Coerced::Valid(73));
        assert_eq!(staged.height.status(), FieldStatus::Valid);
        assert_eq!(staged.reach, Coerced::Missing);

        let flags = staged.completeness();
        assert_eq!(flags.status("height"), FieldStatus::Valid);
        assert_eq!(flags.status("reach"), FieldStatus::Missing);
    }

    #[test]
    fn test_fighter_details_percentages() {
        let raw = FighterDetailsRow {
            fighter_url: "u".to_string(),
            str_acc: "54%".to_string(),
            td_def: "n/a".to_string(),
            dob_raw: "Jul 13, 1978".to_string(),
            ..Default::default()
        };
        let staged = StagedFighterDetails::stage(&raw);
        assert_eq!(staged.str_acc, Coerced::Valid(0.54));
        assert_eq!(staged.td_def, Coerced::Unparseable);
        assert_eq!(
            staged.dob,
            Coerced::Valid(NaiveDate::from_ymd_opt(1978, 7, 13).unwrap())
        );
        assert_eq!(staged.completeness().status("td_def"), FieldStatus::Unparseable);
    }

    #[test]
    fn test_bout_listing_time_and_class() {
        let raw = EventDetailsRow {
            fight_url: "f".to_string(),
            time_raw: "3:42".to_string(),
            weight_class_raw: "Women's Strawweight".to_string(),
            method_raw: "KO/TKO Punches".to_string(),
            ..Default::default()
        };
        let staged = StagedBoutListing::stage(&raw);
        assert_eq!(staged.end_time, Coerced::Valid(222));
        let class = staged.bout_class.value().unwrap();
        assert_eq!(class.weight_class, WeightClass::Strawweight);
        assert!(class.is_female);
        assert_eq!(staged.method.value().unwrap().method, Method::KoTko);
    }

    #[test]
    fn test_staged_record_has_status_columns() {
        let staged = StagedEventDirectory::stage(&EventDirectoryRow {
            event_url: "e".to_string(),
            event_name: "UFC 300".to_string(),
            event_date_raw: "April 13, 2024".to_string(),
            event_location_raw: "--".to_string(),
            snapshot: "2026-01-24".to_string(),
        });
        let mut rec = RecordBuilder::new();
        staged.write_record(&mut rec);

        assert_eq!(
            rec.columns(),
            [
                "event_url",
                "event_name",
                "event_name_status",
                "event_date",
                "event_date_status",
                "event_location",
                "event_location_status",
                "snapshot"
            ]
        );
        assert_eq!(
            rec.into_values(),
            ["e", "UFC 300", "valid", "2024-04-13", "valid", "", "missing", "2026-01-24"]
        );
    }
}
