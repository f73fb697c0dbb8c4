//! Row renderers for the published tables

use ufcstats_common::Result;

use super::schema::TableSchema;
use crate::completeness::Flagged;
use crate::keys::StableKey;
use crate::resolve::{Bout, Event, Fighter};
use crate::table::RecordBuilder;

/// One published table, serialized and validated, not yet on disk
#[derive(Debug)]
pub struct RenderedTable {
    pub schema: &'static TableSchema,
    pub rows: usize,
    pub bytes: Vec<u8>,
}

/// Render rows in the order given, checking each against `schema`
pub fn render<'a, T, I, F>(
    schema: &'static TableSchema,
    rows: I,
    run_date: &str,
    record: F,
) -> Result<RenderedTable>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T, &str) -> RecordBuilder,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(schema.header())?;

    let mut count = 0;
    for row in rows {
        let rec = record(row, run_date);
        schema.validate_header(rec.columns())?;
        let values = rec.into_values();
        count += 1;
        schema.validate_row(count, &values)?;
        writer.write_record(&values)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(RenderedTable {
        schema,
        rows: count,
        bytes,
    })
}

pub fn fighter_record(f: &Fighter, run_date: &str) -> RecordBuilder {
    let mut rec = RecordBuilder::new();
    rec.value("stable_fighter_key", Some(&f.key))
        .text("fighter_url", &f.fighter_url)
        .value("fighter_name", f.fighter_name.value())
        .value("first_name", f.first_name.value())
        .value("last_name", f.last_name.value())
        .value("nickname", f.nickname.value())
        .value("stance", f.stance.value())
        .value("height_in", f.height.value())
        .value("weight_lb", f.weight.value())
        .value("reach_in", f.reach.value())
        .value("dob", f.dob.value())
        .value("wins", f.wins.value())
        .value("losses", f.losses.value())
        .value("draws", f.draws.value())
        .value("slpm", f.slpm.value())
        .value("str_acc", f.str_acc.value())
        .value("sapm", f.sapm.value())
        .value("str_def", f.str_def.value())
        .value("td_avg", f.td_avg.value())
        .value("td_acc", f.td_acc.value())
        .value("td_def", f.td_def.value())
        .value("sub_avg", f.sub_avg.value())
        .value("bout_count", Some(f.bout_count))
        .value("is_ufc_fighter", Some(f.is_ufc_fighter))
        .value("is_female", Some(f.is_female))
        .value("has_details", Some(f.has_details))
        .text("incomplete_fields", &f.completeness().to_string())
        .text("run_date", run_date);
    rec
}

pub fn event_record(e: &Event, run_date: &str) -> RecordBuilder {
    let location = e.location.value();
    let bout_keys: Vec<&str> = e.bout_keys.iter().map(StableKey::as_str).collect();

    let mut rec = RecordBuilder::new();
    rec.value("stable_event_key", Some(&e.key))
        .text("event_url", &e.event_url)
        .value("event_name", e.event_name.value())
        .value("event_date", e.event_date.value())
        .value("event_city", location.map(|l| l.city.as_str()))
        .value("event_region", location.and_then(|l| l.region.as_deref()))
        .value("event_country", location.map(|l| l.country.as_str()))
        .value("is_ufc", Some(e.is_ufc))
        .value("bout_count", Some(e.bout_count()))
        .text("bout_keys", &bout_keys.join(";"))
        .text("incomplete_fields", &e.completeness().to_string())
        .text("run_date", run_date);
    rec
}

pub fn bout_record(b: &Bout, run_date: &str) -> RecordBuilder {
    let class = b.bout_class.value();
    let links = &b.links;

    let mut rec = RecordBuilder::new();
    rec.value("stable_bout_key", Some(&b.key))
        .text("fight_url", &b.fight_url)
        .value("stable_event_key", links.event_key.as_ref())
        .value("stable_fighter_1_key", links.fighter_1_key.as_ref())
        .value("stable_fighter_2_key", links.fighter_2_key.as_ref())
        .value("bout_ordinal", Some(links.ordinal))
        .value("weight_class", class.map(|c| c.weight_class))
        .value("is_title_bout", class.map(|c| c.is_title))
        .value("is_female_bout", class.map(|c| c.is_female))
        .value("method", b.method.value().map(|m| m.method))
        .value("method_detail", b.method_detail.value())
        .value("end_round", b.end_round.value())
        .value("end_time_sec", b.end_time.value())
        .value("time_format", b.time_format.value())
        .value("referee", b.referee.value())
        .value("fighter_1_result", b.fighter_1_result.value())
        .value("fighter_2_result", b.fighter_2_result.value())
        .value("has_winner", Some(b.has_winner()))
        .value("kd_1", b.kd_1.value())
        .value("kd_2", b.kd_2.value())
        .value("sig_str_landed_1", b.sig_str_landed_1.value())
        .value("sig_str_attempted_1", b.sig_str_attempted_1.value())
        .value("sig_str_landed_2", b.sig_str_landed_2.value())
        .value("sig_str_attempted_2", b.sig_str_attempted_2.value())
        .value("td_landed_1", b.td_landed_1.value())
        .value("td_attempted_1", b.td_attempted_1.value())
        .value("td_landed_2", b.td_landed_2.value())
        .value("td_attempted_2", b.td_attempted_2.value())
        .value("sub_1", b.sub_1.value())
        .value("sub_2", b.sub_2.value())
        .value("ctrl_sec_1", b.ctrl_1.value())
        .value("ctrl_sec_2", b.ctrl_2.value())
        .text("event_ref", links.event_ref.as_str())
        .text("fighter_1_ref", links.fighter_1_ref.as_str())
        .text("fighter_2_ref", links.fighter_2_ref.as_str())
        .value("is_ufc", Some(b.is_ufc))
        .value("has_details", Some(b.has_details))
        .text("incomplete_fields", &b.completeness().to_string())
        .text("run_date", run_date);
    rec
}
