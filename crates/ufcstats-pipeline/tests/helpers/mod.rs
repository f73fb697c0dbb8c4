//! Test helpers for pipeline integration tests
//!
//! Writes a small but complete raw scrape for one run date: one event with
//! two bouts, three listed fighters and one bout against a fighter the
//! directory never listed.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use ufcstats_common::RunDate;
use ufcstats_pipeline::{PipelineConfig, RunContext};

pub const RUN_DATE: &str = "2026-01-24";
pub const SOURCE: &str = "ufcstats";

pub const EVENT_DIRECTORY_HEADER: &[&str] = &[
    "event_url",
    "event_name",
    "event_date_raw",
    "event_location_raw",
    "snapshot",
];

pub const EVENT_DETAILS_HEADER: &[&str] = &[
    "fight_url",
    "event_url",
    "event_name",
    "fighter_1_url",
    "fighter_2_url",
    "fight_order",
    "fighter_1_result",
    "fighter_2_result",
    "weight_class_raw",
    "method_raw",
    "round_raw",
    "time_raw",
    "sub_1",
    "sub_2",
    "snapshot",
];

pub const FIGHT_DETAILS_HEADER: &[&str] = &[
    "fight_url",
    "event_url",
    "fighter_1_url",
    "fighter_2_url",
    "weight_class_raw",
    "method_raw",
    "round_raw",
    "time_raw",
    "time_format_raw",
    "referee_raw",
    "sig_str_1",
    "sig_str_2",
    "ctrl_1",
    "ctrl_2",
    "snapshot",
];

pub const FIGHTER_DIRECTORY_HEADER: &[&str] = &[
    "fighter_url",
    "fighter_name",
    "first_name",
    "last_name",
    "height_raw",
    "weight_raw",
    "reach_raw",
    "snapshot",
];

pub const FIGHTER_DETAILS_HEADER: &[&str] = &[
    "fighter_url",
    "first_name",
    "last_name",
    "dob_raw",
    "slpm",
    "str_acc",
    "sapm",
    "str_def",
    "td_avg",
    "td_acc",
    "td_def",
    "sub_avg",
    "snapshot",
];

pub fn event_url(id: &str) -> String {
    format!("http://ufcstats.com/event-details/{}", id)
}

pub fn fight_url(id: &str) -> String {
    format!("http://ufcstats.com/fight-details/{}", id)
}

pub fn fighter_url(id: &str) -> String {
    format!("http://ufcstats.com/fighter-details/{}", id)
}

pub fn raw_dir(root: &Path) -> PathBuf {
    root.join(RUN_DATE).join("raw")
}

pub fn published_file(root: &Path, table: &str) -> PathBuf {
    root.join(RUN_DATE)
        .join("published")
        .join(format!("{}__{}__{}.csv", table, SOURCE, RUN_DATE))
}

/// Write one raw page table for the standard run date
pub fn write_page(root: &Path, page: &str, header: &[&str], rows: &[Vec<String>]) {
    let dir = raw_dir(root);
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{}__{}__{}.csv", page, SOURCE, RUN_DATE));

    let mut writer = csv::Writer::from_path(path).unwrap();
    writer.write_record(header).unwrap();
    for row in rows {
        writer.write_record(row).unwrap();
    }
    writer.flush().unwrap();
}

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

pub fn event_directory_rows() -> Vec<Vec<String>> {
    vec![row(&[
        event_url("e1").as_str(),
        "UFC 300: Pereira vs. Hill",
        "April 13, 2024",
        "Las Vegas, Nevada, USA",
        RUN_DATE,
    ])]
}

pub fn event_details_rows() -> Vec<Vec<String>> {
    vec![
        row(&[
            fight_url("x2").as_str(),
            event_url("e1").as_str(),
            "UFC 300: Pereira vs. Hill",
            fighter_url("c").as_str(),
            fighter_url("ghost").as_str(),
            "2",
            "L",
            "W",
            "Women's Strawweight Bout",
            "Decision - Unanimous",
            "3",
            "5:00",
            "0",
            "0",
            RUN_DATE,
        ]),
        row(&[
            fight_url("x1").as_str(),
            event_url("e1").as_str(),
            "UFC 300: Pereira vs. Hill",
            fighter_url("a").as_str(),
            fighter_url("b").as_str(),
            "1",
            "W",
            "L",
            "Lightweight Bout",
            "KO/TKO Punches",
            "1",
            "3:42",
            "1",
            "--",
            RUN_DATE,
        ]),
    ]
}

pub fn fight_details_rows() -> Vec<Vec<String>> {
    vec![row(&[
        fight_url("x1").as_str(),
        event_url("e1").as_str(),
        fighter_url("a").as_str(),
        fighter_url("b").as_str(),
        "Lightweight Bout",
        "KO/TKO",
        "1",
        "3:42",
        "5 Rnd (5-5-5-5-5)",
        "Herb Dean",
        "15 of 27",
        "8 of 30",
        "1:05",
        "0:00",
        RUN_DATE,
    ])]
}

pub fn fighter_directory_rows() -> Vec<Vec<String>> {
    vec![
        row(&[fighter_url("a").as_str(), "Alex Alpha", "Alex", "Alpha", "6' 1\"", "155 lbs.", "76.0\"", RUN_DATE]),
        row(&[fighter_url("b").as_str(), "Ben Beta", "Ben", "Beta", "--", "155 lbs.", "--", RUN_DATE]),
        row(&[fighter_url("c").as_str(), "Cara Gamma", "Cara", "Gamma", "5' 4\"", "115 lbs.", "", RUN_DATE]),
    ]
}

pub fn fighter_details_rows() -> Vec<Vec<String>> {
    vec![row(&[
        fighter_url("a").as_str(),
        "Alex",
        "Alpha",
        "Jul 13, 1990",
        "4.50",
        "54%",
        "3.10",
        "",
        "1.25",
        "40%",
        "70%",
        "0.5",
        RUN_DATE,
    ])]
}

/// Write every raw page of the standard run under `root`
pub fn write_standard_run(root: &Path) {
    write_page(root, "event_directory", EVENT_DIRECTORY_HEADER, &event_directory_rows());
    write_page(root, "event_details", EVENT_DETAILS_HEADER, &event_details_rows());
    write_page(root, "fight_details", FIGHT_DETAILS_HEADER, &fight_details_rows());
    write_page(root, "fighter_directory", FIGHTER_DIRECTORY_HEADER, &fighter_directory_rows());
    write_page(root, "fighter_details", FIGHTER_DETAILS_HEADER, &fighter_details_rows());
}

pub fn context(config: PipelineConfig) -> RunContext {
    RunContext::new(config.with_worker_threads(2), RunDate::parse(RUN_DATE).unwrap()).unwrap()
}

pub fn default_context(root: &Path) -> RunContext {
    context(PipelineConfig::default().with_data_root(root))
}

/// Published table rows as column name to cell maps
pub fn read_table(path: &Path) -> Vec<HashMap<String, String>> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let header = reader.headers().unwrap().clone();
    reader
        .records()
        .map(|record| {
            let record = record.unwrap();
            header
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect()
        })
        .collect()
}

/// The row whose `column` equals `value`
pub fn find_row<'t>(
    rows: &'t [HashMap<String, String>],
    column: &str,
    value: &str,
) -> &'t HashMap<String, String> {
    rows.iter()
        .find(|r| r[column] == value)
        .unwrap_or_else(|| panic!("no row with {} = {}", column, value))
}
