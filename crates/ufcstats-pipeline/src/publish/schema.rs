//! Published table schemas
//!
//! Column order here is the file's column order. Every rendered row is
//! checked against its schema before anything is written.

use chrono::NaiveDate;

use ufcstats_common::{PipelineError, Result};

/// Cell type of a published column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// `<kind>:<id>` stable key
    Key,
    Text,
    Integer,
    Decimal,
    /// `YYYY-MM-DD`
    Date,
    /// `true` / `false`
    Bool,
    /// `resolved` / `orphan` / `missing`
    Reference,
}

impl ColumnType {
    /// Whether a non-empty cell holds a value of this type
    pub fn accepts(&self, cell: &str) -> bool {
        match self {
            ColumnType::Key => cell
                .split_once(':')
                .is_some_and(|(kind, id)| !kind.is_empty() && !id.is_empty()),
            ColumnType::Text => true,
            ColumnType::Integer => cell.parse::<i64>().is_ok(),
            ColumnType::Decimal => cell.parse::<f64>().is_ok_and(f64::is_finite),
            ColumnType::Date => NaiveDate::parse_from_str(cell, "%Y-%m-%d").is_ok(),
            ColumnType::Bool => matches!(cell, "true" | "false"),
            ColumnType::Reference => matches!(cell, "resolved" | "orphan" | "missing"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
}

const fn col(name: &'static str, ty: ColumnType) -> Column {
    Column {
        name,
        ty,
        nullable: true,
    }
}

const fn req(name: &'static str, ty: ColumnType) -> Column {
    Column {
        name,
        ty,
        nullable: false,
    }
}

/// Name and ordered columns of one published table
#[derive(Debug, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl TableSchema {
    pub fn header(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    /// Header must match the schema's column names in order
    pub fn validate_header<S: AsRef<str>>(&self, header: &[S]) -> Result<()> {
        let names: Vec<&str> = header.iter().map(|h| h.as_ref()).collect();
        if names != self.header() {
            return Err(PipelineError::schema(
                self.name,
                format!("columns {:?} do not match {:?}", names, self.header()),
            ));
        }
        Ok(())
    }

    /// Every cell must be empty (nullable columns only) or of the column type
    pub fn validate_row<S: AsRef<str>>(&self, row: usize, values: &[S]) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(PipelineError::schema(
                self.name,
                format!(
                    "row {} has {} cells, expected {}",
                    row,
                    values.len(),
                    self.columns.len()
                ),
            ));
        }

        for (column, value) in self.columns.iter().zip(values) {
            let value = value.as_ref();
            let ok = if value.is_empty() {
                column.nullable
            } else {
                column.ty.accepts(value)
            };
            if !ok {
                return Err(PipelineError::schema(
                    self.name,
                    format!(
                        "row {} column {}: '{}' is not a valid {:?}",
                        row, column.name, value, column.ty
                    ),
                ));
            }
        }
        Ok(())
    }
}

use self::ColumnType::{Bool, Date, Decimal, Integer, Key, Reference, Text};

pub static DIM_FIGHTER: TableSchema = TableSchema {
    name: "dim_fighter",
    columns: &[
        req("stable_fighter_key", Key),
        req("fighter_url", Text),
        col("fighter_name", Text),
        col("first_name", Text),
        col("last_name", Text),
        col("nickname", Text),
        col("stance", Text),
        col("height_in", Integer),
        col("weight_lb", Integer),
        col("reach_in", Decimal),
        col("dob", Date),
        col("wins", Integer),
        col("losses", Integer),
        col("draws", Integer),
        col("slpm", Decimal),
        col("str_acc", Decimal),
        col("sapm", Decimal),
        col("str_def", Decimal),
        col("td_avg", Decimal),
        col("td_acc", Decimal),
        col("td_def", Decimal),
        col("sub_avg", Decimal),
        req("bout_count", Integer),
        req("is_ufc_fighter", Bool),
        req("is_female", Bool),
        req("has_details", Bool),
        col("incomplete_fields", Text),
        req("run_date", Date),
    ],
};

pub static DIM_EVENT: TableSchema = TableSchema {
    name: "dim_event",
    columns: &[
        req("stable_event_key", Key),
        req("event_url", Text),
        col("event_name", Text),
        col("event_date", Date),
        col("event_city", Text),
        col("event_region", Text),
        col("event_country", Text),
        req("is_ufc", Bool),
        req("bout_count", Integer),
        col("bout_keys", Text),
        col("incomplete_fields", Text),
        req("run_date", Date),
    ],
};

pub static FACT_BOUT: TableSchema = TableSchema {
    name: "fact_bout",
    columns: &[
        req("stable_bout_key", Key),
        col("fight_url", Text),
        col("stable_event_key", Key),
        col("stable_fighter_1_key", Key),
        col("stable_fighter_2_key", Key),
        req("bout_ordinal", Integer),
        col("weight_class", Text),
        col("is_title_bout", Bool),
        col("is_female_bout", Bool),
        col("method", Text),
        col("method_detail", Text),
        col("end_round", Integer),
        col("end_time_sec", Integer),
        col("time_format", Text),
        col("referee", Text),
        col("fighter_1_result", Text),
        col("fighter_2_result", Text),
        req("has_winner", Bool),
        col("kd_1", Integer),
        col("kd_2", Integer),
        col("sig_str_landed_1", Integer),
        col("sig_str_attempted_1", Integer),
        col("sig_str_landed_2", Integer),
        col("sig_str_attempted_2", Integer),
        col("td_landed_1", Integer),
        col("td_attempted_1", Integer),
        col("td_landed_2", Integer),
        col("td_attempted_2", Integer),
        col("sub_1", Integer),
        col("sub_2", Integer),
        col("ctrl_sec_1", Integer),
        col("ctrl_sec_2", Integer),
        req("event_ref", Reference),
        req("fighter_1_ref", Reference),
        req("fighter_2_ref", Reference),
        req("is_ufc", Bool),
        req("has_details", Bool),
        col("incomplete_fields", Text),
        req("run_date", Date),
    ],
};

/// Every published table, in the order they are written
pub static PUBLISHED_TABLES: [&TableSchema; 3] = [&DIM_FIGHTER, &DIM_EVENT, &FACT_BOUT];
