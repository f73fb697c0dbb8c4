//! CSV record assembly shared by the staged and published writers

use chrono::NaiveDate;

use crate::coerce::{
    format_attempts, Attempts, Coerced, Location, Method, Outcome, WeightClass,
};
use crate::completeness::FieldStatus;
use crate::keys::StableKey;

/// Renders a typed value as one CSV cell
pub trait CellValue {
    fn cell(&self) -> String;
}

impl<T: CellValue + ?Sized> CellValue for &T {
    fn cell(&self) -> String {
        (**self).cell()
    }
}

impl CellValue for str {
    fn cell(&self) -> String {
        self.to_string()
    }
}

impl CellValue for String {
    fn cell(&self) -> String {
        self.clone()
    }
}

impl CellValue for i64 {
    fn cell(&self) -> String {
        self.to_string()
    }
}

impl CellValue for usize {
    fn cell(&self) -> String {
        self.to_string()
    }
}

/// Shortest representation that reads back to the same `f64`
impl CellValue for f64 {
    fn cell(&self) -> String {
        self.to_string()
    }
}

impl CellValue for bool {
    fn cell(&self) -> String {
        self.to_string()
    }
}

impl CellValue for NaiveDate {
    fn cell(&self) -> String {
        self.format("%Y-%m-%d").to_string()
    }
}

impl CellValue for StableKey {
    fn cell(&self) -> String {
        self.as_str().to_string()
    }
}

impl CellValue for Location {
    fn cell(&self) -> String {
        self.to_string()
    }
}

impl CellValue for Attempts {
    fn cell(&self) -> String {
        format_attempts(self)
    }
}

impl CellValue for WeightClass {
    fn cell(&self) -> String {
        self.as_str().to_string()
    }
}

impl CellValue for Method {
    fn cell(&self) -> String {
        self.as_str().to_string()
    }
}

impl CellValue for Outcome {
    fn cell(&self) -> String {
        self.as_str().to_string()
    }
}

impl CellValue for FieldStatus {
    fn cell(&self) -> String {
        self.as_str().to_string()
    }
}

/// One output row, built column by column.
///
/// The column names collected alongside the values double as the table
/// header, so a header can never drift from the rows written under it.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    columns: Vec<String>,
    values: Vec<String>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A plain string column
    pub fn text(&mut self, name: &str, value: &str) -> &mut Self {
        self.push(name, value.to_string())
    }

    /// A nullable column; `None` becomes an empty cell
    pub fn value<T: CellValue>(&mut self, name: &str, value: Option<T>) -> &mut Self {
        self.push(name, value.map(|v| v.cell()).unwrap_or_default())
    }

    /// A coerced value plus its `<name>_status` companion column
    pub fn field<T: CellValue>(&mut self, name: &str, value: &Coerced<T>) -> &mut Self {
        self.value(name, value.value());
        self.push(&format!("{}_status", name), value.status().cell())
    }

    fn push(&mut self, name: &str, value: String) -> &mut Self {
        self.columns.push(name.to_string());
        self.values.push(value);
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn into_values(self) -> Vec<String> {
        self.values
    }
}
