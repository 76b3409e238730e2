use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;

use crate::billing::parse_decimal;
use crate::display::{short_date, Hours};
use crate::error::ValidationError;
use crate::run::RunError;

const DATE: &str = "Date";
const HOURS: &str = "Hours";
const DESCRIPTION: &str = "Description";

/// One timesheet row keyed by column header
pub type Row = HashMap<String, String>;

/// Time worked on one day
#[derive(Debug, PartialEq, Clone)]
pub struct Item {
    pub date: NaiveDate,
    pub hours: Decimal,
    pub description: String,
}

impl Item {
    /// Fields are checked in the order date, hours, description
    pub fn from_row(row: &Row) -> Result<Self, ValidationError> {
        let raw = row.get(DATE).ok_or(ValidationError::MissingItemDate)?;
        let date = NaiveDate::from_str(raw.trim())
            .map_err(|_| ValidationError::InvalidItemDate { raw: raw.clone() })?;

        let raw = row.get(HOURS).ok_or(ValidationError::MissingItemHours)?;
        let hours = parse_decimal(raw)
            .filter(|h| !h.is_sign_negative())
            .ok_or_else(|| ValidationError::InvalidItemHours { raw: raw.clone() })?;

        let description = row
            .get(DESCRIPTION)
            .filter(|d| !d.is_empty())
            .ok_or(ValidationError::MissingItemDescription)?
            .clone();

        Ok(Self {
            date,
            hours,
            description,
        })
    }

    /// Read every row of a headed CSV file, stopping at the first
    /// invalid one. Items keep the order of the file.
    pub fn load_all(path: &Path) -> Result<Vec<Self>, RunError> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::Headers)
            .from_path(path)?;
        let headers = reader.headers()?.clone();

        let mut items = Vec::new();
        for record in reader.records() {
            let record = record?;
            let row: Row = headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| (header.to_string(), value.to_string()))
                .collect();
            items.push(Self::from_row(&row)?);
        }
        Ok(items)
    }

    /// Date, hours and description as shown in the itemized table
    pub fn cells(&self) -> [String; 3] {
        [
            short_date(self.date),
            Hours(self.hours).to_string(),
            self.description.clone(),
        ]
    }
}
