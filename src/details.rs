use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use strum_macros::{Display, IntoStaticStr};

use crate::billing::parse_decimal;
use crate::error::ValidationError;
use crate::run::RunError;

/// Top level sections of the details document
#[derive(Display, IntoStaticStr, Debug, PartialEq, Eq, Clone, Copy)]
#[strum(serialize_all = "lowercase")]
pub enum Group {
    Company,
    Customer,
    Invoice,
}

impl Group {
    fn key(self) -> &'static str {
        self.into()
    }
}

/// Keys within a section, named as they appear in the document
#[derive(IntoStaticStr, Debug, PartialEq, Eq, Clone, Copy)]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    Name,
    Street,
    City,
    State,
    ZipCode,
    Phone,
    Email,
    Number,
    Date,
    PeriodStart,
    PeriodEnd,
    Description,
    Terms,
    UnitCost,
    TaxLabel,
    TaxRate,
}

impl Field {
    pub fn key(self) -> &'static str {
        self.into()
    }

    /// The key as it reads in a sentence, `zip_code` becomes `zip code`
    pub fn words(&self) -> String {
        self.key().replace('_', " ")
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Company {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Customer {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Debug, PartialEq, Clone)]
pub struct InvoiceInfo {
    pub number: String,
    pub date: NaiveDate,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub description: String,
    /// Net days until payment is due
    pub terms: u32,
    pub unit_cost: Decimal,
    pub tax_label: Option<String>,
    /// Fraction of the total cost, `0.13` for 13%
    pub tax_rate: Option<Decimal>,
}

/// Everything about an invoice that does not come from the timesheet
#[derive(Debug, PartialEq, Clone)]
pub struct Details {
    pub company: Company,
    pub customer: Customer,
    pub invoice: InvoiceInfo,
}

impl Details {
    pub fn load(path: &Path) -> Result<Self, RunError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let value: Value = serde_json::from_reader(reader)?;
        Ok(Self::from_value(&value)?)
    }

    /// Build the details from a parsed document. Sections are checked in
    /// the order company, customer, invoice and the first missing or
    /// invalid field is reported.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let doc = value.as_object().ok_or(ValidationError::InvalidDocument)?;

        Ok(Self {
            company: company(&Section::of(doc, Group::Company)?)?,
            customer: customer(&Section::of(doc, Group::Customer)?)?,
            invoice: invoice(&Section::of(doc, Group::Invoice)?)?,
        })
    }
}

fn company(section: &Section) -> Result<Company, ValidationError> {
    Ok(Company {
        name: section.text(Field::Name)?,
        street: section.text(Field::Street)?,
        city: section.text(Field::City)?,
        state: section.text(Field::State)?,
        zip_code: section.text(Field::ZipCode)?,
        phone: section.text(Field::Phone)?,
        email: section.text(Field::Email)?,
    })
}

fn customer(section: &Section) -> Result<Customer, ValidationError> {
    Ok(Customer {
        name: section.text(Field::Name)?,
        street: section.text(Field::Street)?,
        city: section.text(Field::City)?,
        state: section.text(Field::State)?,
        zip_code: section.text(Field::ZipCode)?,
    })
}

fn invoice(section: &Section) -> Result<InvoiceInfo, ValidationError> {
    let number = section.text(Field::Number)?;
    let date = section.date(Field::Date)?;
    let period_start = section.date(Field::PeriodStart)?;
    let period_end = section.date(Field::PeriodEnd)?;
    let description = section.text(Field::Description)?;
    let terms = section.terms()?;

    let unit_cost = section.require(Field::UnitCost)?;
    let unit_cost = decimal(unit_cost)
        .ok_or_else(|| ValidationError::InvalidUnitCost { raw: raw_text(unit_cost) })?;

    let tax_label = match section.get(Field::TaxLabel) {
        None => None,
        Some(value) => Some(section.scalar(Field::TaxLabel, value)?),
    };

    let tax_rate = match section.get(Field::TaxRate) {
        None => None,
        Some(value) => Some(
            decimal(value)
                .ok_or_else(|| ValidationError::InvalidTaxRate { raw: raw_text(value) })?,
        ),
    };

    Ok(InvoiceInfo {
        number,
        date,
        period_start,
        period_end,
        description,
        terms,
        unit_cost,
        tax_label,
        tax_rate,
    })
}

struct Section<'a> {
    group: Group,
    fields: &'a Map<String, Value>,
}

impl<'a> Section<'a> {
    fn of(doc: &'a Map<String, Value>, group: Group) -> Result<Self, ValidationError> {
        match doc.get(group.key()) {
            Some(Value::Object(fields)) => Ok(Self { group, fields }),
            None | Some(Value::Null) => Err(ValidationError::MissingGroup { group }),
            Some(_) => Err(ValidationError::InvalidDocument),
        }
    }

    /// A null value counts as absent
    fn get(&self, field: Field) -> Option<&'a Value> {
        self.fields.get(field.key()).filter(|v| !v.is_null())
    }

    fn require(&self, field: Field) -> Result<&'a Value, ValidationError> {
        self.get(field).ok_or(ValidationError::Missing {
            group: self.group,
            field,
        })
    }

    fn invalid(&self, field: Field, value: &Value) -> ValidationError {
        ValidationError::Invalid {
            group: self.group,
            field,
            raw: raw_text(value),
        }
    }

    fn scalar(&self, field: Field, value: &Value) -> Result<String, ValidationError> {
        scalar_text(value).ok_or_else(|| self.invalid(field, value))
    }

    fn text(&self, field: Field) -> Result<String, ValidationError> {
        let value = self.require(field)?;
        self.scalar(field, value)
    }

    fn date(&self, field: Field) -> Result<NaiveDate, ValidationError> {
        let value = self.require(field)?;
        value
            .as_str()
            .and_then(|s| NaiveDate::from_str(s.trim()).ok())
            .ok_or_else(|| self.invalid(field, value))
    }

    fn terms(&self) -> Result<u32, ValidationError> {
        let value = self.require(Field::Terms)?;
        let terms = match value {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        terms.ok_or_else(|| self.invalid(Field::Terms, value))
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Value as the user wrote it, strings without their quotes
fn raw_text(value: &Value) -> String {
    scalar_text(value).unwrap_or_else(|| value.to_string())
}

fn decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}
