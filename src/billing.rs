use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::details::InvoiceInfo;
use crate::display::{Hours, Money};
use crate::error::ValidationError;
use crate::items::Item;

const DEFAULT_TAX_LABEL: &str = "Tax";

/// Parse a decimal as written in a details document or timesheet,
/// scientific notation included
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Round to cents, ties to even
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

#[derive(Debug, PartialEq, Clone)]
pub struct Tax {
    pub label: String,
    /// The rate as a percentage, `13` for a rate of `0.13`
    pub percent: Decimal,
    pub amount: Decimal,
}

impl fmt::Display for Tax {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({}%)", self.label, self.percent.normalize())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct InvoiceTotal {
    pub total_hours: Decimal,
    pub total_cost: Decimal,
    pub tax: Option<Tax>,
    pub amount_due: Decimal,
}

impl InvoiceTotal {
    /// Fails when a sum or product does not fit in a `Decimal`
    pub fn calculate(invoice: &InvoiceInfo, items: &[Item]) -> Result<Self, ValidationError> {
        let total_hours = items
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.hours))
            .ok_or(ValidationError::TotalTooLarge)?;
        let total_cost = total_hours
            .checked_mul(invoice.unit_cost)
            .ok_or(ValidationError::TotalTooLarge)?;

        let tax = invoice
            .tax_rate
            .map(|rate| Tax::on(total_cost, rate, invoice.tax_label.as_deref()))
            .transpose()?;

        let amount_due = match &tax {
            Some(tax) => total_cost
                .checked_add(tax.amount)
                .map(round_cents)
                .ok_or(ValidationError::TotalTooLarge)?,
            None => total_cost,
        };

        Ok(Self {
            total_hours,
            total_cost,
            tax,
            amount_due,
        })
    }
}

impl Tax {
    fn on(
        total_cost: Decimal,
        rate: Decimal,
        label: Option<&str>,
    ) -> Result<Tax, ValidationError> {
        let amount = total_cost
            .checked_mul(rate)
            .ok_or(ValidationError::TotalTooLarge)?;
        let percent = rate
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(ValidationError::TotalTooLarge)?;

        Ok(Tax {
            label: label.unwrap_or(DEFAULT_TAX_LABEL).to_string(),
            percent,
            amount: round_cents(amount),
        })
    }
}

impl fmt::Display for InvoiceTotal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Hours: {}", Hours(self.total_hours))?;
        writeln!(f, "Subtotal: {}", Money(self.total_cost))?;
        if let Some(tax) = &self.tax {
            writeln!(f, "{}: {}", tax, Money(tax.amount))?;
        }

        write!(f, "Total: {}", Money(self.amount_due))
    }
}
