use std::fmt;

use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::billing::round_cents;
use crate::details::Details;

const LONG_DATE: &str = "%B %d, %Y";
const SHORT_DATE: &str = "%b %d, %Y";

/// Dollar amount shown to cents with thousands separators, `$2,373.00`
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Money(pub Decimal);

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let cents = round_cents(self.0.abs());
        let dollars = cents.trunc();
        let fraction = ((cents - dollars) * Decimal::ONE_HUNDRED)
            .to_u32()
            .unwrap_or_default();
        let dollars = dollars.to_u128().unwrap_or_default();
        let sign = if self.0.is_sign_negative() && !cents.is_zero() {
            "-"
        } else {
            ""
        };

        write!(
            f,
            "{}${}.{:02}",
            sign,
            dollars.to_formatted_string(&Locale::en),
            fraction
        )
    }
}

/// Hours always carry a fractional digit, `8.0`, `2.5`, `1.25`
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Hours(pub Decimal);

impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let hours = self.0.normalize();
        if hours.scale() == 0 {
            write!(f, "{}.0", hours)
        } else {
            write!(f, "{}", hours)
        }
    }
}

pub fn long_date(date: NaiveDate) -> String {
    date.format(LONG_DATE).to_string()
}

pub fn short_date(date: NaiveDate) -> String {
    date.format(SHORT_DATE).to_string()
}

impl Details {
    pub fn invoice_label(&self) -> String {
        format!("Invoice # {}", self.invoice.number)
    }

    pub fn file_name(&self) -> String {
        format!("invoice-{}.pdf", self.invoice.number)
    }

    pub fn invoice_date(&self) -> String {
        long_date(self.invoice.date)
    }

    pub fn period(&self) -> String {
        format!(
            "{} to {}",
            long_date(self.invoice.period_start),
            long_date(self.invoice.period_end)
        )
    }

    pub fn terms(&self) -> String {
        format!("Terms: {} days net", self.invoice.terms)
    }

    pub fn payable_to(&self) -> String {
        format!("Please make funds payable to: {}", self.company.name)
    }

    pub fn contact(&self) -> [String; 3] {
        let c = &self.company;
        [
            c.street.clone(),
            format!("{}, {}, {}", c.city, c.state, c.zip_code),
            format!("{} \u{2022} {}", c.phone, c.email),
        ]
    }

    pub fn customer_lines(&self) -> [String; 3] {
        let c = &self.customer;
        [
            c.name.clone(),
            c.street.clone(),
            format!("{}, {}, {}", c.city, c.state, c.zip_code),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::details::tests::details;
    use rust_decimal_macros::dec;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn dates() {
        assert_eq!(long_date(ymd(2024, 3, 4)), "March 04, 2024");
        assert_eq!(short_date(ymd(2024, 2, 13)), "Feb 13, 2024");
    }

    #[test]
    fn money() {
        assert_eq!(Money(dec!(2373)).to_string(), "$2,373.00");
        assert_eq!(Money(dec!(1234567.891)).to_string(), "$1,234,567.89");
        assert_eq!(Money(dec!(0.5)).to_string(), "$0.50");
        assert_eq!(Money(dec!(999.995)).to_string(), "$1,000.00");
        assert_eq!(Money(dec!(-1234.5)).to_string(), "-$1,234.50");
        assert_eq!(Money(dec!(-0.001)).to_string(), "$0.00");
    }

    #[test]
    fn hours() {
        assert_eq!(Hours(dec!(8)).to_string(), "8.0");
        assert_eq!(Hours(dec!(8.00)).to_string(), "8.0");
        assert_eq!(Hours(dec!(2.5)).to_string(), "2.5");
        assert_eq!(Hours(dec!(1.250)).to_string(), "1.25");
    }

    #[test]
    fn labels() {
        let details = details();
        assert_eq!(details.invoice_label(), "Invoice # 42");
        assert_eq!(details.file_name(), "invoice-42.pdf");
        assert_eq!(details.invoice_date(), "March 04, 2024");
        assert_eq!(details.terms(), "Terms: 15 days net");
        assert_eq!(
            details.payable_to(),
            "Please make funds payable to: Northwind Consulting"
        );
        assert_eq!(
            details.period(),
            "February 01, 2024 to February 29, 2024"
        );
    }

    #[test]
    fn address_blocks() {
        let details = details();
        assert_eq!(
            details.contact(),
            [
                "12 Harbour St".to_string(),
                "Halifax, NS, B3H 1A1".to_string(),
                "902-555-0142 \u{2022} billing@northwind.ca".to_string(),
            ]
        );
        assert_eq!(details.customer_lines()[2], "Toronto, ON, M5H 2Y4");
    }
}
