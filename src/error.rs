use std::path::PathBuf;
use thiserror::Error;

use crate::details::{Field, Group};

/// Problems found in the contents of the details document or timesheet.
/// Each variant reports the first violation only.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Invalid invoice details document")]
    InvalidDocument,

    #[error("Missing {group} details")]
    MissingGroup { group: Group },

    #[error("Missing {group} {}", .field.words())]
    Missing { group: Group, field: Field },

    #[error("Invalid {group} {}: '{raw}'", .field.words())]
    Invalid {
        group: Group,
        field: Field,
        raw: String,
    },

    #[error("Invalid unit cost: '{raw}'")]
    InvalidUnitCost { raw: String },

    #[error("Invalid tax rate: '{raw}'")]
    InvalidTaxRate { raw: String },

    #[error("Missing item date")]
    MissingItemDate,

    #[error("Invalid item date '{raw}'")]
    InvalidItemDate { raw: String },

    #[error("Missing item hours")]
    MissingItemHours,

    #[error("Invalid number of hours: '{raw}'")]
    InvalidItemHours { raw: String },

    #[error("Missing item description")]
    MissingItemDescription,

    #[error("Invoice total is too large")]
    TotalTooLarge,
}

/// Problems with the files named on the command line, found before any of
/// them is parsed.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Logo image '{}' not found", .path.display())]
    LogoNotFound { path: PathBuf },

    #[error("Invalid image: expected a png or jpg")]
    InvalidLogo,

    #[error("Invoice {label} file '{}' not found", .path.display())]
    FileNotFound { label: &'static str, path: PathBuf },
}

impl InputError {
    pub fn exit_code(&self) -> i32 {
        match self {
            InputError::LogoNotFound { .. } => 1,
            InputError::InvalidLogo => 2,
            InputError::FileNotFound { .. } => 3,
        }
    }
}
