use std::fs;
use std::io;
use std::path::PathBuf;

use log::{debug, info};
use thiserror::Error;

use crate::billing::InvoiceTotal;
use crate::cli::Opts;
use crate::details::Details;
use crate::error::{InputError, ValidationError};
use crate::input;
use crate::items::Item;
use crate::render::{InvoiceDocument, Logo};

/// Exit status for everything found after the input files were checked
const FAILURE: i32 = 4;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("{source}")]
    Input {
        #[from]
        source: InputError,
    },

    #[error("{source}")]
    Validation {
        #[from]
        source: ValidationError,
    },

    #[error("IO Error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("Error decoding invoice details: {source}")]
    Details {
        #[from]
        source: serde_json::Error,
    },

    #[error("Error reading invoice items: {source}")]
    Items {
        #[from]
        source: csv::Error,
    },

    #[error("Error reading logo: {source}")]
    Logo {
        #[from]
        source: image::ImageError,
    },
}

impl RunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Input { source } => source.exit_code(),
            _ => FAILURE,
        }
    }
}

/// Check the inputs, load them, and write the invoice. Returns the path of
/// the written PDF.
pub fn run(opts: &Opts) -> Result<PathBuf, RunError> {
    input::check(opts)?;

    info!("Loading invoice details from '{}'", opts.details.display());
    let details = Details::load(&opts.details)?;

    info!("Loading invoice items from '{}'", opts.items.display());
    let items = Item::load_all(&opts.items)?;
    info!("Loaded {} items", items.len());

    let total = InvoiceTotal::calculate(&details.invoice, &items)?;
    debug!("{}\n{}", details.invoice_label(), total);

    let logo = opts.logo.as_deref().map(Logo::load).transpose()?;

    let document = InvoiceDocument::new(&details, &items, &total, logo.as_ref());
    let path = opts.output_dir.join(details.file_name());
    fs::write(&path, document.render())?;
    info!("Wrote {}", path.display());

    Ok(path)
}
