use clap::{Parser, ValueHint};
use std::path::PathBuf;

/* Argument Stucture
 *
 * invoice-pdf [-l <image_file>] -d <details_file> -i <items_file>
 *             [-o <output_dir>] [-q]
 */

/// Generate a PDF invoice from a details document and a timesheet
#[derive(Parser, Debug)]
#[clap(version, about)]
pub struct Opts {
    /// path to image logo to include in header
    #[clap(short, long, value_name = "image_file",
        value_hint = ValueHint::FilePath)]
    pub logo: Option<PathBuf>,

    /// path to json file with invoice details
    #[clap(short, long, value_name = "details_file",
        value_hint = ValueHint::FilePath)]
    pub details: PathBuf,

    /// path to csv file with invoice items
    #[clap(short, long, value_name = "items_file",
        value_hint = ValueHint::FilePath)]
    pub items: PathBuf,

    /// directory the invoice is written to
    #[clap(short, long, value_name = "output_dir", default_value = ".",
        value_hint = ValueHint::DirPath)]
    pub output_dir: PathBuf,

    /// only log errors
    #[clap(short, long)]
    pub quiet: bool,
}
