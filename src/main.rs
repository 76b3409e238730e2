/*
 * Generate a PDF invoice for hourly work
 *
 * Inputs:
 * - Optional logo, png or jpg
 * - JSON details: company, customer and invoice terms
 * - CSV timesheet: Date, Hours, Description
 *
 * To generate an invoice:
 *  - Check the input files exist and the logo is an image
 *  - Load and validate the details
 *  - Load and validate the timesheet items
 *  - Calculate total hours, cost, tax and amount due
 *  - Lay out the summary page and the itemized pages
 *  - Write invoice-<number>.pdf
 *
 *  Exit status:
 *  1 logo not found, 2 logo not an image, 3 details or items not found,
 *  4 anything else
 */

mod billing;
mod cli;
mod details;
mod display;
mod error;
mod input;
mod items;
mod render;
mod run;

use clap::Parser;
use env_logger::Env;
use log::LevelFilter;
use std::process;

use crate::cli::Opts;

fn init_logger(quiet: bool) {
    let level = if quiet {
        LevelFilter::Error
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_env(Env::new().filter("INVOICE_PDF_LOG"))
        .init();
}

fn main() {
    let opts = Opts::parse();
    init_logger(opts.quiet);

    if let Err(error) = run::run(&opts) {
        eprintln!("{}", error);
        process::exit(error.exit_code());
    }
}
