use std::fs::File;
use std::io::Read;
use std::path::Path;

use image::ImageFormat;
use log::debug;

use crate::cli::Opts;
use crate::error::InputError;

/// Bytes read from the logo to recognise its format
const SNIFF_LEN: u64 = 32;

type InputResult<T> = Result<T, InputError>;

/// Check the files named on the command line before anything is parsed:
/// logo first, then details, then items
pub fn check(opts: &Opts) -> InputResult<()> {
    if let Some(logo) = &opts.logo {
        check_logo(logo)?;
    }
    check_file(&opts.details, "details")?;
    check_file(&opts.items, "items")
}

/// The logo has to exist and look like a PNG or JPEG from its content,
/// whatever its extension
pub fn check_logo(path: &Path) -> InputResult<()> {
    let file = File::open(path).map_err(|_| InputError::LogoNotFound {
        path: path.to_path_buf(),
    })?;

    let mut header = Vec::new();
    file.take(SNIFF_LEN)
        .read_to_end(&mut header)
        .map_err(|_| InputError::InvalidLogo)?;

    match image::guess_format(&header) {
        Ok(format @ (ImageFormat::Png | ImageFormat::Jpeg)) => {
            debug!("Logo '{}' is {:?}", path.display(), format);
            Ok(())
        }
        _ => Err(InputError::InvalidLogo),
    }
}

pub fn check_file(path: &Path, label: &'static str) -> InputResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(InputError::FileNotFound {
            label,
            path: path.to_path_buf(),
        })
    }
}
