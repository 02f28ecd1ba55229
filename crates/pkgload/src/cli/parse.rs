//! `pkgload parse` command implementation.

use std::path::{Path, PathBuf};

use colored::Colorize;
use pkgload::Loader;

use super::display;

/// Run the parse command.
pub fn run(dir: &Path, files: &[PathBuf], check: bool) -> Result<(), pkgload::Error> {
    let loader = Loader::new(Vec::<PathBuf>::new());

    let parsed = loader.parse_all(dir, files)?;
    println!("{} {} files", "Parsed".green().bold(), parsed.len());
    display::print_files(&parsed);

    if check {
        let name = loader.validate_package_identity(&parsed)?;
        display::print_package(&name);
    }

    Ok(())
}
