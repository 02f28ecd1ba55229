//! Common display utilities for CLI commands.

use colored::Colorize;
use pkgload::{PackageClause, SourceFile};

const MAX_DISPLAY_ITEMS: usize = 20;

/// Display parsed files with the package each one declares.
///
/// Shows up to `MAX_DISPLAY_ITEMS` files with bullet points, then
/// "... and N more".
pub fn print_files(files: &[SourceFile]) {
    if files.is_empty() {
        println!("    {}", "no files selected".dimmed());
        return;
    }

    for file in files.iter().take(MAX_DISPLAY_ITEMS) {
        println!(
            "    {} {} {}",
            "•".dimmed(),
            file.path().display(),
            format!("(package {})", file.package_name()).dimmed()
        );
    }

    if files.len() > MAX_DISPLAY_ITEMS {
        println!(
            "    {} ... and {} more",
            "•".dimmed(),
            files.len() - MAX_DISPLAY_ITEMS
        );
    }
}

/// Print the validated package name.
pub fn print_package(name: &str) {
    println!("{} {}", "Package".green().bold(), name);
}
