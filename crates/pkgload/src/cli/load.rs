//! `pkgload load` command implementation.

use colored::Colorize;
use pkgload::{Config, Loader, Selection, Selector};

use super::display;

/// Run the load command.
pub fn run(
    config: &Config,
    import_path: &str,
    selector: &Selector,
    check: bool,
) -> Result<(), pkgload::Error> {
    let loader = Loader::from_config(config);

    println!(
        "{} {} [{}]...",
        "Loading".cyan().bold(),
        import_path,
        selector.flags()
    );

    match loader.parse_selected(import_path, selector)? {
        Selection::EmptyDirectory { dir } => {
            println!("{}: no Go files in {}", "Empty".yellow(), dir.display());
        }
        Selection::Parsed { dir, files } => {
            println!("{}: {}", "Directory".dimmed(), dir.display());
            println!("{} {} files", "Parsed".green().bold(), files.len());
            display::print_files(&files);

            if check {
                let name = loader.validate_package_identity(&files)?;
                display::print_package(&name);
            }
        }
    }

    Ok(())
}
