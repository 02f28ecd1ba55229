//! pkgload CLI - Go package loading from the command line.
//!
//! Resolves import paths against source roots, parses the selected files in
//! parallel and optionally checks that they form a single package.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use pkgload::{Config, Selector};
use tracing_subscriber::EnvFilter;

mod cli;

/// pkgload: concurrent Go package loading.
#[derive(Parser)]
#[command(name = "pkgload")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (defaults to the nearest pkgload.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve an import path and parse the package's files
    Load {
        /// Import path, e.g. "example.com/foo"
        import_path: String,

        /// Source root to search (repeatable; replaces configured roots)
        #[arg(short, long = "root")]
        roots: Vec<PathBuf>,

        /// File categories as flags: g (sources), t (tests), x (external tests)
        #[arg(short, long)]
        which: Option<String>,

        /// Check that all files declare the same package
        #[arg(long)]
        check: bool,
    },

    /// Parse files directly, without import path resolution
    Parse {
        /// Files to parse; relative names are taken from --dir
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Directory relative file names are resolved against
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Check that all files declare the same package
        #[arg(long)]
        check: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<Config, pkgload::Error> {
    if let Some(path) = path {
        return Config::load(path);
    }
    let cwd = std::env::current_dir().map_err(|e| pkgload::Error::io(".", e))?;
    Ok(Config::discover(&cwd)?.unwrap_or_default())
}

fn run(cli: Cli) -> Result<(), pkgload::Error> {
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Load {
            import_path,
            roots,
            which,
            check,
        } => {
            if !roots.is_empty() {
                config.roots = roots;
            }
            let selector = match which {
                Some(flags) => flags.parse::<Selector>()?,
                None => config.selector(),
            };
            cli::load::run(&config, &import_path, &selector, check || config.check_package)
        }
        Commands::Parse { files, dir, check } => {
            cli::parse::run(&dir, &files, check || config.check_package)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            // Show cause chain for nested errors
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  {}: {cause}", "caused by".dimmed());
                source = std::error::Error::source(cause);
            }
            ExitCode::FAILURE
        }
    }
}
