//! # pkgload: Concurrent Go Package Loading
//!
//! pkgload turns an import path into parsed syntax trees for the package's
//! files. Files are parsed in parallel, results come back in a fixed order,
//! and failures are reported deterministically: the error returned is always
//! the one from the earliest file in the requested order, never whichever
//! happened to finish first.
//!
//! ## Design Philosophy
//!
//! - **All or nothing** - a call either parses every requested file or returns one error
//! - **Order, not timing** - output order and error choice follow input order
//! - **Explicit shared state** - the position registry is passed in, never global
//! - **Pluggable edges** - import resolution and single-file parsing sit behind traits
//!
//! ## Quick Start
//!
//! ```no_run
//! use pkgload::{Loader, Selection, Selector};
//!
//! let loader = Loader::new(["/home/me/go/src"]);
//!
//! match loader.parse_selected("example.com/hello", &Selector::from_flags("gt"))? {
//!     Selection::Parsed { dir, files } => {
//!         let name = loader.validate_package_identity(&files)?;
//!         println!("package {name}: {} files in {}", files.len(), dir.display());
//!     }
//!     Selection::EmptyDirectory { dir } => println!("no Go files in {}", dir.display()),
//! }
//! # Ok::<(), pkgload::Error>(())
//! ```

mod category;
mod config;
mod error;
mod package;
mod parallel;
mod parser;
mod position;
mod resolver;

pub use category::{Category, Selector};
pub use config::{CONFIG_FILE_NAME, Config};
pub use error::{Error, Result};
pub use package::validate_package_identity;
pub use parallel::{parse_all, resolve_path};
pub use parser::{GoParser, Ident, PackageClause, SourceFile, SourceParser, unparen};
pub use position::{FileEntry, FileSet, Pos, Position, contains};
pub use resolver::{DirResolver, Resolution, SourceSet, SourceSetResolver};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

/// Result of [`Loader::parse_selected`].
#[derive(Debug)]
pub enum Selection<F> {
    /// The selected files, parsed, in selection order.
    ///
    /// `files` may be empty when the directory has Go source but none in the
    /// selected categories.
    Parsed {
        /// Package directory
        dir: PathBuf,
        /// One tree per selected file
        files: Vec<F>,
    },
    /// The package directory holds no Go source at all.
    EmptyDirectory {
        /// Package directory
        dir: PathBuf,
    },
}

impl<F> Selection<F> {
    /// Returns `true` for [`Selection::EmptyDirectory`].
    #[must_use]
    pub fn is_empty_directory(&self) -> bool {
        matches!(self, Self::EmptyDirectory { .. })
    }

    /// The package directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        match self {
            Self::Parsed { dir, .. } | Self::EmptyDirectory { dir } => dir,
        }
    }
}

/// Package loader: an import resolver, a single-file parser and the shared
/// position registry.
///
/// The registry outlives individual calls and only ever grows; every file the
/// loader parses is registered in it.
#[derive(Debug)]
pub struct Loader<R = DirResolver, P = GoParser> {
    resolver: R,
    parser: P,
    fset: Arc<FileSet>,
}

impl Loader {
    /// Create a Go loader searching the given source roots.
    pub fn new<I, T>(roots: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<PathBuf>,
    {
        Self::with_parts(DirResolver::new(roots), GoParser::new(), Arc::default())
    }

    /// Create a Go loader from configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::with_parts(config.resolver(), GoParser::new(), Arc::default())
    }
}

impl<R, P> Loader<R, P>
where
    R: SourceSetResolver,
    P: SourceParser,
{
    /// Assemble a loader from its parts.
    pub fn with_parts(resolver: R, parser: P, fset: Arc<FileSet>) -> Self {
        Self {
            resolver,
            parser,
            fset,
        }
    }

    /// The shared position registry.
    #[must_use]
    pub fn fset(&self) -> &Arc<FileSet> {
        &self.fset
    }

    /// The import path resolver.
    #[must_use]
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// The single-file parser.
    #[must_use]
    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Resolve `import_path` and parse the files of the selected categories.
    ///
    /// File lists are concatenated in selector order, so `"xg"` yields the
    /// external tests first.
    ///
    /// # Errors
    ///
    /// Resolution errors are returned unchanged. Parse errors follow
    /// [`parse_all`].
    pub fn parse_selected(
        &self,
        import_path: &str,
        selector: &Selector,
    ) -> Result<Selection<P::File>> {
        let set = match self.resolver.resolve(import_path)? {
            Resolution::Found(set) => set,
            Resolution::EmptyDirectory { dir } => {
                debug!(
                    import_path,
                    dir = %dir.display(),
                    "Package directory has no Go files"
                );
                return Ok(Selection::EmptyDirectory { dir });
            }
        };

        let filenames = set.select(selector);
        debug!(
            import_path,
            categories = %selector.flags(),
            files = filenames.len(),
            "Loading package files"
        );
        let files = self.parse_all(&set.dir, &filenames)?;
        Ok(Selection::Parsed {
            dir: set.dir,
            files,
        })
    }

    /// Parse files concurrently; see [`parse_all`].
    ///
    /// # Errors
    ///
    /// Returns the error of the lowest-indexed file that failed.
    pub fn parse_all<S: AsRef<Path>>(&self, dir: &Path, filenames: &[S]) -> Result<Vec<P::File>> {
        parallel::parse_all(&self.fset, &self.parser, dir, filenames)
    }

    /// Check that parsed files form one package; see
    /// [`validate_package_identity`].
    ///
    /// # Errors
    ///
    /// Fails on an empty list, a package name conflict or a directory
    /// conflict.
    pub fn validate_package_identity(&self, files: &[P::File]) -> Result<String> {
        package::validate_package_identity(&self.fset, files)
    }
}
