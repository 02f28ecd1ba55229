//! Error types for pkgload operations.
//!
//! Every failure is a variant of a single [`Error`] enum. Errors are never
//! retried or swallowed: the first qualifying error ends the call and is
//! handed back to the caller untouched.
//!
//! ## Error Categorization
//!
//! Like an HTTP 4xx/5xx split:
//! - Input problems (the source tree's fault): syntax errors, package
//!   conflicts, unresolvable import paths, bad configuration
//! - Internal problems (infrastructure): I/O failures, tree-sitter failures
//!
//! An empty package directory is deliberately *not* an error; see
//! [`Resolution::EmptyDirectory`](crate::Resolution::EmptyDirectory).

use std::path::PathBuf;
use thiserror::Error;

use crate::position::Position;

/// Result type for pkgload operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for pkgload operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The import path could not be mapped to a directory.
    #[error("cannot find package \"{import_path}\": {reason}")]
    Resolution {
        /// The import path as requested
        import_path: String,
        /// Why resolution failed
        reason: String,
    },

    /// Reading a file or directory failed.
    #[error("{}: {source}", path.display())]
    Io {
        /// The file or directory being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A single source file failed to parse.
    #[error("{position}: {message}")]
    Syntax {
        /// Where the first problem was found
        position: Position,
        /// Human-readable description
        message: String,
    },

    /// Tree-sitter parsing infrastructure failed
    #[error("parser error: {0}")]
    Parser(String),

    /// Package identity validation was attempted on zero files.
    #[error("no files in package")]
    EmptyPackage,

    /// Two files parsed together declare different package names.
    #[error(
        "can't load package: found packages {first} ({}) and {second} ({})",
        first_file.display(),
        second_file.display()
    )]
    PackageConflict {
        /// Package name declared by the first file
        first: String,
        /// The first file
        first_file: PathBuf,
        /// Conflicting package name
        second: String,
        /// The file declaring the conflicting name
        second_file: PathBuf,
    },

    /// Files of one package live in different directories.
    #[error(
        "can't load package: found files in different directories {} and {}",
        first_dir.display(),
        second_dir.display()
    )]
    DirectoryConflict {
        /// Directory of the first file
        first_dir: PathBuf,
        /// Directory of the offending file
        second_dir: PathBuf,
    },

    /// Invalid configuration or arguments
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create an I/O error attributed to `path`.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a resolution error for `import_path`.
    #[must_use]
    pub fn resolution(import_path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolution {
            import_path: import_path.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if this is an input problem (4xx-style).
    ///
    /// Input problems are issues with the source tree or the request that the
    /// user can fix.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Resolution { .. }
                | Self::Syntax { .. }
                | Self::EmptyPackage
                | Self::PackageConflict { .. }
                | Self::DirectoryConflict { .. }
                | Self::Config(_)
        )
    }

    /// Returns `true` if this is an internal problem (5xx-style).
    #[must_use]
    pub fn is_internal_error(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Parser(_))
    }
}
