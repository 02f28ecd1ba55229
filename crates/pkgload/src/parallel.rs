//! Parallel multi-file parsing.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          parse_all                           │
//! ├──────────────────────────────────────────────────────────────┤
//! │  1. Resolve:   relative names joined onto the directory      │
//! │  2. Fan out:   rayon::par_iter(), one parse task per file    │
//! │  3. Join:      indexed collect, slot i <- file i             │
//! │  4. Select:    first Err in index order, else all trees      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Completion order never leaks into the result. Output order and the choice
//! of error both follow input order: if files 0 and 1 both fail, file 0's
//! error is returned even when file 1 failed first.
//!
//! There is no timeout or cancellation. Every task runs to completion before
//! the result is inspected, so one stuck file stalls the whole call.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::parser::SourceParser;
use crate::position::FileSet;

/// Parse `filenames` concurrently and return their trees in input order.
///
/// Relative names are resolved against `dir`; absolute names are used as-is.
/// An empty list yields an empty vector.
///
/// # Errors
///
/// Returns the error of the lowest-indexed file that failed. No partial
/// results are returned.
pub fn parse_all<P, S>(
    fset: &FileSet,
    parser: &P,
    dir: &Path,
    filenames: &[S],
) -> Result<Vec<P::File>>
where
    P: SourceParser,
    S: AsRef<Path>,
{
    if filenames.is_empty() {
        return Ok(Vec::new());
    }

    let start = Instant::now();
    let paths: Vec<PathBuf> = filenames
        .iter()
        .map(|f| resolve_path(dir, f.as_ref()))
        .collect();

    // Indexed collect: slot i always holds the outcome for paths[i].
    let slots: Vec<Result<P::File>> = paths
        .par_iter()
        .map(|path| parser.parse_file(fset, path))
        .collect();

    let failed = slots.iter().filter(|s| s.is_err()).count();
    debug!(
        dir = %dir.display(),
        files = paths.len(),
        failed,
        elapsed = ?start.elapsed(),
        "Parsed files"
    );

    slots.into_iter().collect()
}

/// Join a relative filename onto `dir`; absolute filenames pass through.
#[must_use]
pub fn resolve_path(dir: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        dir.join(file)
    }
}
