//! Position registry shared by every parse task.
//!
//! A [`FileSet`] hands each registered file a contiguous range of absolute
//! positions. Positions are plain integers ([`Pos`]) so syntax trees can carry
//! them cheaply; the registry translates them back to a file name, line and
//! column on demand.
//!
//! ## Layout
//!
//! ```text
//!  0        1                 1+size_a+1            ...
//!  │NONE│   │ a.go (size_a)  │ │ b.go (size_b)     │ │
//! ```
//!
//! Bases start at 1 and every file reserves one extra slot past its end, so
//! no two files ever share a position and `Pos::NONE` never belongs to a file.
//!
//! The registry is append-only. Registration takes a write lock for the few
//! instructions needed to reserve a base; lookups take a read lock.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::trace;

/// An absolute position inside a [`FileSet`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos(usize);

impl Pos {
    /// The zero position, which never belongs to any file.
    pub const NONE: Pos = Pos(0);

    /// Wrap a raw absolute position.
    #[must_use]
    pub fn new(raw: usize) -> Self {
        Self(raw)
    }

    /// Extract the raw value.
    #[must_use]
    pub fn as_usize(self) -> usize {
        self.0
    }

    /// Returns `true` unless this is [`Pos::NONE`].
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl From<usize> for Pos {
    fn from(raw: usize) -> Self {
        Self(raw)
    }
}

/// A position resolved to a file, line and column.
///
/// Lines and columns are 1-indexed; the column counts bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// Name the file was registered under
    pub filename: PathBuf,
    /// Byte offset from the start of the file (0-indexed)
    pub offset: usize,
    /// Line number (1-indexed)
    pub line: usize,
    /// Byte column (1-indexed)
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename.display(), self.line, self.column)
    }
}

/// Returns `true` if `pos` lies inside the half-open span `[base, base + size)`.
#[must_use]
pub fn contains(base: usize, size: usize, pos: usize) -> bool {
    pos >= base && pos - base < size
}

/// One file registered in a [`FileSet`].
#[derive(Debug)]
pub struct FileEntry {
    name: PathBuf,
    base: usize,
    size: usize,
    /// Byte offset of the first character of each line.
    lines: Vec<usize>,
}

impl FileEntry {
    /// The name the file was registered under.
    #[must_use]
    pub fn name(&self) -> &Path {
        &self.name
    }

    /// First absolute position of the file.
    #[must_use]
    pub fn base(&self) -> Pos {
        Pos(self.base)
    }

    /// File size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of lines in the file.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if `pos` belongs to this file.
    #[must_use]
    pub fn contains(&self, pos: Pos) -> bool {
        contains(self.base, self.size, pos.0)
    }

    /// Absolute position of a byte offset in this file.
    ///
    /// Offsets past the end are clamped to the end of the file.
    #[must_use]
    pub fn pos(&self, offset: usize) -> Pos {
        Pos(self.base + offset.min(self.size))
    }

    /// Byte offset of an absolute position, if it belongs to this file.
    #[must_use]
    pub fn offset(&self, pos: Pos) -> Option<usize> {
        self.contains(pos).then(|| pos.0 - self.base)
    }

    /// Resolve an absolute position in this file.
    #[must_use]
    pub fn position(&self, pos: Pos) -> Option<Position> {
        self.offset(pos).map(|offset| self.position_at(offset))
    }

    /// Resolve a byte offset in this file.
    ///
    /// Unlike [`position`](Self::position) this also accepts the offset one
    /// past the last byte, which is where end-of-file diagnostics point.
    #[must_use]
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.size);
        let (line, column) = match self.lines.partition_point(|&start| start <= offset) {
            0 => (1, offset + 1),
            n => (n, offset - self.lines[n - 1] + 1),
        };
        Position {
            filename: self.name.clone(),
            offset,
            line,
            column,
        }
    }
}

/// Line start offsets. A trailing newline does not open a new line.
fn line_starts(content: &[u8]) -> Vec<usize> {
    if content.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![0];
    lines.extend(
        content
            .iter()
            .enumerate()
            .filter(|&(i, &b)| b == b'\n' && i + 1 < content.len())
            .map(|(i, _)| i + 1),
    );
    lines
}

#[derive(Debug)]
struct Registry {
    next_base: usize,
    files: Vec<Arc<FileEntry>>,
}

/// Append-only, thread-safe registry of parsed files.
///
/// Shared by reference between concurrent parse tasks. Entries are never
/// removed, so a position handed out once stays resolvable for the lifetime
/// of the set.
#[derive(Debug)]
pub struct FileSet {
    inner: RwLock<Registry>,
}

impl Default for FileSet {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSet {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Registry {
                next_base: 1,
                files: Vec::new(),
            }),
        }
    }

    /// Register a file and reserve a position range for it.
    pub fn add_file(&self, name: impl Into<PathBuf>, content: &[u8]) -> Arc<FileEntry> {
        let name = name.into();
        let lines = line_starts(content);

        // Entries are pushed fully built, so a poisoned lock never exposes a
        // half-written registry.
        let mut registry = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let base = registry.next_base;
        let entry = Arc::new(FileEntry {
            name,
            base,
            size: content.len(),
            lines,
        });
        registry.next_base = base + content.len() + 1;
        registry.files.push(Arc::clone(&entry));
        drop(registry);

        trace!(
            file = %entry.name.display(),
            base,
            size = entry.size,
            "Registered file"
        );
        entry
    }

    /// The base the next registered file will receive.
    #[must_use]
    pub fn base(&self) -> Pos {
        Pos(self.read().next_base)
    }

    /// Number of registered files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().files.len()
    }

    /// Returns `true` if no file has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().files.is_empty()
    }

    /// Find the file a position belongs to.
    #[must_use]
    pub fn file(&self, pos: Pos) -> Option<Arc<FileEntry>> {
        let registry = self.read();
        // Bases increase with registration order, so the list is sorted.
        let idx = registry.files.partition_point(|f| f.base <= pos.0);
        let entry = registry.files.get(idx.checked_sub(1)?)?;
        entry.contains(pos).then(|| Arc::clone(entry))
    }

    /// Name of the file a position belongs to.
    #[must_use]
    pub fn file_name(&self, pos: Pos) -> Option<PathBuf> {
        self.file(pos).map(|f| f.name.clone())
    }

    /// Resolve a position to file, line and column.
    #[must_use]
    pub fn position(&self, pos: Pos) -> Option<Position> {
        self.file(pos).and_then(|f| f.position(pos))
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Registry> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use std::thread;

    #[rstest]
    #[case::first_byte(100, true)]
    #[case::last_byte(109, true)]
    #[case::one_past_end(110, false)]
    #[case::one_before_base(99, false)]
    fn contains_is_half_open(#[case] pos: usize, #[case] expected: bool) {
        assert_eq!(contains(100, 10, pos), expected);
    }

    #[test]
    fn contains_is_false_for_empty_file() {
        assert!(!contains(5, 0, 5));
    }

    #[test]
    fn bases_start_at_one_and_leave_a_gap() {
        let fset = FileSet::new();

        let a = fset.add_file("a.go", b"package a\n");
        let b = fset.add_file("b.go", b"package b\n");

        assert_eq!(a.base(), Pos::new(1));
        assert_eq!(b.base(), Pos::new(1 + 10 + 1));
        assert_eq!(fset.base(), Pos::new(b.base().as_usize() + 10 + 1));
        assert_eq!(fset.len(), 2);
    }

    #[test]
    fn none_position_belongs_to_no_file() {
        let fset = FileSet::new();
        fset.add_file("a.go", b"package a\n");

        assert!(!Pos::NONE.is_valid());
        assert!(fset.file(Pos::NONE).is_none());
    }

    #[test]
    fn file_lookup_finds_owner_and_rejects_gap() {
        let fset = FileSet::new();
        let a = fset.add_file("a.go", b"package a\n");
        let b = fset.add_file("b.go", b"package b\n");

        let in_a = a.pos(3);
        let in_b = b.pos(0);
        let gap = Pos::new(a.base().as_usize() + a.size());

        assert_eq!(fset.file_name(in_a), Some(PathBuf::from("a.go")));
        assert_eq!(fset.file_name(in_b), Some(PathBuf::from("b.go")));
        assert!(fset.file(gap).is_none());
    }

    #[test]
    fn position_reports_line_and_column() {
        let fset = FileSet::new();
        let f = fset.add_file("p/main.go", b"package main\n\nfunc main() {}\n");

        let pos = f.pos(19); // "main" in func main
        let position = fset.position(pos).expect("position should resolve");

        assert_eq!(position.line, 3);
        assert_eq!(position.column, 6);
        assert_eq!(position.to_string(), "p/main.go:3:6");
    }

    #[test]
    fn trailing_newline_does_not_add_a_line() {
        let fset = FileSet::new();
        let f = fset.add_file("a.go", b"package a\n");

        assert_eq!(f.line_count(), 1);
        assert_eq!(f.position_at(10).line, 1);
        assert_eq!(f.position_at(10).column, 11);
    }

    #[test]
    fn empty_file_positions_resolve_to_line_one() {
        let fset = FileSet::new();
        let f = fset.add_file("empty.go", b"");

        assert_eq!(f.line_count(), 0);
        let position = f.position_at(0);
        assert_eq!((position.line, position.column), (1, 1));
    }

    #[test]
    fn concurrent_registration_assigns_disjoint_ranges() {
        let fset = Arc::new(FileSet::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let fset = Arc::clone(&fset);
                thread::spawn(move || {
                    let content = "x".repeat(i * 7 + 1);
                    fset.add_file(format!("f{i}.go"), content.as_bytes())
                })
            })
            .collect();

        let mut entries: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        entries.sort_by_key(|e| e.base());

        assert_eq!(fset.len(), 8);
        for pair in entries.windows(2) {
            assert!(pair[0].base().as_usize() + pair[0].size() < pair[1].base().as_usize());
        }
        for entry in &entries {
            assert_eq!(fset.file_name(entry.base()).as_deref(), Some(entry.name()));
        }
    }

    proptest! {
        #[test]
        fn contains_matches_range(base in 0usize..10_000, size in 0usize..1_000, pos in 0usize..12_000) {
            prop_assert_eq!(contains(base, size, pos), (base..base + size).contains(&pos));
        }

        #[test]
        fn position_agrees_with_newline_count(content in "[a-z \n]{1,200}", offset in 0usize..200) {
            let fset = FileSet::new();
            let f = fset.add_file("p.go", content.as_bytes());
            let offset = offset.min(content.len() - 1);

            let position = fset.position(f.pos(offset)).expect("offset is inside the file");
            let before = &content[..offset];
            let expected_line = before.matches('\n').count() + 1;
            let expected_column = offset - before.rfind('\n').map_or(0, |i| i + 1) + 1;

            prop_assert_eq!(position.line, expected_line);
            prop_assert_eq!(position.column, expected_column);
        }
    }
}
