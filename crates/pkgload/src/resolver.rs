//! Import path resolution and source file classification.
//!
//! A [`SourceSetResolver`] maps an import path to a package directory and
//! splits the directory's Go files into the three [`Category`] lists.
//! [`DirResolver`] does this by searching a list of source roots, much like
//! `GOPATH` lookup:
//!
//! ```text
//! roots = [/home/me/go/src, /opt/go/src]
//! "example.com/foo"  ->  /home/me/go/src/example.com/foo   (first hit wins)
//! ```
//!
//! Classification only reads each file's header (package clause and
//! imports). Full parsing is the parser's job.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::category::{Category, Selector};
use crate::error::{Error, Result};

/// The files of one package directory, split by category.
///
/// Each list holds bare file names, sorted, relative to `dir`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet {
    /// The import path that was resolved
    pub import_path: String,
    /// Package directory
    pub dir: PathBuf,
    /// Non-test sources
    pub sources: Vec<String>,
    /// In-package `_test.go` files
    pub tests: Vec<String>,
    /// `_test.go` files declaring the external `<pkg>_test` package
    pub external_tests: Vec<String>,
    /// Go files excluded from every category (cgo is disabled)
    pub ignored: Vec<String>,
}

impl SourceSet {
    /// The file list of one category.
    #[must_use]
    pub fn files(&self, category: Category) -> &[String] {
        match category {
            Category::Source => &self.sources,
            Category::Test => &self.tests,
            Category::ExternalTest => &self.external_tests,
        }
    }

    /// Concatenate the selected categories' files in selector order.
    #[must_use]
    pub fn select(&self, selector: &Selector) -> Vec<String> {
        selector
            .categories()
            .iter()
            .flat_map(|&c| self.files(c).iter().cloned())
            .collect()
    }

    /// Returns `true` if no category holds a file.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|&c| self.files(c).is_empty())
    }
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The directory holds Go source.
    Found(SourceSet),
    /// The directory exists but holds no Go source in any category.
    ///
    /// This is not a failure; callers decide what an empty package means.
    EmptyDirectory {
        /// The directory that was searched
        dir: PathBuf,
    },
}

/// Maps an import path to a categorized set of source files.
pub trait SourceSetResolver {
    /// Resolve `import_path`.
    ///
    /// Returns [`Error::Resolution`] when no directory matches and
    /// [`Error::Io`] when the directory cannot be read.
    fn resolve(&self, import_path: &str) -> Result<Resolution>;
}

/// Resolver that searches a list of source roots in order.
#[derive(Debug, Clone, Default)]
pub struct DirResolver {
    roots: Vec<PathBuf>,
}

impl DirResolver {
    /// Create a resolver over the given source roots.
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// The configured source roots, in search order.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Find the package directory for `import_path`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Resolution` if the import path is malformed or no
    /// root contains it.
    pub fn find_dir(&self, import_path: &str) -> Result<PathBuf> {
        check_import_path(import_path)?;

        if let Some(dir) = self
            .roots
            .iter()
            .map(|root| root.join(import_path))
            .find(|dir| dir.is_dir())
        {
            return Ok(dir);
        }

        let searched = self
            .roots
            .iter()
            .map(|root| format!("\t{}", root.join(import_path).display()))
            .collect::<Vec<_>>();
        let reason = if searched.is_empty() {
            "no source roots configured".to_string()
        } else {
            format!("not found in any of:\n{}", searched.join("\n"))
        };
        Err(Error::resolution(import_path, reason))
    }

    /// Classify the Go files of a package directory.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the directory or one of its Go files cannot
    /// be read.
    pub fn scan_dir(import_path: &str, dir: &Path) -> Result<Resolution> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(
                        directory = %dir.display(),
                        error = %e,
                        "Failed to read directory entry, skipping"
                    );
                    continue;
                }
            };
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                warn!(
                    file = %path.display(),
                    "Skipping file with non-UTF-8 name"
                );
                continue;
            };
            if is_go_file(name) && path.is_file() {
                names.push(name.to_string());
            }
        }
        names.sort();

        let mut set = SourceSet {
            import_path: import_path.to_string(),
            dir: dir.to_path_buf(),
            ..SourceSet::default()
        };

        for name in names {
            let path = dir.join(&name);
            let content = std::fs::read(&path).map_err(|e| Error::io(&path, e))?;
            let header = Header::scan(&String::from_utf8_lossy(&content));

            if name.ends_with("_test.go") {
                if header.package.is_some_and(|p| p.ends_with("_test")) {
                    set.external_tests.push(name);
                } else {
                    set.tests.push(name);
                }
            } else if header.imports.iter().any(|i| i == "C") {
                debug!(file = %path.display(), "Ignoring cgo file");
                set.ignored.push(name);
            } else {
                set.sources.push(name);
            }
        }

        debug!(
            import_path,
            dir = %dir.display(),
            sources = set.sources.len(),
            tests = set.tests.len(),
            external_tests = set.external_tests.len(),
            ignored = set.ignored.len(),
            "Scanned package directory"
        );

        if set.is_empty() {
            return Ok(Resolution::EmptyDirectory {
                dir: dir.to_path_buf(),
            });
        }
        Ok(Resolution::Found(set))
    }
}

impl SourceSetResolver for DirResolver {
    fn resolve(&self, import_path: &str) -> Result<Resolution> {
        let dir = self.find_dir(import_path)?;
        Self::scan_dir(import_path, &dir)
    }
}

/// Reject empty, absolute and local import paths.
fn check_import_path(import_path: &str) -> Result<()> {
    if import_path.is_empty() {
        return Err(Error::resolution(import_path, "empty import path"));
    }
    let path = Path::new(import_path);
    if path.is_absolute() || import_path.starts_with('/') {
        return Err(Error::resolution(
            import_path,
            "import path must not be absolute",
        ));
    }
    if path
        .components()
        .next()
        .is_some_and(|c| matches!(c, Component::CurDir | Component::ParentDir))
    {
        return Err(Error::resolution(
            import_path,
            "local import paths are not supported",
        ));
    }
    if import_path.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
        return Err(Error::resolution(import_path, "invalid import path"));
    }
    Ok(())
}

/// A `.go` file the toolchain would look at.
fn is_go_file(name: &str) -> bool {
    name.ends_with(".go") && !name.starts_with('_') && !name.starts_with('.')
}

/// Package clause and imports read from the top of a file.
#[derive(Debug, Default, PartialEq, Eq)]
struct Header {
    package: Option<String>,
    imports: Vec<String>,
}

impl Header {
    fn scan(src: &str) -> Self {
        let src = src.strip_prefix('\u{FEFF}').unwrap_or(src);
        let mut scanner = Scanner { rest: src };
        let mut header = Header::default();

        if scanner.word() != Some("package") {
            return header;
        }
        let Some(name) = scanner.word() else {
            return header;
        };
        header.package = Some(name.to_string());

        loop {
            if scanner.semicolon() {
                continue;
            }
            if !scanner.word_if("import") {
                break;
            }
            if scanner.punct('(') {
                while !scanner.punct(')') {
                    if scanner.semicolon() {
                        continue;
                    }
                    match scanner.import_spec() {
                        Some(path) => header.imports.push(path.to_string()),
                        None => return header,
                    }
                }
            } else if let Some(path) = scanner.import_spec() {
                header.imports.push(path.to_string());
            } else {
                break;
            }
        }
        header
    }
}

/// Minimal tokenizer over whitespace, comments, identifiers and strings.
struct Scanner<'a> {
    rest: &'a str,
}

impl<'a> Scanner<'a> {
    fn skip_trivia(&mut self) {
        loop {
            self.rest = self.rest.trim_start();
            if let Some(after) = self.rest.strip_prefix("//") {
                self.rest = after.find('\n').map_or("", |i| &after[i..]);
            } else if let Some(after) = self.rest.strip_prefix("/*") {
                self.rest = after.find("*/").map_or("", |i| &after[i + 2..]);
            } else {
                return;
            }
        }
    }

    fn word(&mut self) -> Option<&'a str> {
        self.skip_trivia();
        let end = self
            .rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(self.rest.len());
        if end == 0 {
            return None;
        }
        let (word, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(word)
    }

    fn word_if(&mut self, expected: &str) -> bool {
        let saved = self.rest;
        if self.word() == Some(expected) {
            return true;
        }
        self.rest = saved;
        false
    }

    fn punct(&mut self, c: char) -> bool {
        self.skip_trivia();
        match self.rest.strip_prefix(c) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn semicolon(&mut self) -> bool {
        self.punct(';')
    }

    fn string(&mut self) -> Option<&'a str> {
        self.skip_trivia();
        let quote = self.rest.chars().next().filter(|&c| c == '"' || c == '`')?;
        let body = &self.rest[1..];
        let end = body.find(quote)?;
        self.rest = &body[end + 1..];
        Some(&body[..end])
    }

    /// `[name | .] "path"`
    fn import_spec(&mut self) -> Option<&'a str> {
        if !self.punct('.') {
            let saved = self.rest;
            if self.word().is_none() {
                self.rest = saved;
            }
        }
        self.string()
    }
}
