//! Single-file parsing.
//!
//! The loader only needs two things from a parsed file: the package name it
//! declares and where that declaration sits. [`PackageClause`] captures that
//! view, and [`SourceParser`] turns a path into such a file while registering
//! it in the shared [`FileSet`].
//!
//! [`GoParser`] is the shipped implementation, built on the tree-sitter Go
//! grammar.
//!
//! ## Design
//!
//! Tree-sitter parsers are stateful and not `Sync`, while a `SourceParser` is
//! shared by every parse task. `GoParser` therefore builds a fresh
//! `tree_sitter::Parser` per file; construction is cheap next to the parse.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::trace;
use tree_sitter::{Node, Tree};

use crate::error::{Error, Result};
use crate::position::{FileEntry, FileSet, Pos};

/// The package declaration of a parsed file.
pub trait PackageClause {
    /// Declared package name.
    fn package_name(&self) -> &str;

    /// Position of the package name, registered in the loader's [`FileSet`].
    fn package_pos(&self) -> Pos;
}

/// Parses one file into a syntax tree.
///
/// Implementations must register the file in `fset` before or during the
/// parse so that positions inside the returned tree resolve. A parser is
/// shared across concurrent parse tasks, hence the `Sync` bound.
pub trait SourceParser: Sync {
    /// The syntax tree produced for one file.
    type File: PackageClause + Send;

    /// Parse the file at `path`.
    fn parse_file(&self, fset: &FileSet, path: &Path) -> Result<Self::File>;
}

/// An identifier with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    /// Identifier text
    pub name: String,
    /// Position of the first byte
    pub pos: Pos,
}

/// A parsed Go source file.
pub struct SourceFile {
    file: Arc<FileEntry>,
    source: String,
    tree: Tree,
    package: Ident,
}

impl SourceFile {
    /// Path the file was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.name()
    }

    /// Registry entry for this file.
    #[must_use]
    pub fn file(&self) -> &Arc<FileEntry> {
        &self.file
    }

    /// Full source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The tree-sitter syntax tree.
    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Root `source_file` node.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// The package name declaration.
    #[must_use]
    pub fn package(&self) -> &Ident {
        &self.package
    }

    /// Absolute position of a node's first byte.
    #[must_use]
    pub fn node_pos(&self, node: &Node<'_>) -> Pos {
        self.file.pos(node.start_byte())
    }

    /// Source text covered by a node.
    #[must_use]
    pub fn node_text(&self, node: &Node<'_>) -> &str {
        self.source.get(node.byte_range()).unwrap_or_default()
    }
}

impl PackageClause for SourceFile {
    fn package_name(&self) -> &str {
        &self.package.name
    }

    fn package_pos(&self) -> Pos {
        self.package.pos
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("path", &self.path())
            .field("package", &self.package)
            .field("size", &self.source.len())
            .finish_non_exhaustive()
    }
}

/// Go parser backed by `tree-sitter-go`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoParser;

impl GoParser {
    /// Create a Go parser.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse in-memory content as if it had been read from `path`.
    ///
    /// The content is registered in `fset` under `path` before parsing.
    ///
    /// # Errors
    ///
    /// Returns `Error::Syntax` for invalid UTF-8, for the first error or
    /// missing node in the tree, and for a missing or blank package clause.
    /// Returns `Error::Parser` if tree-sitter cannot be set up.
    pub fn parse_source(&self, fset: &FileSet, path: &Path, content: &[u8]) -> Result<SourceFile> {
        let file = fset.add_file(path, content);

        let source = match std::str::from_utf8(content) {
            Ok(s) => s.to_string(),
            Err(e) => {
                return Err(Error::Syntax {
                    position: file.position_at(e.valid_up_to()),
                    message: "invalid UTF-8 encoding".to_string(),
                });
            }
        };

        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|e| Error::Parser(e.to_string()))?;
        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| Error::Parser(format!("failed to parse {}", path.display())))?;

        let root = tree.root_node();
        if let Some(node) = first_error(root) {
            return Err(Error::Syntax {
                position: file.position_at(node.start_byte()),
                message: describe_error(&node, &source),
            });
        }

        let package = package_ident(root, &source, &file)?;
        trace!(
            file = %path.display(),
            package = %package.name,
            "Parsed file"
        );

        Ok(SourceFile {
            file,
            source,
            tree,
            package,
        })
    }
}

impl SourceParser for GoParser {
    type File = SourceFile;

    fn parse_file(&self, fset: &FileSet, path: &Path) -> Result<SourceFile> {
        let content = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        self.parse_source(fset, path, &content)
    }
}

/// Find the package clause, which must be the first declaration.
fn package_ident(root: Node<'_>, source: &str, file: &FileEntry) -> Result<Ident> {
    let mut cursor = root.walk();
    let first = root
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment");

    let clause = match first {
        Some(node) if node.kind() == "package_clause" => node,
        other => {
            let offset = other.map_or(source.len(), |n| n.start_byte());
            return Err(Error::Syntax {
                position: file.position_at(offset),
                message: "expected 'package'".to_string(),
            });
        }
    };

    let mut cursor = clause.walk();
    let ident = clause
        .named_children(&mut cursor)
        .find(|n| n.kind() == "package_identifier")
        .ok_or_else(|| Error::Syntax {
            position: file.position_at(clause.end_byte()),
            message: "expected package name".to_string(),
        })?;

    let name = source.get(ident.byte_range()).unwrap_or_default();
    if name == "_" {
        return Err(Error::Syntax {
            position: file.position_at(ident.start_byte()),
            message: "invalid package name _".to_string(),
        });
    }

    Ok(Ident {
        name: name.to_string(),
        pos: file.pos(ident.start_byte()),
    })
}

/// First error or missing node in document order.
///
/// Walks with a cursor instead of recursing so that deeply nested input
/// cannot exhaust the worker's stack. Subtrees without errors are skipped.
fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

fn describe_error(node: &Node<'_>, source: &str) -> String {
    if node.is_missing() {
        return format!("missing {}", node.kind());
    }
    let text = source.get(node.byte_range()).unwrap_or_default();
    match text.split_whitespace().next() {
        Some(token) => format!("unexpected {token}"),
        None => "syntax error".to_string(),
    }
}

/// Strip any enclosing parentheses from an expression node.
#[must_use]
pub fn unparen(mut node: Node<'_>) -> Node<'_> {
    while node.kind() == "parenthesized_expression" {
        let mut cursor = node.walk();
        let inner = node
            .named_children(&mut cursor)
            .find(|n| n.kind() != "comment");
        match inner {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}
