//! Package identity validation.
//!
//! Files loaded together must agree on the package they belong to: the same
//! declared name, and the same directory. The first file sets the expected
//! values; the first file that disagrees is reported together with it.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::parser::PackageClause;
use crate::position::FileSet;

/// Check that every file declares the same package and lives in the same
/// directory, and return the package name.
///
/// File names are recovered from `fset` through each file's package clause
/// position.
///
/// # Errors
///
/// - [`Error::EmptyPackage`] if `files` is empty
/// - [`Error::PackageConflict`] for the first file whose name differs from
///   the first file's
/// - [`Error::DirectoryConflict`] for the first file in another directory
pub fn validate_package_identity<F: PackageClause>(fset: &FileSet, files: &[F]) -> Result<String> {
    let Some((first, rest)) = files.split_first() else {
        return Err(Error::EmptyPackage);
    };
    let name = first.package_name();

    if let Some(other) = rest.iter().find(|f| f.package_name() != name) {
        return Err(Error::PackageConflict {
            first: name.to_string(),
            first_file: file_name(fset, first),
            second: other.package_name().to_string(),
            second_file: file_name(fset, other),
        });
    }

    let first_file = file_name(fset, first);
    let first_dir = parent_dir(&first_file);
    for other in rest {
        let other_file = file_name(fset, other);
        let other_dir = parent_dir(&other_file);
        if other_dir != first_dir {
            return Err(Error::DirectoryConflict {
                first_dir: first_dir.to_path_buf(),
                second_dir: other_dir.to_path_buf(),
            });
        }
    }

    Ok(name.to_string())
}

/// Registered name of the file holding `file`'s package clause.
///
/// Files whose clause position is not in `fset` are reported as `-`.
fn file_name<F: PackageClause>(fset: &FileSet, file: &F) -> PathBuf {
    fset.file_name(file.package_pos())
        .unwrap_or_else(|| PathBuf::from("-"))
}

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or(Path::new(""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Pos;

    struct Stub {
        name: &'static str,
        pos: Pos,
    }

    impl PackageClause for Stub {
        fn package_name(&self) -> &str {
            self.name
        }

        fn package_pos(&self) -> Pos {
            self.pos
        }
    }

    fn stub(fset: &FileSet, path: &str, name: &'static str) -> Stub {
        let content = format!("package {name}\n");
        let file = fset.add_file(path, content.as_bytes());
        Stub {
            name,
            pos: file.pos(8),
        }
    }

    #[test]
    fn empty_input_is_an_empty_package() {
        let fset = FileSet::new();
        let files: Vec<Stub> = Vec::new();

        assert!(matches!(
            validate_package_identity(&fset, &files),
            Err(Error::EmptyPackage)
        ));
    }

    #[test]
    fn agreeing_files_return_the_shared_name() {
        let fset = FileSet::new();
        let files = vec![
            stub(&fset, "/src/foo/a.go", "foo"),
            stub(&fset, "/src/foo/b.go", "foo"),
            stub(&fset, "/src/foo/c.go", "foo"),
        ];

        assert_eq!(validate_package_identity(&fset, &files).unwrap(), "foo");
    }

    #[test]
    fn single_file_is_its_own_package() {
        let fset = FileSet::new();
        let files = vec![stub(&fset, "main.go", "main")];

        assert_eq!(validate_package_identity(&fset, &files).unwrap(), "main");
    }

    #[test]
    fn conflict_names_first_file_and_first_dissenter() {
        let fset = FileSet::new();
        let files = vec![
            stub(&fset, "/src/foo/a.go", "foo"),
            stub(&fset, "/src/foo/b.go", "foo"),
            stub(&fset, "/src/foo/c.go", "bar"),
            stub(&fset, "/src/foo/d.go", "baz"),
        ];

        match validate_package_identity(&fset, &files) {
            Err(Error::PackageConflict {
                first,
                first_file,
                second,
                second_file,
            }) => {
                assert_eq!(first, "foo");
                assert_eq!(first_file, PathBuf::from("/src/foo/a.go"));
                assert_eq!(second, "bar");
                assert_eq!(second_file, PathBuf::from("/src/foo/c.go"));
            }
            other => panic!("expected package conflict, got {other:?}"),
        }
    }

    #[test]
    fn names_are_compared_exactly() {
        let fset = FileSet::new();
        let files = vec![
            stub(&fset, "/src/foo/a.go", "foo"),
            stub(&fset, "/src/foo/b.go", "Foo"),
        ];

        assert!(matches!(
            validate_package_identity(&fset, &files),
            Err(Error::PackageConflict { .. })
        ));
    }

    #[test]
    fn files_in_different_directories_conflict() {
        let fset = FileSet::new();
        let files = vec![
            stub(&fset, "/src/foo/a.go", "foo"),
            stub(&fset, "/src/foo/b.go", "foo"),
            stub(&fset, "/src/other/c.go", "foo"),
        ];

        match validate_package_identity(&fset, &files) {
            Err(Error::DirectoryConflict {
                first_dir,
                second_dir,
            }) => {
                assert_eq!(first_dir, PathBuf::from("/src/foo"));
                assert_eq!(second_dir, PathBuf::from("/src/other"));
            }
            other => panic!("expected directory conflict, got {other:?}"),
        }
    }

    #[test]
    fn name_conflict_is_reported_before_directory_conflict() {
        let fset = FileSet::new();
        let files = vec![
            stub(&fset, "/src/foo/a.go", "foo"),
            stub(&fset, "/src/other/b.go", "foo"),
            stub(&fset, "/src/foo/c.go", "bar"),
        ];

        assert!(matches!(
            validate_package_identity(&fset, &files),
            Err(Error::PackageConflict { .. })
        ));
    }

    #[test]
    fn unregistered_position_is_reported_as_dash() {
        let fset = FileSet::new();
        let files = vec![
            stub(&fset, "/src/foo/a.go", "foo"),
            Stub {
                name: "bar",
                pos: Pos::NONE,
            },
        ];

        let err = validate_package_identity(&fset, &files).unwrap_err();
        assert!(err.to_string().contains("bar (-)"));
    }
}
