//! Source file categories and the ordered selector over them.
//!
//! A package directory splits its Go files into three disjoint categories.
//! Callers pick which ones to load with a [`Selector`]; the order of the
//! selector is the order in which the categories' file lists are
//! concatenated before parsing.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, Result};

/// A category of source file within a package directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Non-test source files (`GoFiles`), flag `g`
    Source,
    /// `_test.go` files in the package itself (`TestGoFiles`), flag `t`
    Test,
    /// `_test.go` files in the `<pkg>_test` package (`XTestGoFiles`), flag `x`
    ExternalTest,
}

impl Category {
    /// Every category, in canonical order.
    pub const ALL: [Category; 3] = [Self::Source, Self::Test, Self::ExternalTest];

    /// Single-letter flag for this category.
    #[must_use]
    pub fn flag(self) -> char {
        match self {
            Self::Source => 'g',
            Self::Test => 't',
            Self::ExternalTest => 'x',
        }
    }

    /// Look up a category by its single-letter flag.
    #[must_use]
    pub fn from_flag(flag: char) -> Option<Self> {
        match flag {
            'g' => Some(Self::Source),
            't' => Some(Self::Test),
            'x' => Some(Self::ExternalTest),
            _ => None,
        }
    }

    /// Configuration string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Test => "test",
            Self::ExternalTest => "external-test",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered set of categories.
///
/// A category listed twice is kept only at its first position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector(Vec<Category>);

impl Selector {
    /// Build a selector, keeping the first occurrence of each category.
    pub fn new(categories: impl IntoIterator<Item = Category>) -> Self {
        let mut selected = Vec::with_capacity(Category::ALL.len());
        for category in categories {
            if !selected.contains(&category) {
                selected.push(category);
            }
        }
        Self(selected)
    }

    /// Non-test sources only.
    #[must_use]
    pub fn sources() -> Self {
        Self(vec![Category::Source])
    }

    /// Every category, in canonical order.
    #[must_use]
    pub fn all() -> Self {
        Self(Category::ALL.to_vec())
    }

    /// Build a selector from a flag string such as `"gt"`.
    ///
    /// Meant for flag strings written into the program. Use
    /// [`str::parse`] for flags that come from users.
    ///
    /// # Panics
    ///
    /// Panics on a character that is not one of `g`, `t`, `x`.
    #[must_use]
    pub fn from_flags(flags: &str) -> Self {
        Self::new(flags.chars().map(|c| match Category::from_flag(c) {
            Some(category) => category,
            None => panic!("unknown source category flag {c:?}"),
        }))
    }

    /// The selected categories in selection order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.0
    }

    /// Returns `true` if nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flag string for this selector, e.g. `"gx"`.
    #[must_use]
    pub fn flags(&self) -> String {
        self.0.iter().map(|c| c.flag()).collect()
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self::sources()
    }
}

impl FromStr for Selector {
    type Err = Error;

    fn from_str(flags: &str) -> Result<Self> {
        let categories = flags
            .chars()
            .map(|c| {
                Category::from_flag(c).ok_or_else(|| {
                    Error::Config(format!(
                        "unknown source category flag '{c}' in \"{flags}\" (expected g, t or x)"
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(categories))
    }
}

impl<'a> IntoIterator for &'a Selector {
    type Item = &'a Category;
    type IntoIter = std::slice::Iter<'a, Category>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::sources_only("g", &[Category::Source])]
    #[case::tests_first("tg", &[Category::Test, Category::Source])]
    #[case::all("gtx", &[Category::Source, Category::Test, Category::ExternalTest])]
    #[case::external_only("x", &[Category::ExternalTest])]
    #[case::duplicate_kept_once("gxg", &[Category::Source, Category::ExternalTest])]
    #[case::empty("", &[])]
    fn from_flags_preserves_order(#[case] flags: &str, #[case] expected: &[Category]) {
        assert_eq!(Selector::from_flags(flags).categories(), expected);
    }

    #[test]
    #[should_panic(expected = "unknown source category flag 'q'")]
    fn from_flags_panics_on_unknown_flag() {
        let _ = Selector::from_flags("gq");
    }

    #[test]
    fn parse_rejects_unknown_flag_with_config_error() {
        let err = "gz".parse::<Selector>().unwrap_err();

        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("'z'"));
    }

    #[test]
    fn flags_round_trip() {
        let selector: Selector = "xt".parse().expect("valid flags");
        assert_eq!(selector.flags(), "xt");
    }

    #[test]
    fn flag_lookup_is_inverse_of_flag() {
        for category in Category::ALL {
            assert_eq!(Category::from_flag(category.flag()), Some(category));
        }
        assert_eq!(Category::from_flag('G'), None);
    }

    #[test]
    fn default_selects_sources() {
        assert_eq!(Selector::default(), Selector::sources());
        assert!(!Selector::default().is_empty());
    }
}
