//! Configuration management for pkgload.
//!
//! Configuration lives in a `pkgload.yaml` file:
//!
//! ```yaml
//! roots:
//!   - src
//!   - /opt/go/src
//! categories: [source, test]
//! check_package: true
//! ```
//!
//! Relative roots are resolved against the directory holding the file.
//! Command-line flags override whatever the file says.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::category::{Category, Selector};
use crate::error::{Error, Result};
use crate::resolver::DirResolver;

/// File name searched for by [`Config::discover`].
pub const CONFIG_FILE_NAME: &str = "pkgload.yaml";

/// Loader configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Source roots searched in order when resolving import paths
    pub roots: Vec<PathBuf>,
    /// Categories loaded when the caller does not pick any
    pub categories: Vec<Category>,
    /// Validate package identity after parsing
    pub check_package: bool,
}

impl Config {
    /// Parse configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the text is not valid configuration.
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration from a file.
    ///
    /// Relative roots are made relative to the file's directory.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and `Error::Config` if
    /// it does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut config: Self = serde_yaml::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;

        let base = path.parent().unwrap_or(Path::new(""));
        for root in &mut config.roots {
            if root.is_relative() {
                *root = base.join(&*root);
            }
        }

        debug!(
            path = %path.display(),
            roots = config.roots.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Find and load the nearest `pkgload.yaml` in `start` or its parents.
    ///
    /// Returns `Ok(None)` when no configuration file exists.
    ///
    /// # Errors
    ///
    /// Fails as [`Config::load`] does for the file that is found.
    pub fn discover(start: &Path) -> Result<Option<Self>> {
        let mut dir = Some(start);
        while let Some(current) = dir {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Self::load(&candidate).map(Some);
            }
            dir = current.parent();
        }
        debug!(start = %start.display(), "No configuration file found");
        Ok(None)
    }

    /// The configured categories, or sources only if none are configured.
    #[must_use]
    pub fn selector(&self) -> Selector {
        if self.categories.is_empty() {
            Selector::default()
        } else {
            Selector::new(self.categories.iter().copied())
        }
    }

    /// A resolver over the configured roots.
    #[must_use]
    pub fn resolver(&self) -> DirResolver {
        DirResolver::new(self.roots.iter().cloned())
    }
}
