//! Category to destination directory mapping.
//!
//! # Design
//! - Parsed once from `category:directory` pairs separated by commas.
//! - Each pair splits on its first colon so Windows-style or URL-like paths survive.
//! - Keys are unique; a duplicate is a startup error rather than a silent overwrite.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};

/// Immutable mapping from torrent category to destination directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMap {
    entries: BTreeMap<String, PathBuf>,
}

impl CategoryMap {
    /// Parse a raw `category:directory[,category:directory...]` string.
    ///
    /// Whitespace around keys and values is trimmed and empty segments are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCategoryMap`] when an entry has no colon, an empty
    /// key or value, repeats a key, or when the string holds no entries at all.
    pub fn parse(raw: &str) -> ConfigResult<Self> {
        let mut entries = BTreeMap::new();
        for segment in raw.split(',') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let (key, value) =
                segment
                    .split_once(':')
                    .ok_or_else(|| ConfigError::InvalidCategoryMap {
                        entry: segment.to_string(),
                        reason: "missing_separator",
                    })?;
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() {
                return Err(ConfigError::InvalidCategoryMap {
                    entry: segment.to_string(),
                    reason: "empty_category",
                });
            }
            if value.is_empty() {
                return Err(ConfigError::InvalidCategoryMap {
                    entry: segment.to_string(),
                    reason: "empty_destination",
                });
            }
            if entries
                .insert(key.to_string(), PathBuf::from(value))
                .is_some()
            {
                return Err(ConfigError::InvalidCategoryMap {
                    entry: segment.to_string(),
                    reason: "duplicate_category",
                });
            }
        }

        if entries.is_empty() {
            return Err(ConfigError::InvalidCategoryMap {
                entry: raw.to_string(),
                reason: "empty",
            });
        }

        Ok(Self { entries })
    }

    /// Destination directory configured for `category`.
    #[must_use]
    pub fn get(&self, category: &str) -> Option<&Path> {
        self.entries.get(category).map(PathBuf::as_path)
    }

    /// Resolve the destination for a download: `<directory>/<name>`.
    ///
    /// Returns `None` for an unmapped category, or when `name` is not a single plain
    /// path component and would land outside the category directory.
    #[must_use]
    pub fn destination_for(&self, category: &str, name: &str) -> Option<PathBuf> {
        let mut components = Path::new(name).components();
        if !matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) {
            return None;
        }
        self.get(category).map(|dir| dir.join(name))
    }

    /// Number of configured categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no categories are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(category, directory)` pairs in category order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_path()))
    }
}
