//! JSON-backed set of torrent ids that have been copied successfully.
//!
//! # Design
//! - The file holds a sorted JSON array of id strings and is rewritten in full.
//! - Writes go to a temporary file in the same directory and are renamed into place,
//!   so readers never observe a half-written cache.
//! - The set only grows; nothing is ever evicted.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{CacheError, CacheResult};

/// Processed-id set plus the file it is persisted to.
#[derive(Debug, Clone)]
pub struct DedupCache {
    path: PathBuf,
    ids: BTreeSet<String>,
}

impl DedupCache {
    /// Load the cache from `path`.
    ///
    /// A missing file is initialised to `[]` (parent directories included). A file that
    /// does not decode as an array of strings is logged and reset to `[]`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if the file cannot be read or the initial empty cache
    /// cannot be written.
    pub fn load(path: impl Into<PathBuf>) -> CacheResult<Self> {
        let mut cache = Self {
            path: path.into(),
            ids: BTreeSet::new(),
        };

        match fs::read(&cache.path) {
            Ok(raw) => match serde_json::from_slice::<Vec<String>>(&raw) {
                Ok(ids) => {
                    cache.ids = ids.into_iter().collect();
                    info!(
                        path = %cache.path.display(),
                        entries = cache.ids.len(),
                        "loaded dedup cache"
                    );
                }
                Err(err) => {
                    warn!(
                        path = %cache.path.display(),
                        error = %err,
                        "dedup cache is corrupt; starting from an empty set"
                    );
                    cache.persist()?;
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(path = %cache.path.display(), "initialising empty dedup cache");
                cache.persist()?;
            }
            Err(err) => return Err(CacheError::io("load.read", &cache.path, err)),
        }

        Ok(cache)
    }

    /// Backing file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `id` has already been processed.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Record `id` in memory. Returns `false` if it was already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    /// Number of processed ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no id has been processed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Processed ids in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Rewrite the backing file with the current set.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the directory, temporary file, or final rename fails.
    pub fn persist(&self) -> CacheResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|err| CacheError::io("persist.create_dir", dir, err))?;

        let encoded = serde_json::to_vec(&self.ids).map_err(|source| CacheError::Encode {
            path: self.path.clone(),
            source,
        })?;

        let mut staged =
            NamedTempFile::new_in(dir).map_err(|err| CacheError::io("persist.tempfile", dir, err))?;
        staged
            .write_all(&encoded)
            .map_err(|err| CacheError::io("persist.write", staged.path(), err))?;
        staged
            .as_file()
            .sync_all()
            .map_err(|err| CacheError::io("persist.sync", staged.path(), err))?;
        staged
            .persist(&self.path)
            .map_err(|err| CacheError::io("persist.rename", &self.path, err.error))?;

        debug!(path = %self.path.display(), entries = self.ids.len(), "persisted dedup cache");
        Ok(())
    }
}
