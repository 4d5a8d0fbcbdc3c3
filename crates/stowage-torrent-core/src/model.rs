//! Completed download records as reported by the torrent client.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One completed download, rebuilt from the client response on every poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedItem {
    /// Stable identifier (the info-hash) used as the dedup key.
    #[serde(rename = "hash")]
    pub id: String,
    /// Display name; the leaf path component at both source and destination.
    pub name: String,
    /// Directory the client saved the download into.
    pub save_path: PathBuf,
    /// Category label; empty when the download is uncategorised.
    #[serde(default)]
    pub category: String,
}

impl CompletedItem {
    /// The name, when it is exactly one plain path component.
    ///
    /// Empty, absolute, `.`/`..` and multi-segment names yield `None`; joining them
    /// would point outside `save_path` or the category directory.
    #[must_use]
    pub fn leaf_name(&self) -> Option<&str> {
        let mut components = Path::new(&self.name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Some(self.name.as_str()),
            _ => None,
        }
    }

    /// Location of the download's data: `<save_path>/<name>`.
    #[must_use]
    pub fn source_path(&self) -> PathBuf {
        self.save_path.join(&self.name)
    }
}
