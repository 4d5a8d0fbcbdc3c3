//! Scratch directories and payload trees for filesystem-heavy tests.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Create a scratch directory with a recognisable prefix.
///
/// # Errors
///
/// Returns an error if the temporary directory cannot be created.
pub fn temp_dir(prefix: &str) -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .context("failed to create scratch directory")
}

/// Write `contents` to `root/relative`, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if a directory or the file cannot be written.
pub fn write_file(root: &Path, relative: &str, contents: &[u8]) -> Result<PathBuf> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Lay out a completed download named `name` under `save_path`, one file per entry.
///
/// # Errors
///
/// Returns an error if any payload file cannot be written.
pub fn payload_tree(save_path: &Path, name: &str, files: &[(&str, &[u8])]) -> Result<PathBuf> {
    let root = save_path.join(name);
    fs::create_dir_all(&root).with_context(|| format!("failed to create {}", root.display()))?;
    for (relative, contents) in files {
        write_file(&root, relative, contents)?;
    }
    Ok(root)
}

/// Count regular files beneath `root`, recursively.
///
/// # Errors
///
/// Returns an error if a directory cannot be read.
pub fn count_files(root: &Path) -> Result<usize> {
    if !root.exists() {
        return Ok(0);
    }
    let mut total = 0;
    for entry in fs::read_dir(root).with_context(|| format!("failed to read {}", root.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            total += count_files(&path)?;
        } else {
            total += 1;
        }
    }
    Ok(total)
}
