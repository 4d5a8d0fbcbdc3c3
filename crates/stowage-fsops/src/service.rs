//! Copy engine for completed downloads.
//!
//! # Design
//! - Copies only; the source is never moved or deleted.
//! - Directory sources are merged into the destination: existing files at the same
//!   relative path are overwritten, unrelated files are left alone.
//! - File access and modification times follow the source where the platform allows.

use std::fs::{self, File, FileTimes, Metadata};
use std::io;
use std::path::Path;

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{FsOpsError, FsOpsResult};

/// Summary of a finished copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyReport {
    /// Regular files written.
    pub files: u64,
    /// Bytes written across all files.
    pub bytes: u64,
}

/// Stateless copy engine; cheap to clone into blocking tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyEngine;

impl CopyEngine {
    /// Construct a copy engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Copy `source` into `destination`, creating the destination as needed.
    ///
    /// A file source lands at `destination/<file name>`; a directory source has its
    /// contents merged into `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::SourceMissing`] when `source` does not exist (nothing is
    /// created in that case) and an IO or walk error for any failure during the copy.
    pub fn copy_item(&self, source: &Path, destination: &Path) -> FsOpsResult<CopyReport> {
        let source_meta = match fs::metadata(source) {
            Ok(meta) => meta,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(FsOpsError::SourceMissing {
                    path: source.to_path_buf(),
                });
            }
            Err(err) => return Err(FsOpsError::io("copy_item.stat_source", source, err)),
        };

        fs::create_dir_all(destination)
            .map_err(|err| FsOpsError::io("copy_item.create_destination", destination, err))?;

        let report = if source_meta.is_dir() {
            Self::copy_tree(source, destination)?
        } else {
            let file_name = source.file_name().ok_or_else(|| FsOpsError::InvalidInput {
                field: "source_path",
                reason: "no_file_name",
                value: Some(source.to_string_lossy().into_owned()),
            })?;
            let target = destination.join(file_name);
            let bytes = copy_file(source, &source_meta, &target)?;
            CopyReport { files: 1, bytes }
        };

        info!(
            source = %source.display(),
            destination = %destination.display(),
            files = report.files,
            bytes = report.bytes,
            "copy finished"
        );
        Ok(report)
    }

    fn copy_tree(source: &Path, destination: &Path) -> FsOpsResult<CopyReport> {
        let mut report = CopyReport::default();
        for entry in WalkDir::new(source).follow_links(true) {
            let entry =
                entry.map_err(|source_err| FsOpsError::walkdir("copy_tree.walk", source, source_err))?;
            let relative =
                entry
                    .path()
                    .strip_prefix(source)
                    .map_err(|_| FsOpsError::InvalidInput {
                        field: "source_path",
                        reason: "strip_prefix",
                        value: Some(entry.path().to_string_lossy().into_owned()),
                    })?;
            let target_path = destination.join(relative);
            if entry.file_type().is_dir() {
                fs::create_dir_all(&target_path).map_err(|source_err| {
                    FsOpsError::io("copy_tree.create_dir", &target_path, source_err)
                })?;
            } else {
                if let Some(parent) = target_path.parent() {
                    fs::create_dir_all(parent).map_err(|source_err| {
                        FsOpsError::io("copy_tree.create_parent", parent, source_err)
                    })?;
                }
                let meta = entry.metadata().map_err(|source_err| {
                    FsOpsError::walkdir("copy_tree.metadata", entry.path(), source_err)
                })?;
                report.bytes += copy_file(entry.path(), &meta, &target_path)?;
                report.files += 1;
            }
        }
        Ok(report)
    }
}

fn copy_file(source: &Path, source_meta: &Metadata, target: &Path) -> FsOpsResult<u64> {
    clear_read_only_target(target)?;
    let bytes = fs::copy(source, target)
        .map_err(|source_err| FsOpsError::io("copy_file.copy", target, source_err))?;
    preserve_times(source_meta, target)?;
    debug!(source = %source.display(), target = %target.display(), bytes, "copied file");
    Ok(bytes)
}

/// A read-only file left by an earlier copy cannot be truncated in place; replace it.
fn clear_read_only_target(target: &Path) -> FsOpsResult<()> {
    match fs::symlink_metadata(target) {
        Ok(meta) if meta.is_file() && meta.permissions().readonly() => {
            fs::remove_file(target).map_err(|source_err| {
                FsOpsError::io("copy_file.replace_read_only", target, source_err)
            })
        }
        Ok(_) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(FsOpsError::io("copy_file.stat_target", target, err)),
    }
}

fn preserve_times(source_meta: &Metadata, target: &Path) -> FsOpsResult<()> {
    let mut times = FileTimes::new();
    if let Ok(accessed) = source_meta.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = source_meta.modified() {
        times = times.set_modified(modified);
    }

    // Permissions were copied from the source, so the target may already be read-only.
    let file = File::open(target)
        .map_err(|source_err| FsOpsError::io("preserve_times.open", target, source_err))?;
    match file.set_times(times) {
        Err(err) if err.kind() != io::ErrorKind::Unsupported => {
            Err(FsOpsError::io("preserve_times.set_times", target, err))
        }
        _ => Ok(()),
    }
}
