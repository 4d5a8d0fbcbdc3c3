//! Poll loop that stages newly completed downloads into their category folders.
//!
//! # Design
//! - One tick lists completed items and handles them strictly in the order received.
//! - An id enters the dedup cache only after its copy succeeded, and the cache is
//!   persisted before the next item is touched.
//! - Listing and copy failures are logged and retried on a later tick; nothing here
//!   terminates the loop except the shutdown future.

use std::future::Future;
use std::time::Duration;

use stowage_config::CategoryMap;
use stowage_fsops::{CopyEngine, CopyReport, FsOpsError};
use stowage_runtime::DedupCache;
use stowage_torrent_core::{CompletedCatalog, CompletedItem};
use tokio::task;
use tracing::{debug, error, info, warn};

/// Counters describing what a single tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Items copied and recorded during this tick.
    pub copied: usize,
    /// Items skipped because their id was already recorded.
    pub already_done: usize,
    /// Items skipped because their category has no destination.
    pub unmapped: usize,
    /// Items skipped because their name is not a single plain path component.
    pub invalid_name: usize,
    /// Items whose data was not present on disk.
    pub source_missing: usize,
    /// Items whose copy failed.
    pub failed: usize,
    /// The completed list could not be fetched; no item was examined.
    pub listing_failed: bool,
}

enum Outcome {
    AlreadyDone,
    InvalidName,
    Unmapped,
    Copied,
    SourceMissing,
    Failed,
}

/// Owns the catalog, category map, dedup cache and copy engine for the poll loop.
#[derive(Debug)]
pub struct Reconciler<C> {
    catalog: C,
    categories: CategoryMap,
    cache: DedupCache,
    engine: CopyEngine,
    poll_interval: Duration,
}

impl<C: CompletedCatalog> Reconciler<C> {
    /// Assemble a reconciler from already-initialised parts.
    #[must_use]
    pub const fn new(
        catalog: C,
        categories: CategoryMap,
        cache: DedupCache,
        engine: CopyEngine,
        poll_interval: Duration,
    ) -> Self {
        Self {
            catalog,
            categories,
            cache,
            engine,
            poll_interval,
        }
    }

    /// Processed-id set as currently held in memory.
    #[must_use]
    pub const fn cache(&self) -> &DedupCache {
        &self.cache
    }

    /// Run one poll: list completed items and copy every new, mapped one.
    pub async fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        let items = match self.catalog.list_completed().await {
            Ok(items) => items,
            Err(err) => {
                error!(error = ?err, "failed to list completed torrents; retrying next tick");
                report.listing_failed = true;
                return report;
            }
        };

        for item in &items {
            match self.process(item).await {
                Outcome::AlreadyDone => report.already_done += 1,
                Outcome::InvalidName => report.invalid_name += 1,
                Outcome::Unmapped => report.unmapped += 1,
                Outcome::Copied => report.copied += 1,
                Outcome::SourceMissing => report.source_missing += 1,
                Outcome::Failed => report.failed += 1,
            }
        }

        if report.copied > 0
            || report.failed > 0
            || report.source_missing > 0
            || report.invalid_name > 0
        {
            info!(
                listed = items.len(),
                copied = report.copied,
                unmapped = report.unmapped,
                invalid_name = report.invalid_name,
                source_missing = report.source_missing,
                failed = report.failed,
                "tick finished"
            );
        } else {
            debug!(listed = items.len(), unmapped = report.unmapped, "tick finished");
        }
        report
    }

    /// Tick every `poll_interval` until `shutdown` resolves.
    ///
    /// A tick in progress is abandoned at its next await point once shutdown fires;
    /// its uncommitted item is retried after restart.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(
            interval_secs = self.poll_interval.as_secs(),
            categories = self.categories.len(),
            recorded = self.cache.len(),
            "reconciler started"
        );

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = self.tick() => {}
            }
            tokio::select! {
                () = &mut shutdown => break,
                () = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        info!("reconciler stopped");
    }

    async fn process(&mut self, item: &CompletedItem) -> Outcome {
        if self.cache.contains(&item.id) {
            return Outcome::AlreadyDone;
        }

        if item.leaf_name().is_none() {
            warn!(
                torrent_hash = %item.id,
                name = %item.name,
                "torrent name is not a single path component; skipping"
            );
            return Outcome::InvalidName;
        }

        let Some(destination) = self.categories.destination_for(&item.category, &item.name)
        else {
            warn!(
                torrent_hash = %item.id,
                name = %item.name,
                category = %item.category,
                "no destination configured for category; skipping"
            );
            return Outcome::Unmapped;
        };

        let source = item.source_path();
        let engine = self.engine;
        let copy = task::spawn_blocking({
            let source = source.clone();
            let destination = destination.clone();
            move || engine.copy_item(&source, &destination)
        })
        .await;

        match copy {
            Ok(Ok(CopyReport { files, bytes })) => {
                info!(
                    torrent_hash = %item.id,
                    name = %item.name,
                    category = %item.category,
                    destination = %destination.display(),
                    files,
                    bytes,
                    "copied completed torrent"
                );
                self.record(&item.id);
                Outcome::Copied
            }
            Ok(Err(FsOpsError::SourceMissing { path })) => {
                warn!(
                    torrent_hash = %item.id,
                    name = %item.name,
                    source = %path.display(),
                    "torrent data not found on disk; will retry"
                );
                Outcome::SourceMissing
            }
            Ok(Err(err)) => {
                error!(
                    torrent_hash = %item.id,
                    name = %item.name,
                    source = %source.display(),
                    destination = %destination.display(),
                    error = ?err,
                    "copy failed; will retry"
                );
                Outcome::Failed
            }
            Err(err) => {
                error!(
                    torrent_hash = %item.id,
                    name = %item.name,
                    error = %err,
                    "copy task did not complete; will retry"
                );
                Outcome::Failed
            }
        }
    }

    fn record(&mut self, id: &str) {
        self.cache.insert(id);
        if let Err(err) = self.cache.persist() {
            error!(
                torrent_hash = %id,
                path = %self.cache.path().display(),
                error = ?err,
                "failed to persist dedup cache; id kept in memory"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;
    use stowage_test_support::fixtures::{count_files, payload_tree, temp_dir, write_file};
    use stowage_torrent_core::{TorrentError, TorrentResult};

    struct ScriptedCatalog {
        responses: Mutex<VecDeque<TorrentResult<Vec<CompletedItem>>>>,
        fallback: Vec<CompletedItem>,
    }

    impl ScriptedCatalog {
        fn always(items: Vec<CompletedItem>) -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
                fallback: items,
            }
        }

        fn failing_once(items: Vec<CompletedItem>) -> Self {
            Self {
                responses: Mutex::new(VecDeque::from([Err(TorrentError::Remote {
                    operation: "list_completed",
                    url: "scripted".to_string(),
                    status: Some(500),
                    source: None,
                })])),
                fallback: items,
            }
        }
    }

    #[async_trait]
    impl CompletedCatalog for ScriptedCatalog {
        async fn list_completed(&self) -> TorrentResult<Vec<CompletedItem>> {
            let next = self
                .responses
                .lock()
                .map_err(|_| TorrentError::Remote {
                    operation: "list_completed",
                    url: "scripted".to_string(),
                    status: None,
                    source: None,
                })?
                .pop_front();
            next.unwrap_or_else(|| Ok(self.fallback.clone()))
        }
    }

    fn item(id: &str, name: &str, save_path: &Path, category: &str) -> CompletedItem {
        CompletedItem {
            id: id.to_string(),
            name: name.to_string(),
            save_path: save_path.to_path_buf(),
            category: category.to_string(),
        }
    }

    fn reconciler_for(root: &Path, catalog: ScriptedCatalog) -> Result<Reconciler<ScriptedCatalog>> {
        let categories = CategoryMap::parse(&format!(
            "movies:{},music:{}",
            root.join("media/movies").display(),
            root.join("media/music").display()
        ))?;
        let cache = DedupCache::load(root.join("state/cache.json"))?;
        Ok(Reconciler::new(
            catalog,
            categories,
            cache,
            CopyEngine::new(),
            Duration::from_millis(10),
        ))
    }

    fn cached_ids(root: &Path) -> Result<Vec<String>> {
        Ok(serde_json::from_slice(&fs::read(root.join("state/cache.json"))?)?)
    }

    #[tokio::test]
    async fn mapped_item_is_copied_and_recorded() -> Result<()> {
        let temp = temp_dir("stowage-reconciler-")?;
        let downloads = temp.path().join("downloads");
        payload_tree(&downloads, "Foo", &[("a.mkv", b"video")])?;
        let catalog = ScriptedCatalog::always(vec![item("abc", "Foo", &downloads, "movies")]);
        let mut reconciler = reconciler_for(temp.path(), catalog)?;

        let report = reconciler.tick().await;

        assert_eq!(report.copied, 1);
        assert_eq!(
            fs::read(temp.path().join("media/movies/Foo/a.mkv"))?,
            b"video"
        );
        assert!(reconciler.cache().contains("abc"));
        assert_eq!(cached_ids(temp.path())?, vec!["abc"]);
        Ok(())
    }

    #[tokio::test]
    async fn second_tick_does_not_copy_again() -> Result<()> {
        let temp = temp_dir("stowage-reconciler-")?;
        let downloads = temp.path().join("downloads");
        payload_tree(&downloads, "Foo", &[("a.mkv", b"video")])?;
        let catalog = ScriptedCatalog::always(vec![item("abc", "Foo", &downloads, "movies")]);
        let mut reconciler = reconciler_for(temp.path(), catalog)?;

        reconciler.tick().await;
        let copied = temp.path().join("media/movies/Foo/a.mkv");
        fs::write(&copied, b"edited by library")?;
        let report = reconciler.tick().await;

        assert_eq!(report.copied, 0);
        assert_eq!(report.already_done, 1);
        assert_eq!(fs::read(&copied)?, b"edited by library");
        assert_eq!(count_files(&temp.path().join("media"))?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn unmapped_category_creates_nothing_and_leaves_cache_alone() -> Result<()> {
        let temp = temp_dir("stowage-reconciler-")?;
        let downloads = temp.path().join("downloads");
        payload_tree(&downloads, "Novel", &[("book.epub", b"pages")])?;
        let catalog = ScriptedCatalog::always(vec![
            item("bk1", "Novel", &downloads, "books"),
            item("none", "Novel", &downloads, ""),
        ]);
        let mut reconciler = reconciler_for(temp.path(), catalog)?;

        let report = reconciler.tick().await;

        assert_eq!(report.unmapped, 2);
        assert!(!temp.path().join("media").exists());
        assert!(reconciler.cache().is_empty());
        assert!(cached_ids(temp.path())?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn names_escaping_the_category_dir_are_skipped() -> Result<()> {
        let temp = temp_dir("stowage-reconciler-")?;
        let downloads = temp.path().join("downloads");
        payload_tree(&downloads, "Other", &[("y.bin", b"other")])?;
        payload_tree(temp.path(), "escaped", &[("z.bin", b"outside")])?;
        let catalog = ScriptedCatalog::always(vec![
            item("up", "../escaped", &downloads, "movies"),
            item("abs", &temp.path().join("escaped").display().to_string(), &downloads, "movies"),
            item("empty", "", &downloads, "movies"),
            item("nested", "Other/y.bin", &downloads, "movies"),
        ]);
        let mut reconciler = reconciler_for(temp.path(), catalog)?;

        let report = reconciler.tick().await;

        assert_eq!(report.invalid_name, 4);
        assert_eq!(report.copied, 0);
        assert!(!temp.path().join("media").exists());
        assert!(reconciler.cache().is_empty());
        assert!(cached_ids(temp.path())?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn missing_source_is_reported_and_not_recorded() -> Result<()> {
        let temp = temp_dir("stowage-reconciler-")?;
        let downloads = temp.path().join("downloads");
        let catalog = ScriptedCatalog::always(vec![item("gone", "Ghost", &downloads, "movies")]);
        let mut reconciler = reconciler_for(temp.path(), catalog)?;

        let report = reconciler.tick().await;

        assert_eq!(report.source_missing, 1);
        assert_eq!(report.copied, 0);
        assert!(!temp.path().join("media/movies/Ghost").exists());
        assert!(cached_ids(temp.path())?.is_empty());

        payload_tree(&downloads, "Ghost", &[("late.mkv", b"late")])?;
        let retry = reconciler.tick().await;
        assert_eq!(retry.copied, 1);
        assert_eq!(cached_ids(temp.path())?, vec!["gone"]);
        Ok(())
    }

    #[tokio::test]
    async fn earlier_success_is_persisted_when_later_item_fails() -> Result<()> {
        let temp = temp_dir("stowage-reconciler-")?;
        let downloads = temp.path().join("downloads");
        payload_tree(&downloads, "First", &[("1.flac", b"one")])?;
        payload_tree(&downloads, "Second", &[("2.flac", b"two")])?;
        // A regular file where the destination directory should go makes the copy fail.
        write_file(temp.path(), "media/music/Second", b"blocker")?;
        let catalog = ScriptedCatalog::always(vec![
            item("first", "First", &downloads, "music"),
            item("second", "Second", &downloads, "music"),
        ]);
        let mut reconciler = reconciler_for(temp.path(), catalog)?;

        let report = reconciler.tick().await;

        assert_eq!(report.copied, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(cached_ids(temp.path())?, vec!["first"]);
        assert!(!reconciler.cache().contains("second"));
        Ok(())
    }

    #[tokio::test]
    async fn listing_failure_marks_nothing_and_next_tick_retries() -> Result<()> {
        let temp = temp_dir("stowage-reconciler-")?;
        let downloads = temp.path().join("downloads");
        payload_tree(&downloads, "Foo", &[("a.mkv", b"video")])?;
        let catalog =
            ScriptedCatalog::failing_once(vec![item("abc", "Foo", &downloads, "movies")]);
        let mut reconciler = reconciler_for(temp.path(), catalog)?;
        let before = fs::read(temp.path().join("state/cache.json"))?;

        let failed = reconciler.tick().await;

        assert!(failed.listing_failed);
        assert_eq!(fs::read(temp.path().join("state/cache.json"))?, before);
        assert!(!temp.path().join("media").exists());

        let retried = reconciler.tick().await;
        assert!(!retried.listing_failed);
        assert_eq!(retried.copied, 1);
        Ok(())
    }

    #[tokio::test]
    async fn persist_failure_keeps_id_in_memory() -> Result<()> {
        let temp = temp_dir("stowage-reconciler-")?;
        let downloads = temp.path().join("downloads");
        payload_tree(&downloads, "Foo", &[("a.mkv", b"video")])?;
        let catalog = ScriptedCatalog::always(vec![item("abc", "Foo", &downloads, "movies")]);
        let mut reconciler = reconciler_for(temp.path(), catalog)?;
        fs::remove_dir_all(temp.path().join("state"))?;
        write_file(temp.path(), "state", b"not a directory")?;

        let first = reconciler.tick().await;
        let second = reconciler.tick().await;

        assert_eq!(first.copied, 1);
        assert_eq!(second.already_done, 1);
        assert!(reconciler.cache().contains("abc"));
        Ok(())
    }

    #[tokio::test]
    async fn distinct_ids_sharing_a_destination_are_each_recorded() -> Result<()> {
        let temp = temp_dir("stowage-reconciler-")?;
        let downloads = temp.path().join("downloads");
        payload_tree(&downloads, "Album", &[("01.flac", b"one")])?;
        let catalog = ScriptedCatalog::always(vec![
            item("zzz", "Album", &downloads, "music"),
            item("aaa", "Album", &downloads, "music"),
        ]);
        let mut reconciler = reconciler_for(temp.path(), catalog)?;

        let report = reconciler.tick().await;

        assert_eq!(report.copied, 2);
        assert_eq!(cached_ids(temp.path())?, vec!["aaa", "zzz"]);
        assert_eq!(count_files(&temp.path().join("media/music/Album"))?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn run_returns_once_shutdown_resolves() -> Result<()> {
        let temp = temp_dir("stowage-reconciler-")?;
        let downloads = temp.path().join("downloads");
        payload_tree(&downloads, "Foo", &[("a.mkv", b"video")])?;
        let catalog = ScriptedCatalog::always(vec![item("abc", "Foo", &downloads, "movies")]);
        let mut reconciler = reconciler_for(temp.path(), catalog)?;
        let cache_path = temp.path().join("state/cache.json");

        let shutdown = async {
            while !fs::read_to_string(&cache_path).is_ok_and(|raw| raw.contains("abc")) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(10), reconciler.run(shutdown)).await?;

        assert!(reconciler.cache().contains("abc"));
        assert!(temp.path().join("media/movies/Foo/a.mkv").exists());
        Ok(())
    }
}
