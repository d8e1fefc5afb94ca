//! Opportunistic, bounded preview fetching for the displayed file list.
//!
//! Two structures with different lifetimes back the cache:
//!
//! * `fetched` records every item a fetch was ever attempted for. It only grows,
//!   for the whole session, and is what prevents duplicate or repeated fetches.
//! * `entries` holds the payloads. It is bounded by `capacity` and is replaced
//!   wholesale by the latest batch when a merge would overflow it. Items dropped
//!   this way stay in `fetched` and are never requested again.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use futures::future::join_all;
use shared::domain::{FileInfo, Location};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::{file_kind, RemoteService};

pub const DEFAULT_PREVIEW_BATCH_SIZE: usize = 5;
pub const DEFAULT_PREVIEW_CAPACITY: usize = 100;

/// Encoded image bytes as returned by the backend.
pub type PreviewData = Arc<[u8]>;

/// Decides whether a non-directory entry qualifies for a preview fetch.
pub type PreviewPredicate = Arc<dyn Fn(&FileInfo) -> bool + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviewLoadReport {
    pub requested: usize,
    pub loaded: usize,
    pub failed: usize,
    pub batches: usize,
    pub resets: usize,
}

pub struct PreviewCache {
    remote: Arc<dyn RemoteService>,
    predicate: PreviewPredicate,
    batch_size: usize,
    capacity: usize,
    fetched: Mutex<HashSet<Location>>,
    entries: RwLock<HashMap<Location, PreviewData>>,
}

impl PreviewCache {
    pub fn new(remote: Arc<dyn RemoteService>) -> Self {
        Self::with_limits(remote, DEFAULT_PREVIEW_BATCH_SIZE, DEFAULT_PREVIEW_CAPACITY)
    }

    /// `batch_size` is raised to 1 and `capacity` to `batch_size`, so one
    /// batch always fits; callers wanting an error instead validate first.
    pub fn with_limits(remote: Arc<dyn RemoteService>, batch_size: usize, capacity: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            remote,
            predicate: Arc::new(file_kind::is_previewable),
            batch_size,
            capacity: capacity.max(batch_size),
            fetched: Mutex::new(HashSet::new()),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_predicate(mut self, predicate: PreviewPredicate) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn get(&self, location: &Location) -> Option<PreviewData> {
        self.entries.read().await.get(location).cloned()
    }

    pub async fn snapshot(&self) -> HashMap<Location, PreviewData> {
        self.entries.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn was_attempted(&self, location: &Location) -> bool {
        self.fetched.lock().await.contains(location)
    }

    /// Fetches previews for the not-yet-attempted previewable entries of `files`.
    ///
    /// Batches run strictly one after another; requests inside a batch run
    /// concurrently and the batch is merged only once all of them settled.
    pub async fn load(&self, files: &[FileInfo]) -> PreviewLoadReport {
        let pending = self.claim_pending(files).await;
        let mut report = PreviewLoadReport {
            requested: pending.len(),
            ..PreviewLoadReport::default()
        };
        if pending.is_empty() {
            return report;
        }

        for batch in pending.chunks(self.batch_size) {
            let settled = join_all(batch.iter().map(|location| self.fetch_one(location))).await;
            let fresh: HashMap<Location, PreviewData> = settled.into_iter().flatten().collect();

            report.batches += 1;
            report.loaded += fresh.len();
            report.failed += batch.len() - fresh.len();
            if self.merge_batch(fresh).await {
                report.resets += 1;
            }
        }

        info!(
            requested = report.requested,
            loaded = report.loaded,
            failed = report.failed,
            batches = report.batches,
            resets = report.resets,
            "preview: load finished"
        );
        report
    }

    /// Marks every qualifying entry as fetched before any request is issued, so a
    /// recomputed file list arriving mid-flight cannot schedule the same item twice.
    async fn claim_pending(&self, files: &[FileInfo]) -> Vec<Location> {
        let mut fetched = self.fetched.lock().await;
        files
            .iter()
            .filter(|file| !file.is_dir && (self.predicate)(file))
            .filter(|file| fetched.insert(file.path.clone()))
            .map(|file| file.path.clone())
            .collect()
    }

    async fn fetch_one(&self, location: &Location) -> Option<(Location, PreviewData)> {
        match self.remote.get_file_preview(location).await {
            Ok(bytes) => Some((location.clone(), Arc::from(bytes))),
            Err(err) => {
                debug!(path = %location, error = %err, "preview: fetch failed");
                None
            }
        }
    }

    /// Returns true when the merge overflowed and the cache was reset to `fresh`.
    async fn merge_batch(&self, fresh: HashMap<Location, PreviewData>) -> bool {
        if fresh.is_empty() {
            return false;
        }

        let mut entries = self.entries.write().await;
        let added = fresh
            .keys()
            .filter(|location| !entries.contains_key(*location))
            .count();
        if entries.len() + added > self.capacity {
            debug!(
                dropped = entries.len(),
                kept = fresh.len(),
                "preview: cache capacity exceeded; keeping latest batch only"
            );
            *entries = fresh;
            return true;
        }

        entries.extend(fresh);
        false
    }
}

#[cfg(test)]
#[path = "tests/preview_cache_tests.rs"]
mod tests;
