//! Keyed cache of fetched collections
//!
//! Views read collections through [`QueryCache::fetch`], which serves fresh
//! entries from memory and goes to the store for missing or stale ones.
//! Mutations never write into the cache; they only call
//! [`QueryCache::invalidate`] once the store has acknowledged the write, so
//! the next read re-fetches.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::error::Result;

/// Hierarchical cache key, e.g. `["workers", "active"]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// A single-segment key
    pub fn root(segment: &str) -> Self {
        Self(vec![segment.to_string()])
    }

    /// This key extended by one segment
    pub fn child(&self, segment: impl ToString) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }

    /// True when `prefix` matches the leading segments of this key
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

struct CacheEntry {
    data: Arc<dyn Any + Send + Sync>,
    stale: bool,
}

/// Invalidation history. `generation` ticks on every invalidate or clear;
/// `marked_at` records the generation at which each prefix was last invalidated.
#[derive(Default)]
struct Invalidations {
    generation: u64,
    cleared_at: u64,
    counts: HashMap<QueryKey, u64>,
    marked_at: HashMap<QueryKey, u64>,
}

impl Invalidations {
    /// Whether `key` was invalidated or cleared after `generation`
    fn touched_since(&self, key: &QueryKey, generation: u64) -> bool {
        self.cleared_at > generation
            || self
                .marked_at
                .iter()
                .any(|(prefix, at)| *at > generation && key.starts_with(prefix))
    }
}

/// Explicit keyed store of fetched collections
#[derive(Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, CacheEntry>>,
    invalidations: RwLock<Invalidations>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh data for `key`, if any
    pub fn get<T: Clone + Send + Sync + 'static>(&self, key: &QueryKey) -> Option<T> {
        read(&self.entries)
            .get(key)
            .filter(|entry| !entry.stale)
            .and_then(|entry| entry.data.downcast_ref::<T>().cloned())
    }

    /// Data for `key` whether stale or not, as a view shows it while it re-fetches
    pub fn peek<T: Clone + Send + Sync + 'static>(&self, key: &QueryKey) -> Option<T> {
        read(&self.entries)
            .get(key)
            .and_then(|entry| entry.data.downcast_ref::<T>().cloned())
    }

    /// Store data as fresh
    pub fn put<T: Send + Sync + 'static>(&self, key: QueryKey, data: T) {
        self.store(key, data, false);
    }

    fn store<T: Send + Sync + 'static>(&self, key: QueryKey, data: T, stale: bool) {
        write(&self.entries).insert(
            key,
            CacheEntry {
                data: Arc::new(data),
                stale,
            },
        );
    }

    /// Missing entries count as stale
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        read(&self.entries)
            .get(key)
            .map(|entry| entry.stale)
            .unwrap_or(true)
    }

    /// Mark every entry under `prefix` stale. Returns how many entries were marked.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut marked = 0;
        for (key, entry) in write(&self.entries).iter_mut() {
            if key.starts_with(prefix) {
                entry.stale = true;
                marked += 1;
            }
        }

        let mut invalidations = write(&self.invalidations);
        invalidations.generation += 1;
        let generation = invalidations.generation;
        *invalidations.counts.entry(prefix.clone()).or_default() += 1;
        invalidations.marked_at.insert(prefix.clone(), generation);

        debug!(key = %prefix, marked, "invalidated cache");
        marked
    }

    /// How many times `key` itself has been passed to [`invalidate`](Self::invalidate)
    pub fn invalidation_count(&self, key: &QueryKey) -> u64 {
        read(&self.invalidations)
            .counts
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    /// Drop every entry, e.g. when the signed-in user changes
    pub fn clear(&self) {
        write(&self.entries).clear();
        let mut invalidations = write(&self.invalidations);
        invalidations.generation += 1;
        invalidations.cleared_at = invalidations.generation;
        debug!("cleared cache");
    }

    /// Serve fresh data for `key`, or run `loader` and cache what it returns.
    ///
    /// A failed load leaves any existing entry, stale or not, untouched. A load
    /// that overlaps an invalidation of `key` is returned to the caller but
    /// cached as stale, so the next read goes back to the store.
    pub async fn fetch<T, F, Fut>(&self, key: &QueryKey, loader: F) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(data) = self.get::<T>(key) {
            return Ok(data);
        }

        let started_at = read(&self.invalidations).generation;
        debug!(key = %key, "cache miss, fetching");
        let data = loader().await?;

        let outdated = read(&self.invalidations).touched_since(key, started_at);
        if outdated {
            debug!(key = %key, "invalidated during fetch, keeping result stale");
        }
        self.store(key.clone(), data.clone(), outdated);
        Ok(data)
    }
}
