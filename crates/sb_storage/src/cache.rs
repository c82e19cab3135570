use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use lru::LruCache;
use sb_core::{ArticleCache, ArticleResponse};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

/// Bounded in-memory cache of article responses with least-recently-used eviction.
///
/// The lock is only held for the map operation itself, never across a fetch.
/// Two callers missing on the same id will both fetch; the last `put` wins.
#[derive(Clone)]
pub struct ResultCache {
    entries: Arc<Mutex<LruCache<usize, ArticleResponse>>>,
    capacity: NonZeroUsize,
    counters: Arc<Counters>,
}

impl ResultCache {
    /// Create a cache holding at most `capacity` responses. A zero capacity is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Arc::new(Mutex::new(LruCache::new(capacity))),
            capacity,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn contains(&self, id: usize) -> bool {
        self.entries.lock().await.contains(&id)
    }

    /// Drop every entry. Counters are kept.
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len().await,
            capacity: self.capacity(),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl ArticleCache for ResultCache {
    async fn get(&self, id: usize) -> Option<ArticleResponse> {
        let found = self.entries.lock().await.get(&id).cloned();
        let counter = if found.is_some() {
            &self.counters.hits
        } else {
            &self.counters.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    async fn put(&self, id: usize, response: ArticleResponse) {
        let evicted = self.entries.lock().await.push(id, response);
        if let Some((evicted_id, _)) = evicted {
            // `push` also hands back the previous value when the key was already present
            if evicted_id != id {
                self.counters.evictions.fetch_add(1, Ordering::Relaxed);
                debug!("Evicted article {} from cache", evicted_id);
            }
        }
    }
}
