//! Bounded digest cache with least-recently-used eviction.
//!
//! Hashing a multi-gigabyte model file is the expensive step in the
//! resolution chain, so computed digests are kept keyed by resolved path.
//! The cache is memory-only: nothing is persisted across restarts and there
//! is no mtime-based invalidation — a digest is recomputed only on miss or
//! after capacity eviction.

use crate::error::Result;
use crate::hashing;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

struct Entry {
    digest: String,
    last_used: u64,
}

/// Fixed-capacity path → digest store with strict LRU eviction.
///
/// Performs no I/O itself; callers hash on miss and store the result.
pub struct DigestCache {
    capacity: usize,
    tick: u64,
    entries: HashMap<PathBuf, Entry>,
}

impl DigestCache {
    /// Create a cache with the given capacity. Capacity must be positive.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "cache capacity must be positive");
        Self {
            capacity,
            tick: 0,
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Look up a digest, marking the entry most-recently-used on a hit.
    pub fn get(&mut self, key: &Path) -> Option<&str> {
        self.tick += 1;
        let tick = self.tick;
        self.entries.get_mut(key).map(|entry| {
            entry.last_used = tick;
            entry.digest.as_str()
        })
    }

    /// Insert or update a digest, marking it most-recently-used.
    ///
    /// A new key at capacity evicts exactly the least-recently-used entry
    /// first; updating an existing key never changes the size.
    pub fn put(&mut self, key: PathBuf, digest: String) {
        self.tick += 1;
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_lru();
        }
        self.entries.insert(
            key,
            Entry {
                digest,
                last_used: self.tick,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // Capacities are small (tens of entries), so a linear scan beats the
    // bookkeeping of an ordered index.
    fn evict_lru(&mut self) {
        if let Some(key) = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone())
        {
            tracing::debug!(path = %key.display(), "evicting least-recently-used digest");
            self.entries.remove(&key);
        }
    }
}

/// Digest cache shared across concurrent request-serving flows.
///
/// The lock is held across check-compute-store so two simultaneous requests
/// for the same uncached path hash the file once. This serializes unrelated
/// keys for the duration of one hash, which is accepted in exchange for the
/// simpler single critical section.
#[derive(Clone)]
pub struct SharedDigestCache {
    inner: Arc<Mutex<DigestCache>>,
}

impl SharedDigestCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(DigestCache::new(capacity))),
        }
    }

    /// Return the cached digest for a resolved path, computing it on miss.
    pub async fn get_or_compute(&self, path: &Path) -> Result<String> {
        let mut cache = self.inner.lock().await;
        if let Some(digest) = cache.get(path) {
            return Ok(digest.to_string());
        }
        let digest = hashing::compute_digest_async(path).await?;
        cache.put(path.to_path_buf(), digest.clone());
        Ok(digest)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}
