//! Short-lived, bounded cache of computed selections.
//!
//! Entries expire a fixed time after insertion no matter how often they are
//! read, and the least recently used entry is evicted when the cache is
//! full. All state sits behind one mutex around an [`LruCache`], so a
//! `get` never observes a half-written entry.

mod clock;

pub use clock::{Clock, SystemClock};

use lru::LruCache;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use crate::selection::{MediaType, SelectionConfig};

/// Deterministic cache key for a request.
///
/// Two requests share a fingerprint iff they name the same media and
/// normalize to the same selection policy.
pub fn fingerprint(media_type: MediaType, media_id: &str, config: &SelectionConfig) -> String {
    let mut hasher = Sha256::new();
    hasher.update(media_type.as_str().as_bytes());
    hasher.update(b"|");
    hasher.update(media_id.trim().as_bytes());
    hasher.update(b"|");
    hasher.update(config.normalized().as_bytes());
    format!("{:x}", hasher.finalize())
}

struct Entry<V> {
    value: V,
    inserted_at: Instant,
    ttl: Duration,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) >= self.ttl
    }
}

/// Bounded LRU cache with per-entry TTL.
pub struct ResultCache<V> {
    entries: Mutex<LruCache<String, Entry<V>>>,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone + Send> ResultCache<V> {
    /// Create a cache using the system clock.
    pub fn new(capacity: usize, default_ttl: Duration) -> Self {
        Self::with_clock(capacity, default_ttl, Arc::new(SystemClock))
    }

    /// Create a cache with an injected clock. A zero capacity is raised to one.
    pub fn with_clock(capacity: usize, default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            default_ttl,
            clock,
        }
    }

    /// Look up a live entry, marking it as recently used.
    pub async fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;

        match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
            Some(_) => {}
            None => return None,
        }

        entries.pop(key);
        debug!(key = key, "Cache entry expired");
        None
    }

    /// Insert with the default TTL.
    pub async fn put(&self, key: impl Into<String>, value: V) {
        self.put_with_ttl(key, value, self.default_ttl).await;
    }

    /// Insert with an explicit TTL, replacing any existing entry. When the
    /// cache is full the least recently used entry is evicted.
    pub async fn put_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let entry = Entry {
            value,
            inserted_at: self.clock.now(),
            ttl,
        };

        let mut entries = self.entries.lock().await;
        if let Some((evicted, _)) = entries.push(key.clone(), entry) {
            if evicted != key {
                debug!(key = %evicted, "Evicted least recently used cache entry");
            }
        }
    }

    /// Drop every expired entry; returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        expired.len()
    }

    /// Number of stored entries, including not-yet-purged expired ones.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    pub async fn capacity(&self) -> usize {
        self.entries.lock().await.cap().get()
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}
