// Fingerprint caching for the scanner.
//
// A cache is injected into a `Scanner` with `Scanner::with_cache`; there is no
// process-wide cache. Entries are keyed by content id plus a SHA-256 of the raw
// content, so an edited post misses the cache even though its id is unchanged.
// A cache must only be shared between scanners built from the same
// fingerprint configuration.
use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use perceptual::Fingerprint;

/// Key of a cached fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub content_id: String,
    /// Hex SHA-256 of the raw content.
    pub content_hash: String,
}

impl CacheKey {
    pub fn new(content_id: impl Into<String>, content_hash: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
            content_hash: content_hash.into(),
        }
    }
}

/// Storage for computed fingerprints.
pub trait FingerprintCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<Fingerprint>;

    fn put(&self, key: CacheKey, fingerprint: Fingerprint);
}

/// Bounded in-memory cache that evicts the least recently used entry.
pub struct LruFingerprintCache {
    entries: Mutex<LruCache<CacheKey, Fingerprint>>,
}

impl LruFingerprintCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<CacheKey, Fingerprint>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl FingerprintCache for LruFingerprintCache {
    fn get(&self, key: &CacheKey) -> Option<Fingerprint> {
        self.lock().get(key).cloned()
    }

    fn put(&self, key: CacheKey, fingerprint: Fingerprint) {
        self.lock().put(key, fingerprint);
    }
}
