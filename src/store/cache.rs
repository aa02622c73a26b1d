//! Size- and time-bounded cache fronting the backed gazetteer.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

struct Entry<V> {
    value: V,
    written: Instant,
}

/// An LRU cache whose entries also expire a fixed duration after they
/// were written. Safe under concurrent readers and writers; lookups of
/// expired entries evict them on the spot.
pub(crate) struct TtlCache<K, V> {
    inner: Mutex<LruCache<K, Entry<V>>>,
    ttl: Duration,
}

impl<K: Hash + Eq, V: Clone> TtlCache<K, V> {
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(max_entries.max(1)).expect("max(1) is non-zero");
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        match inner.get(key) {
            Some(entry) if entry.written.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                inner.pop(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: K, value: V) {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        inner.put(key, Entry {
            value,
            written: Instant::now(),
        });
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache lock poisoned").len()
    }
}
