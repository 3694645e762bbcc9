//! Memoized results of derived computations.
//!
//! Entries are keyed by resource identifier and [`Operation`]. An entry is
//! written once, on the first successful computation, and stays unchanged
//! until [`ResultCache::clear`] is called. There is no expiry.

use crate::slot::Slot;
use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// A derived computation whose result can be cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Size of the resource in kilobytes.
    Size,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Size => f.write_str("size"),
        }
    }
}

/// Key of a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    identifier: Arc<str>,
    operation: Operation,
}

impl CacheKey {
    /// Creates a key for `operation` on the resource `identifier`.
    #[must_use]
    pub fn new(identifier: impl Into<Arc<str>>, operation: Operation) -> Self {
        Self {
            identifier: identifier.into(),
            operation,
        }
    }

    /// Returns the resource identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the operation.
    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.identifier, self.operation)
    }
}

/// Thread-safe memo table.
///
/// # Thread Safety
///
/// Each key owns a [`Slot`]. The table lock is only held to find or create
/// that slot; computations run outside it. A slow computation therefore
/// blocks only callers of the same key, who wait for its outcome instead of
/// computing again. Other keys and [`clear`](Self::clear) proceed. A
/// computation still in flight when the cache is cleared completes, but its
/// result is not stored.
///
/// # Example
///
/// ```
/// use custodian_mediator::{CacheKey, Operation, ResultCache};
///
/// let cache = ResultCache::new();
/// let key = CacheKey::new("large_image.jpg", Operation::Size);
///
/// let first = cache.get_or_try_compute(&key, || Ok::<_, ()>(812)).unwrap();
/// let second = cache.get_or_try_compute(&key, || Ok::<_, ()>(0)).unwrap();
///
/// assert_eq!(first, second);
/// assert_eq!(cache.computations(), 1);
/// ```
pub struct ResultCache<V> {
    entries: RwLock<HashMap<CacheKey, Arc<Slot<V>>>>,
    computations: AtomicUsize,
}

impl<V> Default for ResultCache<V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            computations: AtomicUsize::new(0),
        }
    }
}

impl<V: Clone> ResultCache<V> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        self.existing(key)
            .and_then(|slot| slot.get())
            .map(|value| V::clone(&value))
    }

    /// Returns the cached value, computing and storing it on a miss.
    ///
    /// Failed computations store nothing.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `compute`.
    pub fn get_or_try_compute<E, F>(&self, key: &CacheKey, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let slot = self.slot(key);
        if let Some(value) = slot.get() {
            tracing::debug!(%key, "cache hit");
            return Ok(V::clone(&value));
        }

        let value = slot.get_or_try_init(|| {
            let value = compute()?;
            self.computations.fetch_add(1, Ordering::AcqRel);
            tracing::debug!(%key, "cache populated");
            Ok(value)
        })?;
        Ok(V::clone(&value))
    }

    /// Returns `true` if `key` has a cached value.
    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.existing(key).is_some_and(|slot| slot.get().is_some())
    }

    /// Returns how many computations have populated the cache.
    #[must_use]
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::Acquire)
    }

    /// Returns the number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    fn existing(&self, key: &CacheKey) -> Option<Arc<Slot<V>>> {
        self.entries.read().get(key).cloned()
    }

    fn slot(&self, key: &CacheKey) -> Arc<Slot<V>> {
        if let Some(slot) = self.existing(key) {
            return slot;
        }
        let mut entries = self.entries.write();
        Arc::clone(entries.entry(key.clone()).or_default())
    }
}

impl<V> fmt::Debug for ResultCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultCache")
            .field("keys", &self.entries.read().len())
            .field("computations", &self.computations.load(Ordering::Acquire))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_compute_stores_nothing() {
        let cache = ResultCache::<u64>::new();
        let key = CacheKey::new("x.jpg", Operation::Size);

        assert_eq!(cache.get_or_try_compute(&key, || Err("offline")), Err("offline"));
        assert!(!cache.contains(&key));
        assert_eq!(cache.computations(), 0);
    }

    #[test]
    fn keys_are_per_identifier() {
        let cache = ResultCache::<u64>::new();
        let a = CacheKey::new("a.jpg", Operation::Size);
        let b = CacheKey::new("b.jpg", Operation::Size);

        cache.get_or_try_compute(&a, || Ok::<_, ()>(1)).unwrap();
        cache.get_or_try_compute(&b, || Ok::<_, ()>(2)).unwrap();

        assert_eq!(cache.get(&a), Some(1));
        assert_eq!(cache.get(&b), Some(2));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn clear_forces_recompute() {
        let cache = ResultCache::<u64>::new();
        let key = CacheKey::new("a.jpg", Operation::Size);

        cache.get_or_try_compute(&key, || Ok::<_, ()>(1)).unwrap();
        cache.clear();
        assert!(cache.is_empty());

        let value = cache.get_or_try_compute(&key, || Ok::<_, ()>(9)).unwrap();
        assert_eq!(value, 9);
        assert_eq!(cache.computations(), 2);
    }

    #[test]
    fn key_display() {
        let key = CacheKey::new("a.jpg", Operation::Size);
        assert_eq!(key.to_string(), "a.jpg#size");
        assert_eq!(key.identifier(), "a.jpg");
        assert_eq!(key.operation(), Operation::Size);
    }

    #[test]
    fn slow_compute_does_not_block_other_keys_or_clear() {
        use std::sync::mpsc;
        use std::thread;

        let cache = Arc::new(ResultCache::<u64>::new());
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let slow = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let key = CacheKey::new("slow.jpg", Operation::Size);
                cache.get_or_try_compute(&key, || {
                    started_tx.send(()).expect("receiver alive");
                    release_rx.recv().expect("sender alive");
                    Ok::<_, ()>(1)
                })
            })
        };

        started_rx.recv().unwrap();
        let fast = CacheKey::new("fast.jpg", Operation::Size);
        assert_eq!(cache.get_or_try_compute(&fast, || Ok::<_, ()>(2)), Ok(2));
        cache.clear();
        assert!(cache.is_empty());

        release_tx.send(()).unwrap();
        assert_eq!(slow.join().expect("Thread panicked"), Ok(1));
        assert_eq!(cache.computations(), 2);
    }
}
