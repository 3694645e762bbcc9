use super::{Backing, Mediated};
use crate::access::Access;
use crate::asset::{Asset, Loader};
use crate::cache::{CacheKey, Operation, ResultCache};
use crate::error::MediatorError;
use crate::slot::Phase;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters describing a [`CachingMediator`]'s cache use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of successful displays.
    pub display_count: u64,
    /// Whether the size is currently cached.
    pub size_cached: bool,
    /// Number of real size computations performed.
    pub computations: usize,
}

/// Memoizes derived results of a lazily constructed resource.
///
/// - [`size`](Mediated::size) computes the real size once and serves the
///   cached value afterwards, until [`clear_cache`](Self::clear_cache).
/// - [`display`](Mediated::display) goes through the real resource on its
///   first call, constructing it if needed. Later calls skip the resource
///   entirely and only echo from cache, including calls that race the first
///   one. If the first call fails, its claim is released.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use custodian_mediator::{CachingMediator, Mediated, SimulatedLoader};
///
/// let image = CachingMediator::new("large_image.jpg", Arc::new(SimulatedLoader::instant()));
///
/// let first = image.size().unwrap().granted();
/// let second = image.size().unwrap().granted();
/// assert_eq!(first, second);
///
/// image.display().unwrap();
/// image.display().unwrap();
///
/// let stats = image.cache_stats();
/// assert_eq!(stats.display_count, 2);
/// assert!(stats.size_cached);
/// assert_eq!(stats.computations, 1);
/// ```
pub struct CachingMediator<L: Loader> {
    backing: Backing<L>,
    size_key: CacheKey,
    cache: ResultCache<u64>,
    displays: AtomicU64,
}

impl<L: Loader> CachingMediator<L> {
    /// Creates a mediator for `identifier`. Nothing is loaded yet.
    pub fn new(identifier: impl Into<String>, loader: Arc<L>) -> Self {
        let backing = Backing::new(identifier, loader);
        let size_key = CacheKey::new(backing.identifier.as_str(), Operation::Size);
        tracing::debug!(identifier = %backing.identifier, "caching mediator created");
        Self {
            backing,
            size_key,
            cache: ResultCache::new(),
            displays: AtomicU64::new(0),
        }
    }

    /// Returns the current cache counters.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            display_count: self.displays.load(Ordering::Acquire),
            size_cached: self.cache.contains(&self.size_key),
            computations: self.cache.computations(),
        }
    }

    /// Drops every cached result. The constructed resource is kept.
    pub fn clear_cache(&self) {
        tracing::debug!(identifier = %self.backing.identifier, "clearing result cache");
        self.cache.clear();
    }

    /// Returns the number of constructions performed (0 or 1).
    #[must_use]
    pub fn constructions(&self) -> usize {
        self.backing.slot.constructions()
    }
}

impl<L: Loader> Mediated for CachingMediator<L> {
    fn identifier(&self) -> &str {
        &self.backing.identifier
    }

    fn phase(&self) -> Phase {
        self.backing.slot.phase()
    }

    fn display(&self) -> Result<Access<String>, MediatorError> {
        let count = self.displays.fetch_add(1, Ordering::AcqRel) + 1;
        if count == 1 {
            return match self.backing.resource() {
                Ok(asset) => Ok(Access::Granted(asset.display())),
                Err(err) => {
                    self.displays.fetch_sub(1, Ordering::AcqRel);
                    Err(err)
                }
            };
        }

        tracing::debug!(identifier = %self.backing.identifier, count, "cached display");
        Ok(Access::Granted(format!(
            "Cached display #{count}: {}",
            self.backing.identifier
        )))
    }

    fn size(&self) -> Result<Access<u64>, MediatorError> {
        let size = self.cache.get_or_try_compute(&self.size_key, || {
            tracing::debug!(identifier = %self.backing.identifier, "computing size");
            self.backing.resource().map(|asset| asset.size())
        })?;
        Ok(Access::Granted(size))
    }
}

impl<L: Loader> fmt::Debug for CachingMediator<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachingMediator")
            .field("backing", &self.backing)
            .field("stats", &self.cache_stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::SimulatedLoader;

    fn mediator(loader: &Arc<SimulatedLoader>) -> CachingMediator<SimulatedLoader> {
        CachingMediator::new("large_image.jpg", Arc::clone(loader))
    }

    #[test]
    fn size_is_computed_once() {
        let loader = Arc::new(SimulatedLoader::instant());
        let image = mediator(&loader);

        assert!(!image.cache_stats().size_cached);
        let first = image.size().unwrap().granted().unwrap();
        let second = image.size().unwrap().granted().unwrap();

        assert_eq!(first, second);
        assert_eq!(image.cache_stats().computations, 1);
        assert!(image.cache_stats().size_cached);
        assert_eq!(loader.loads(), 1);
    }

    #[test]
    fn repeat_displays_are_served_from_cache() {
        let loader = Arc::new(SimulatedLoader::instant());
        let image = mediator(&loader);

        let first = image.display().unwrap().granted().unwrap();
        let second = image.display().unwrap().granted().unwrap();
        let third = image.display().unwrap().granted().unwrap();

        assert_eq!(first, "Displaying image: large_image.jpg");
        assert_eq!(second, "Cached display #2: large_image.jpg");
        assert_eq!(third, "Cached display #3: large_image.jpg");
        assert_eq!(image.cache_stats().display_count, 3);
        assert_eq!(image.constructions(), 1);
    }

    #[test]
    fn size_and_display_share_one_construction() {
        let loader = Arc::new(SimulatedLoader::instant());
        let image = mediator(&loader);

        image.size().unwrap();
        let shown = image.display().unwrap().granted().unwrap();

        assert_eq!(shown, "Displaying image: large_image.jpg");
        assert_eq!(loader.attempts(), 1);
    }

    #[test]
    fn clear_cache_recomputes_without_reloading() {
        let loader = Arc::new(SimulatedLoader::instant());
        let image = mediator(&loader);

        let before = image.size().unwrap().granted();
        image.clear_cache();
        assert!(!image.cache_stats().size_cached);

        let after = image.size().unwrap().granted();
        assert_eq!(before, after);
        assert_eq!(image.cache_stats().computations, 2);
        assert_eq!(loader.loads(), 1);
    }

    #[test]
    fn failed_size_is_not_cached() {
        let loader = Arc::new(SimulatedLoader::instant().with_failures(1));
        let image = mediator(&loader);

        assert!(image.size().is_err());
        assert!(!image.cache_stats().size_cached);
        assert_eq!(image.phase(), Phase::Unconstructed);

        assert!(image.size().unwrap().is_granted());
        assert_eq!(image.cache_stats().computations, 1);
    }

    #[test]
    fn failed_first_display_releases_its_claim() {
        let loader = Arc::new(SimulatedLoader::instant().with_failures(1));
        let image = mediator(&loader);

        assert!(image.display().is_err());
        assert_eq!(image.cache_stats().display_count, 0);

        let shown = image.display().unwrap().granted().unwrap();
        assert_eq!(shown, "Displaying image: large_image.jpg");
        assert_eq!(image.cache_stats().display_count, 1);
    }
}
