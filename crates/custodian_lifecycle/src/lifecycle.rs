//! Construct-once holder for a single shared instance.

use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use std::sync::Arc;

/// Holds at most one instance of `T`, built on first request.
///
/// Lookups take a shared read lock. On a miss the caller takes the
/// upgradable lock, checks again, and only then runs the initializer, so
/// racing first requests construct exactly once and all observe the same
/// [`Arc`].
///
/// The initializer runs while the upgradable lock is held: it must not
/// request an instance from the same `Lifecycle`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use custodian_lifecycle::Lifecycle;
///
/// let lifecycle = Lifecycle::new();
/// let a = lifecycle.instance(|| String::from("ready"));
/// let b = lifecycle.instance(|| String::from("ignored"));
///
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_eq!(lifecycle.constructions(), 1);
/// ```
pub struct Lifecycle<T> {
    value: RwLock<Option<Arc<T>>>,
    constructions: AtomicUsize,
}

impl<T> Default for Lifecycle<T> {
    fn default() -> Self {
        Self {
            value: RwLock::new(None),
            constructions: AtomicUsize::new(0),
        }
    }
}

impl<T> Lifecycle<T> {
    /// Creates an empty lifecycle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the instance, building it with `init` on first use.
    ///
    /// If `init` panics nothing is stored and a later call builds again.
    pub fn instance<F>(&self, init: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        if let Some(value) = self.value.read().as_ref() {
            return Arc::clone(value);
        }

        let guard = self.value.upgradable_read();
        if let Some(value) = guard.as_ref() {
            return Arc::clone(value);
        }

        let value = Arc::new(init());
        self.constructions.fetch_add(1, Ordering::AcqRel);
        let mut slot = RwLockUpgradableReadGuard::upgrade(guard);
        *slot = Some(Arc::clone(&value));
        value
    }

    /// Returns the instance if it has been built. Never builds.
    #[must_use]
    pub fn get(&self) -> Option<Arc<T>> {
        self.value.read().clone()
    }

    /// Returns `true` once the instance exists.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.value.read().is_some()
    }

    /// Returns how many times the initializer has completed (0 or 1).
    #[must_use]
    pub fn constructions(&self) -> usize {
        self.constructions.load(Ordering::Acquire)
    }
}

impl<T> fmt::Debug for Lifecycle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("type", &core::any::type_name::<T>())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    #[test]
    fn get_does_not_build() {
        let lifecycle = Lifecycle::<u32>::new();
        assert!(lifecycle.get().is_none());
        assert!(!lifecycle.is_initialized());
        assert_eq!(lifecycle.constructions(), 0);
    }

    #[test]
    fn later_initializers_are_ignored() {
        let lifecycle = Lifecycle::new();
        let mut runs = 0;

        lifecycle.instance(|| {
            runs += 1;
            1
        });
        let value = lifecycle.instance(|| {
            runs += 1;
            2
        });

        assert_eq!(*value, 1);
        assert_eq!(runs, 1);
        assert!(lifecycle.is_initialized());
    }

    #[test]
    fn panicking_initializer_leaves_it_empty() {
        let lifecycle = Lifecycle::<u32>::new();

        let result = catch_unwind(AssertUnwindSafe(|| {
            lifecycle.instance(|| panic!("boom"));
        }));
        assert!(result.is_err());
        assert!(!lifecycle.is_initialized());

        assert_eq!(*lifecycle.instance(|| 7), 7);
        assert_eq!(lifecycle.constructions(), 1);
    }
}
