//! Shared-state storage and handle management.
//!
//! This module provides the [`SharedState`] trait, the [`SharedHandle`] type
//! handed to contexts, and the [`SharedPool`] container that guarantees at
//! most one live handle per [`IntrinsicKey`].
//!
//! # Ownership
//!
//! The pool holds the long-lived reference to every handle it creates.
//! Contexts clone a [`SharedHandle`], which is a cheap reference-count bump.
//! Because shared values are never mutated after construction, a handle that
//! outlives a [`SharedPool::clear`] keeps observing its original value safely.

use crate::error::PoolError;
use crate::key::IntrinsicKey;
use core::fmt;
use core::ops::Deref;
use hashbrown::HashMap;
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use std::sync::Arc;

/// Immutable state that can be built from its intrinsic key.
///
/// Construction is infallible: any key that passed validation must produce a
/// value.
///
/// # Example
///
/// ```
/// use custodian_pool::{IntrinsicKey, SharedState};
///
/// struct Glyph { ch: String, font: String }
///
/// impl SharedState<2> for Glyph {
///     fn from_key(key: &IntrinsicKey<2>) -> Self {
///         let [ch, font] = key.fields();
///         Self { ch: ch.to_string(), font: font.to_string() }
///     }
/// }
/// ```
pub trait SharedState<const N: usize = 2>: Send + Sync + 'static {
    /// Builds the shared value for a validated key.
    fn from_key(key: &IntrinsicKey<N>) -> Self;
}

/// A reference to a pooled, immutable value.
///
/// Handles compare by identity through [`SharedHandle::ptr_eq`]; two handles
/// obtained for equal keys from the same pool are always identical.
pub struct SharedHandle<T>(Arc<T>);

impl<T> SharedHandle<T> {
    fn new(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Returns `true` if both handles point to the same shared value.
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }
}

impl<T> Clone for SharedHandle<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Deref for SharedHandle<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedHandle").field(&*self.0).finish()
    }
}

/// Container for deduplicated shared state.
///
/// `SharedPool` maps each distinct [`IntrinsicKey`] to exactly one
/// [`SharedHandle`]. Entries are only ever added through the insert-if-absent
/// path and only ever removed by [`clear`](Self::clear).
///
/// # Thread Safety
///
/// The storage sits behind a `RwLock`. Lookups of existing keys take a shared
/// lock. A miss takes an upgradable lock, re-checks, and only then builds the
/// value, so racing first requests for one key construct it exactly once and
/// all observe the same handle. The constructor runs while the upgradable lock
/// is held and must not call back into the same pool.
///
/// # Example
///
/// ```
/// use custodian_pool::{IntrinsicKey, SharedHandle, SharedPool, SharedState};
///
/// struct Tile { name: String }
///
/// impl SharedState<1> for Tile {
///     fn from_key(key: &IntrinsicKey<1>) -> Self {
///         Self { name: key.fields()[0].to_string() }
///     }
/// }
///
/// let pool = SharedPool::<Tile, 1>::new();
/// let key = IntrinsicKey::new(["grass"]).unwrap();
///
/// let a = pool.get_shared(&key);
/// let b = pool.get_shared(&key);
///
/// assert!(SharedHandle::ptr_eq(&a, &b));
/// assert_eq!(pool.count(), 1);
/// ```
pub struct SharedPool<T, const N: usize = 2> {
    storage: RwLock<HashMap<IntrinsicKey<N>, SharedHandle<T>>>,
}

impl<T, const N: usize> Default for SharedPool<T, N> {
    fn default() -> Self {
        Self {
            storage: RwLock::new(HashMap::new()),
        }
    }
}

impl<T, const N: usize> SharedPool<T, N>
where
    T: Send + Sync + 'static,
{
    /// Creates a new empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `key`, building it with `init` on first request.
    ///
    /// `init` is invoked at most once per distinct key for the lifetime of the
    /// pool (until [`clear`](Self::clear)).
    pub fn get_shared_with<F>(&self, key: &IntrinsicKey<N>, init: F) -> SharedHandle<T>
    where
        F: FnOnce(&IntrinsicKey<N>) -> T,
    {
        if let Some(handle) = self.storage.read().get(key) {
            tracing::trace!(%key, "reusing shared handle");
            return handle.clone();
        }

        let storage = self.storage.upgradable_read();
        if let Some(handle) = storage.get(key) {
            tracing::trace!(%key, "shared handle created by a concurrent request");
            return handle.clone();
        }

        let handle = SharedHandle::new(init(key));
        let mut storage = RwLockUpgradableReadGuard::upgrade(storage);
        storage.insert(key.clone(), handle.clone());
        tracing::debug!(%key, count = storage.len(), "created shared handle");
        handle
    }

    /// Returns `true` if a handle exists for `key`.
    #[must_use]
    pub fn contains(&self, key: &IntrinsicKey<N>) -> bool {
        self.storage.read().contains_key(key)
    }

    /// Returns the number of distinct handles created.
    #[must_use]
    pub fn count(&self) -> usize {
        self.storage.read().len()
    }

    /// Returns `true` if no handles have been created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.read().is_empty()
    }

    /// Lists the keys currently in the pool.
    ///
    /// No ordering is guaranteed.
    #[must_use]
    pub fn list(&self) -> Vec<IntrinsicKey<N>> {
        self.storage.read().keys().cloned().collect()
    }

    /// Removes every entry from the pool.
    ///
    /// Handles already given out remain valid and keep their values alive;
    /// later requests build fresh handles.
    pub fn clear(&self) {
        let mut storage = self.storage.write();
        tracing::debug!(dropped = storage.len(), "clearing shared pool");
        storage.clear();
    }
}

impl<T, const N: usize> SharedPool<T, N>
where
    T: SharedState<N>,
{
    /// Returns the handle for `key`, building it via [`SharedState::from_key`]
    /// on first request.
    pub fn get_shared(&self, key: &IntrinsicKey<N>) -> SharedHandle<T> {
        self.get_shared_with(key, T::from_key)
    }

    /// Validates `fields` as a key and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidKey`] for malformed fields. Nothing is
    /// stored in that case.
    pub fn get_shared_parts<S: AsRef<str>>(
        &self,
        fields: [S; N],
    ) -> Result<SharedHandle<T>, PoolError> {
        let key = IntrinsicKey::new(fields)?;
        Ok(self.get_shared(&key))
    }
}

impl<T, const N: usize> fmt::Debug for SharedPool<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let storage = self.storage.read();
        f.debug_struct("SharedPool")
            .field("keys", &storage.keys().collect::<Vec<_>>())
            .finish()
    }
}
