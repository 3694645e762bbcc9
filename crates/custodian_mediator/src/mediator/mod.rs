//! Access mediators over an expensive resource.
//!
//! Every mediator implements the [`Mediated`] contract and owns exactly one
//! construction [`Slot`] for its resource:
//!
//! | Variant | Policy |
//! |---------|--------|
//! | [`LazyMediator`] | Defers construction until the resource is displayed |
//! | [`CachingMediator`] | Memoizes derived results and echoes repeat displays |
//! | [`ProtectedMediator`] | Gates every operation on the caller's [`Role`](crate::Role) |
//!
//! [`Mediator`] wraps the three variants for callers that pick a policy at
//! runtime.
//!
//! # Thread Safety
//!
//! Mediators are `Send + Sync`. Concurrent operations on one mediator share a
//! single construction; see [`Slot`].

mod caching;
mod lazy;
mod protected;

pub use caching::{CacheStats, CachingMediator};
pub use lazy::{DEFAULT_ESTIMATED_SIZE, LazyMediator};
pub use protected::ProtectedMediator;

use crate::access::{Access, Role};
use crate::asset::Loader;
use crate::error::MediatorError;
use crate::slot::{Phase, Slot};
use core::fmt;
use std::sync::Arc;

/// Operations shared by every mediator variant.
pub trait Mediated: Send + Sync {
    /// Returns the identifier of the mediated resource.
    fn identifier(&self) -> &str;

    /// Returns the construction phase of the mediated resource.
    fn phase(&self) -> Phase;

    /// Presents the resource, constructing it first if required.
    ///
    /// # Errors
    ///
    /// Returns [`MediatorError::Construction`] if the resource fails to load.
    fn display(&self) -> Result<Access<String>, MediatorError>;

    /// Returns the resource size in kilobytes.
    ///
    /// # Errors
    ///
    /// Returns [`MediatorError::Construction`] if answering requires the
    /// resource and it fails to load.
    fn size(&self) -> Result<Access<u64>, MediatorError>;
}

/// Resource identifier, loader, and construction slot common to all variants.
struct Backing<L: Loader> {
    identifier: String,
    loader: Arc<L>,
    slot: Slot<L::Asset>,
}

impl<L: Loader> Backing<L> {
    fn new(identifier: impl Into<String>, loader: Arc<L>) -> Self {
        Self {
            identifier: identifier.into(),
            loader,
            slot: Slot::new(),
        }
    }

    /// Returns the resource, loading it on first use.
    fn resource(&self) -> Result<Arc<L::Asset>, MediatorError> {
        self.slot
            .get_or_try_init(|| {
                tracing::info!(identifier = %self.identifier, "constructing mediated resource");
                self.loader.load(&self.identifier)
            })
            .map_err(|err| {
                tracing::warn!(identifier = %self.identifier, error = %err, "construction failed");
                MediatorError::from(err)
            })
    }

    fn install(&self, asset: L::Asset) -> Result<(), MediatorError> {
        self.slot
            .install(asset)
            .map(drop)
            .map_err(|_| MediatorError::AlreadyConstructed {
                identifier: self.identifier.clone(),
            })
    }
}

impl<L: Loader> fmt::Debug for Backing<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backing")
            .field("identifier", &self.identifier)
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

/// A mediator whose policy is chosen at runtime.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use custodian_mediator::{Mediated, Mediator, Role, SimulatedLoader};
///
/// let loader = Arc::new(SimulatedLoader::instant());
/// let mediators = vec![
///     Mediator::lazy("photo1.jpg", Arc::clone(&loader)),
///     Mediator::caching("large_image.jpg", Arc::clone(&loader)),
///     Mediator::protected("premium_content.jpg", Arc::clone(&loader), Role::Guest),
/// ];
///
/// let granted: Vec<bool> = mediators
///     .iter()
///     .map(|m| m.display().unwrap().is_granted())
///     .collect();
///
/// assert_eq!(granted, vec![true, true, false]);
/// ```
pub enum Mediator<L: Loader> {
    /// Deferred construction.
    Lazy(LazyMediator<L>),
    /// Memoized results.
    Caching(CachingMediator<L>),
    /// Role-gated access.
    Protected(ProtectedMediator<L>),
}

impl<L: Loader> Mediator<L> {
    /// Creates a [`LazyMediator`].
    pub fn lazy(identifier: impl Into<String>, loader: Arc<L>) -> Self {
        Self::Lazy(LazyMediator::new(identifier, loader))
    }

    /// Creates a [`CachingMediator`].
    pub fn caching(identifier: impl Into<String>, loader: Arc<L>) -> Self {
        Self::Caching(CachingMediator::new(identifier, loader))
    }

    /// Creates a [`ProtectedMediator`] with the default policy.
    pub fn protected(identifier: impl Into<String>, loader: Arc<L>, role: Role) -> Self {
        Self::Protected(ProtectedMediator::new(identifier, loader, role))
    }

    /// Returns the variant name.
    #[must_use]
    pub fn policy_name(&self) -> &'static str {
        match self {
            Self::Lazy(_) => "lazy",
            Self::Caching(_) => "caching",
            Self::Protected(_) => "protected",
        }
    }

    fn as_mediated(&self) -> &dyn Mediated {
        match self {
            Self::Lazy(m) => m,
            Self::Caching(m) => m,
            Self::Protected(m) => m,
        }
    }
}

impl<L: Loader> fmt::Debug for Mediator<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lazy(m) => f.debug_tuple("Lazy").field(m).finish(),
            Self::Caching(m) => f.debug_tuple("Caching").field(m).finish(),
            Self::Protected(m) => f.debug_tuple("Protected").field(m).finish(),
        }
    }
}

impl<L: Loader> Mediated for Mediator<L> {
    fn identifier(&self) -> &str {
        self.as_mediated().identifier()
    }

    fn phase(&self) -> Phase {
        self.as_mediated().phase()
    }

    fn display(&self) -> Result<Access<String>, MediatorError> {
        self.as_mediated().display()
    }

    fn size(&self) -> Result<Access<u64>, MediatorError> {
        self.as_mediated().size()
    }
}

impl<L: Loader> From<LazyMediator<L>> for Mediator<L> {
    fn from(m: LazyMediator<L>) -> Self {
        Self::Lazy(m)
    }
}

impl<L: Loader> From<CachingMediator<L>> for Mediator<L> {
    fn from(m: CachingMediator<L>) -> Self {
        Self::Caching(m)
    }
}

impl<L: Loader> From<ProtectedMediator<L>> for Mediator<L> {
    fn from(m: ProtectedMediator<L>) -> Self {
        Self::Protected(m)
    }
}
