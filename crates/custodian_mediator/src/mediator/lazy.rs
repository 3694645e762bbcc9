use super::{Backing, Mediated};
use crate::access::Access;
use crate::asset::{Asset, Loader};
use crate::error::MediatorError;
use crate::slot::Phase;
use core::fmt;
use std::sync::Arc;

/// Size reported by a [`LazyMediator`] before its resource is constructed.
pub const DEFAULT_ESTIMATED_SIZE: u64 = 750;

/// Defers construction of the resource until it is displayed.
///
/// Metadata queries never trigger construction: [`size`](Mediated::size)
/// returns an estimate while the resource is unconstructed and the real size
/// afterwards.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use custodian_mediator::{LazyMediator, Mediated, Phase, SimulatedLoader};
///
/// let loader = Arc::new(SimulatedLoader::instant());
/// let image = LazyMediator::new("photo1.jpg", Arc::clone(&loader));
///
/// assert_eq!(image.size().unwrap().granted(), Some(750));
/// assert_eq!(image.phase(), Phase::Unconstructed);
///
/// image.display().unwrap();
/// image.display().unwrap();
/// assert_eq!(image.phase(), Phase::Constructed);
/// assert_eq!(loader.loads(), 1);
/// ```
pub struct LazyMediator<L: Loader> {
    backing: Backing<L>,
    estimated_size: u64,
}

impl<L: Loader> LazyMediator<L> {
    /// Creates a mediator for `identifier`. Nothing is loaded yet.
    pub fn new(identifier: impl Into<String>, loader: Arc<L>) -> Self {
        let backing = Backing::new(identifier, loader);
        tracing::debug!(identifier = %backing.identifier, "lazy mediator created");
        Self {
            backing,
            estimated_size: DEFAULT_ESTIMATED_SIZE,
        }
    }

    /// Sets the size reported before construction.
    #[must_use]
    pub fn with_estimated_size(mut self, estimated_size: u64) -> Self {
        self.estimated_size = estimated_size;
        self
    }

    /// Supplies an already-loaded resource, skipping the loader.
    ///
    /// # Errors
    ///
    /// Returns [`MediatorError::AlreadyConstructed`] if the resource exists.
    pub fn preload(&self, asset: L::Asset) -> Result<(), MediatorError> {
        self.backing.install(asset)
    }

    /// Returns the number of constructions performed (0 or 1).
    #[must_use]
    pub fn constructions(&self) -> usize {
        self.backing.slot.constructions()
    }
}

impl<L: Loader> Mediated for LazyMediator<L> {
    fn identifier(&self) -> &str {
        &self.backing.identifier
    }

    fn phase(&self) -> Phase {
        self.backing.slot.phase()
    }

    fn display(&self) -> Result<Access<String>, MediatorError> {
        let asset = self.backing.resource()?;
        Ok(Access::Granted(asset.display()))
    }

    fn size(&self) -> Result<Access<u64>, MediatorError> {
        let size = match self.backing.slot.get() {
            Some(asset) => asset.size(),
            None => {
                tracing::debug!(
                    identifier = %self.backing.identifier,
                    estimate = self.estimated_size,
                    "reporting estimated size"
                );
                self.estimated_size
            }
        };
        Ok(Access::Granted(size))
    }
}

impl<L: Loader> fmt::Debug for LazyMediator<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyMediator")
            .field("backing", &self.backing)
            .field("estimated_size", &self.estimated_size)
            .finish()
    }
}
