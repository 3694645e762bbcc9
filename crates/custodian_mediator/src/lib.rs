//! Access mediators for Custodian.
//!
//! `custodian_mediator` stands a mediator in front of an expensive resource
//! and decides when, and for whom, the resource is constructed:
//!
//! - [`LazyMediator`] - Construction deferred until first display
//! - [`CachingMediator`] - Derived results computed once and reused
//! - [`ProtectedMediator`] - Operations gated by an [`AccessPolicy`]
//! - [`Mediator`] - Runtime choice between the three
//!
//! The building blocks are public as well:
//!
//! - [`Slot`] - Race-free single construction with retry on failure
//! - [`ResultCache`] - Memo table keyed by [`CacheKey`]
//! - [`Loader`] / [`Asset`] - The resource contract, with [`SimulatedLoader`]
//!   as a stand-in for slow I/O
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use custodian_mediator::{LazyMediator, Mediated, Phase, SimulatedLoader};
//!
//! let image = LazyMediator::new("photo1.jpg", Arc::new(SimulatedLoader::instant()));
//! assert_eq!(image.phase(), Phase::Unconstructed);
//!
//! let shown = image.display().unwrap().granted();
//! assert_eq!(shown.as_deref(), Some("Displaying image: photo1.jpg"));
//! ```

mod access;
mod asset;
mod cache;
mod error;
mod mediator;
mod slot;

pub use access::{Access, AccessPolicy, Classification, Denial, MarkerRule, Role};
pub use asset::{Asset, DEFAULT_LOAD_LATENCY, Image, Loader, SimulatedLoader};
pub use cache::{CacheKey, Operation, ResultCache};
pub use error::{ConstructionError, MediatorError};
pub use mediator::{
    CacheStats, CachingMediator, DEFAULT_ESTIMATED_SIZE, LazyMediator, Mediated, Mediator,
    ProtectedMediator,
};
pub use slot::{Phase, Slot};
