//! Resource-lifecycle primitives for Rust.
//!
//! Custodian covers three ways of controlling when expensive state is
//! built and who shares it:
//!
//! - [`custodian_pool`] - Deduplicate immutable state behind a keyed pool
//! - [`custodian_mediator`] - Defer, memoize or gate access to a resource
//! - [`custodian_lifecycle`] - One instance per type in an explicit context
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use custodian::prelude::*;
//!
//! let pool = SharedPool::<custodian::custodian_pool::ParticleKind>::new();
//! let key = IntrinsicKey::new(["red", "fire"]).unwrap();
//! assert!(SharedHandle::ptr_eq(&pool.get_shared(&key), &pool.get_shared(&key)));
//!
//! let image = Mediator::lazy("photo1.jpg", Arc::new(SimulatedLoader::instant()));
//! assert_eq!(image.phase(), Phase::Unconstructed);
//!
//! let ctx = Context::new();
//! assert!(Arc::ptr_eq(&ctx.instance::<ConfigRegistry>(), &ctx.instance::<ConfigRegistry>()));
//! ```

pub use custodian_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use custodian_internal::prelude::*;
}
