//! Keyed shared-state pool for Custodian.
//!
//! `custodian_pool` deduplicates expensive, immutable state across many
//! lightweight contexts:
//!
//! - [`IntrinsicKey`] - Validated canonical key for shareable state
//! - [`SharedPool`] - At most one live [`SharedHandle`] per key
//! - [`SharedState`] - Construction of a shared value from its key
//! - [`Flyweight`] - Operation contract taking per-use extrinsic state
//! - [`ParticleSystem`] - Many particles drawing their look from one pool
//!
//! # Example
//!
//! ```
//! use custodian_pool::{IntrinsicKey, ParticleKind, SharedHandle, SharedPool};
//!
//! let pool = SharedPool::<ParticleKind>::new();
//!
//! let fire = IntrinsicKey::new(["red", "fire"]).unwrap();
//! let a = pool.get_shared(&fire);
//! let b = pool.get_shared(&fire);
//!
//! assert!(SharedHandle::ptr_eq(&a, &b));
//! assert_eq!(a.color(), "red");
//! ```

mod error;
mod flyweight;
mod key;
mod particle;
mod pool;

pub use error::PoolError;
pub use flyweight::Flyweight;
pub use key::{IntrinsicKey, SEPARATOR};
pub use particle::{MemoryUsage, Motion, Particle, ParticleKind, ParticleSystem, Vec2};
pub use pool::{SharedHandle, SharedPool, SharedState};
