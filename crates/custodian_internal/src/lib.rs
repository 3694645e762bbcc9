//! # Custodian Internal Library
//!
//! Re-exports the core Custodian crates for convenience.

/// Keyed shared-state pooling.
pub use custodian_pool;

/// Lazy, caching and protected access mediators.
pub use custodian_mediator;

/// Init-once singletons in an explicit context.
pub use custodian_lifecycle;

/// Tracing subscriber setup.
#[cfg(feature = "tracing")]
pub use custodian_tracing;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use custodian_lifecycle::{ConfigRegistry, Connection, Context, Lifecycle, Singleton};
    pub use custodian_mediator::{
        Access, AccessPolicy, Asset, Loader, Mediated, Mediator, Phase, Role, SimulatedLoader,
    };
    pub use custodian_pool::{IntrinsicKey, ParticleSystem, SharedHandle, SharedPool, SharedState};
}
