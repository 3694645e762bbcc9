//! Init-once singletons for Custodian.
//!
//! `custodian_lifecycle` guarantees a single instance per type without a
//! hidden global. Callers hold an explicit [`Context`] and ask it for
//! instances:
//!
//! - [`Lifecycle`] - Double-checked, construct-once holder
//! - [`Singleton`] - Types with one instance per [`Context`]
//! - [`ConfigRegistry`] - Application settings loaded once
//! - [`Connection`] - A shared database connection configured from the registry
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use custodian_lifecycle::{ConfigRegistry, Connection, Context};
//!
//! let ctx = Arc::new(Context::new());
//!
//! let db = ctx.instance::<Connection>();
//! assert_eq!(db.url(), "postgresql://localhost:5432/myapp");
//!
//! // The connection pulled the registry in as a dependency.
//! assert!(ctx.contains::<ConfigRegistry>());
//! assert_eq!(ctx.len(), 2);
//! ```

mod config;
mod connection;
mod context;
mod error;
mod lifecycle;

pub use config::{ConfigRegistry, DEFAULT_DATABASE_URL, DEFAULT_SETTINGS};
pub use connection::Connection;
pub use context::{Context, Singleton};
pub use error::LifecycleError;
pub use lifecycle::Lifecycle;
