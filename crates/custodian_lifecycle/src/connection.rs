//! Shared database connection singleton.

use crate::config::{ConfigRegistry, DEFAULT_DATABASE_URL};
use crate::context::{Context, Singleton};
use crate::error::LifecycleError;
use core::sync::atomic::{AtomicBool, Ordering};

/// A simulated database connection shared through a [`Context`].
///
/// The connection string is read from the context's [`ConfigRegistry`] at
/// construction. The connection opens immediately and stays open until
/// [`close`](Self::close); a closed connection is never reopened.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use custodian_lifecycle::{Connection, Context};
///
/// let ctx = Context::new();
/// let db = ctx.instance::<Connection>();
///
/// let result = db.query("SELECT * FROM users").unwrap();
/// assert!(result.contains(db.id()));
/// assert!(Arc::ptr_eq(&db, &ctx.instance::<Connection>()));
/// ```
#[derive(Debug)]
pub struct Connection {
    id: String,
    url: String,
    connected: AtomicBool,
}

impl Singleton for Connection {
    fn construct(ctx: &Context) -> Self {
        let url = ctx
            .instance::<ConfigRegistry>()
            .get("database_url")
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        Self::open(url)
    }
}

impl Connection {
    /// Opens a connection to `url` with a fresh identifier.
    pub fn open(url: impl Into<String>) -> Self {
        let id = format!("db-{}", nanoid::nanoid!());
        let url = url.into();
        tracing::info!(%id, %url, "database connection established");
        Self {
            id,
            url,
            connected: AtomicBool::new(true),
        }
    }

    /// Returns the connection identifier, `db-` followed by a nanoid.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the connection string.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns `true` until the connection is closed.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Runs `sql` and describes the execution.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotConnected`] after [`close`](Self::close).
    pub fn query(&self, sql: &str) -> Result<String, LifecycleError> {
        if !self.is_connected() {
            tracing::warn!(id = %self.id, sql, "query on closed connection");
            return Err(LifecycleError::NotConnected {
                id: self.id.clone(),
            });
        }
        tracing::debug!(id = %self.id, sql, "executing query");
        Ok(format!("Executing query: {sql} | connection: {}", self.id))
    }

    /// Closes the connection. Closing twice is a no-op.
    pub fn close(&self) {
        if self.connected.swap(false, Ordering::AcqRel) {
            tracing::info!(id = %self.id, "database connection closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_url_from_config() {
        let ctx = Context::new();
        ctx.instance::<ConfigRegistry>()
            .set("database_url", "postgresql://db.internal:5432/app");

        let db = ctx.instance::<Connection>();
        assert_eq!(db.url(), "postgresql://db.internal:5432/app");
        assert!(db.id().starts_with("db-"));
    }

    #[test]
    fn closed_connection_rejects_queries() {
        let db = Connection::open(DEFAULT_DATABASE_URL);
        db.close();
        db.close();

        assert!(!db.is_connected());
        assert_eq!(
            db.query("SELECT 1"),
            Err(LifecycleError::NotConnected { id: db.id().to_string() })
        );
    }

    #[test]
    fn ids_are_unique_per_connection() {
        let a = Connection::open(DEFAULT_DATABASE_URL);
        let b = Connection::open(DEFAULT_DATABASE_URL);
        assert_ne!(a.id(), b.id());
    }
}
