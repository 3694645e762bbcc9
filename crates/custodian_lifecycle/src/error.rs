//! Error types for lifecycle-managed singletons.

/// Errors returned by singleton operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// The connection has been closed.
    #[error("connection '{id}' is not connected")]
    NotConnected {
        /// Identifier of the closed connection.
        id: String,
    },
}
