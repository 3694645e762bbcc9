//! Error types for the shared-state pool.

/// Errors that can occur when building keys or requesting shared handles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The intrinsic key is malformed or would be ambiguous once joined.
    #[error("invalid intrinsic key '{key}': {reason}")]
    InvalidKey {
        /// The rejected key, as supplied by the caller.
        key: String,
        /// Why the key was rejected.
        reason: &'static str,
    },
}

impl PoolError {
    /// Creates an [`InvalidKey`](Self::InvalidKey) error.
    pub(crate) fn invalid_key(key: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason,
        }
    }
}
