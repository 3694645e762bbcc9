//! Error types for mediated resources.

/// The expensive resource could not be constructed.
///
/// Construction failures are not sticky: the mediator returns to the
/// unconstructed phase and the next operation retries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to construct '{identifier}': {reason}")]
pub struct ConstructionError {
    /// Identifier of the resource being constructed.
    pub identifier: String,
    /// Loader-supplied description of the failure.
    pub reason: String,
}

impl ConstructionError {
    /// Creates a new construction error.
    pub fn new(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }
}

/// Errors returned by mediator operations.
///
/// Access denial is not an error; see [`Access`](crate::Access).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediatorError {
    /// The underlying resource failed to construct.
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    /// A resource was supplied for a mediator whose resource already exists.
    ///
    /// Construction is permanent for the life of a mediator, so this
    /// indicates a programming error in the caller.
    #[error("resource '{identifier}' is already constructed")]
    AlreadyConstructed {
        /// Identifier of the mediated resource.
        identifier: String,
    },
}
