use super::{Backing, Mediated};
use crate::access::{Access, AccessPolicy, Denial, Role};
use crate::asset::{Asset, Loader};
use crate::error::MediatorError;
use crate::slot::Phase;
use core::fmt;
use std::sync::Arc;

/// Gates every operation on the caller's [`Role`].
///
/// The policy is checked before the resource is touched, so a denied
/// operation never triggers construction. Denial is reported as
/// [`Access::Denied`]; a denied size reads as `0` through
/// [`Access::unwrap_or_default`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use custodian_mediator::{Mediated, Phase, ProtectedMediator, Role, SimulatedLoader};
///
/// let loader = Arc::new(SimulatedLoader::instant());
/// let guest = ProtectedMediator::new("confidential_data.jpg", Arc::clone(&loader), Role::Guest);
///
/// assert!(guest.display().unwrap().is_denied());
/// assert_eq!(guest.size().unwrap().unwrap_or_default(), 0);
/// assert_eq!(guest.phase(), Phase::Unconstructed);
///
/// let admin = ProtectedMediator::new("confidential_data.jpg", loader, Role::Admin);
/// assert!(admin.size().unwrap().unwrap_or_default() > 0);
/// ```
pub struct ProtectedMediator<L: Loader> {
    backing: Backing<L>,
    role: Role,
    policy: Arc<AccessPolicy>,
}

impl<L: Loader> ProtectedMediator<L> {
    /// Creates a mediator for `identifier` acting on behalf of `role`, using
    /// the default [`AccessPolicy`].
    pub fn new(identifier: impl Into<String>, loader: Arc<L>, role: Role) -> Self {
        let backing = Backing::new(identifier, loader);
        tracing::debug!(identifier = %backing.identifier, %role, "protected mediator created");
        Self {
            backing,
            role,
            policy: Arc::new(AccessPolicy::default()),
        }
    }

    /// Replaces the access policy.
    #[must_use]
    pub fn with_policy(mut self, policy: Arc<AccessPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the role this mediator acts for.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the access policy in force.
    #[must_use]
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Returns the number of constructions performed (0 or 1).
    #[must_use]
    pub fn constructions(&self) -> usize {
        self.backing.slot.constructions()
    }

    fn check(&self, operation: &'static str) -> Result<(), Denial> {
        self.policy
            .evaluate(&self.backing.identifier, self.role)
            .inspect_err(|denial| {
                tracing::warn!(
                    identifier = %denial.identifier,
                    role = %denial.role,
                    classification = %denial.classification,
                    operation,
                    "access denied"
                );
            })
    }
}

impl<L: Loader> Mediated for ProtectedMediator<L> {
    fn identifier(&self) -> &str {
        &self.backing.identifier
    }

    fn phase(&self) -> Phase {
        self.backing.slot.phase()
    }

    fn display(&self) -> Result<Access<String>, MediatorError> {
        if let Err(denial) = self.check("display") {
            return Ok(Access::Denied(denial));
        }
        let asset = self.backing.resource()?;
        Ok(Access::Granted(asset.display()))
    }

    fn size(&self) -> Result<Access<u64>, MediatorError> {
        if let Err(denial) = self.check("size") {
            return Ok(Access::Denied(denial));
        }
        let asset = self.backing.resource()?;
        Ok(Access::Granted(asset.size()))
    }
}

impl<L: Loader> fmt::Debug for ProtectedMediator<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtectedMediator")
            .field("backing", &self.backing)
            .field("role", &self.role)
            .field("policy", &self.policy)
            .finish()
    }
}
