//! Access policy for protected mediators.
//!
//! Access is decided by two explicit tables:
//!
//! 1. **Classification**: which [`Classification`] a resource identifier has.
//!    Exact identifier entries win; otherwise the first [`MarkerRule`] whose
//!    marker occurs in the identifier applies; otherwise the resource is
//!    [`Classification::Public`].
//! 2. **Permission**: the minimum [`Role`] required for each classification.
//!    A classification with no entry is closed to every role.
//!
//! # Default Policy
//!
//! | Classification | Assigned by | Minimum role |
//! |----------------|-------------|--------------|
//! | `Public` | fallback | `Guest` |
//! | `Premium` | marker `premium` | `User` |
//! | `Restricted` | markers `confidential`, `restricted` | `Admin` |
//!
//! Policies are plain configuration and can be loaded with `serde`.

use core::fmt;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Caller privilege level, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Anonymous visitor.
    Guest,
    /// Signed-in user.
    User,
    /// Administrator.
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Guest => "guest",
            Self::User => "user",
            Self::Admin => "admin",
        };
        f.write_str(name)
    }
}

/// Sensitivity class of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Open to everyone.
    Public,
    /// Paid content.
    Premium,
    /// Sensitive content.
    Restricted,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Public => "public",
            Self::Premium => "premium",
            Self::Restricted => "restricted",
        };
        f.write_str(name)
    }
}

/// Classifies identifiers that contain `marker`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerRule {
    /// Substring looked for in the resource identifier.
    pub marker: String,
    /// Classification assigned on a match.
    pub classification: Classification,
}

/// Why an operation was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    /// Identifier of the protected resource.
    pub identifier: String,
    /// Role that was refused.
    pub role: Role,
    /// Classification the resource was given.
    pub classification: Classification,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "access denied for {} to '{}' ({})",
            self.role, self.identifier, self.classification
        )
    }
}

/// Outcome of a gated operation.
///
/// Denial is an expected result that callers branch on, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access<T> {
    /// The operation ran and produced a value.
    Granted(T),
    /// The operation was refused; nothing was constructed.
    Denied(Denial),
}

impl<T> Access<T> {
    /// Returns `true` if the operation ran.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }

    /// Returns `true` if the operation was refused.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied(_))
    }

    /// Returns the value, if granted.
    #[must_use]
    pub fn granted(self) -> Option<T> {
        match self {
            Self::Granted(value) => Some(value),
            Self::Denied(_) => None,
        }
    }

    /// Returns the denial, if refused.
    #[must_use]
    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Self::Granted(_) => None,
            Self::Denied(denial) => Some(denial),
        }
    }

    /// Maps a granted value.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Access<U> {
        match self {
            Self::Granted(value) => Access::Granted(f(value)),
            Self::Denied(denial) => Access::Denied(denial),
        }
    }
}

impl<T: Default> Access<T> {
    /// Returns the value, or `T::default()` if refused (e.g. size `0`).
    #[must_use]
    pub fn unwrap_or_default(self) -> T {
        self.granted().unwrap_or_default()
    }
}

/// Resource classification and role permission tables.
///
/// # Example
///
/// ```
/// use custodian_mediator::{AccessPolicy, Classification, Role};
///
/// let policy = AccessPolicy::default()
///     .with_resource("quarterly_report.pdf", Classification::Restricted);
///
/// assert!(policy.evaluate("public_photo.jpg", Role::Guest).is_ok());
/// assert!(policy.evaluate("premium_content.jpg", Role::Guest).is_err());
/// assert!(policy.evaluate("quarterly_report.pdf", Role::User).is_err());
/// assert!(policy.evaluate("quarterly_report.pdf", Role::Admin).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    #[serde(default)]
    resources: HashMap<String, Classification>,
    #[serde(default)]
    markers: Vec<MarkerRule>,
    minimum_roles: BTreeMap<Classification, Role>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::empty()
            .with_marker("confidential", Classification::Restricted)
            .with_marker("restricted", Classification::Restricted)
            .with_marker("premium", Classification::Premium)
            .with_minimum_role(Classification::Public, Role::Guest)
            .with_minimum_role(Classification::Premium, Role::User)
            .with_minimum_role(Classification::Restricted, Role::Admin)
    }
}

impl AccessPolicy {
    /// Creates a policy with no classifications and no permissions.
    ///
    /// Every resource is public, and public resources are closed until a
    /// minimum role is configured.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            resources: HashMap::new(),
            markers: Vec::new(),
            minimum_roles: BTreeMap::new(),
        }
    }

    /// Classifies one exact identifier.
    #[must_use]
    pub fn with_resource(
        mut self,
        identifier: impl Into<String>,
        classification: Classification,
    ) -> Self {
        self.resources.insert(identifier.into(), classification);
        self
    }

    /// Appends a marker rule. Earlier rules take precedence.
    #[must_use]
    pub fn with_marker(
        mut self,
        marker: impl Into<String>,
        classification: Classification,
    ) -> Self {
        self.markers.push(MarkerRule {
            marker: marker.into(),
            classification,
        });
        self
    }

    /// Sets the minimum role for a classification.
    #[must_use]
    pub fn with_minimum_role(mut self, classification: Classification, role: Role) -> Self {
        self.minimum_roles.insert(classification, role);
        self
    }

    /// Returns the classification of `identifier`.
    #[must_use]
    pub fn classify(&self, identifier: &str) -> Classification {
        if let Some(classification) = self.resources.get(identifier) {
            return *classification;
        }

        self.markers
            .iter()
            .find(|rule| identifier.contains(rule.marker.as_str()))
            .map_or(Classification::Public, |rule| rule.classification)
    }

    /// Returns the minimum role for `classification`, if it is open at all.
    #[must_use]
    pub fn minimum_role(&self, classification: Classification) -> Option<Role> {
        self.minimum_roles.get(&classification).copied()
    }

    /// Decides whether `role` may access `identifier`.
    ///
    /// # Errors
    ///
    /// Returns a [`Denial`] describing the refusal.
    pub fn evaluate(&self, identifier: &str, role: Role) -> Result<(), Denial> {
        let classification = self.classify(identifier);
        match self.minimum_role(classification) {
            Some(minimum) if role >= minimum => Ok(()),
            _ => Err(Denial {
                identifier: identifier.to_string(),
                role,
                classification,
            }),
        }
    }
}
