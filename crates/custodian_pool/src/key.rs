//! Canonical composite keys for intrinsic state.
//!
//! An [`IntrinsicKey`] is the value identity of shared state. It is built from
//! a fixed number of string fields which are joined with [`SEPARATOR`] to form
//! the canonical rendering (`"red-fire"` for `["red", "fire"]`).
//!
//! Fields are validated at construction so that two distinct field sequences
//! can never render to the same canonical string:
//!
//! - a field may not be empty
//! - a field may not contain [`SEPARATOR`]
//!
//! # Example
//!
//! ```
//! use custodian_pool::IntrinsicKey;
//!
//! let key = IntrinsicKey::new(["red", "fire"]).unwrap();
//! assert_eq!(key.to_string(), "red-fire");
//!
//! let parsed: IntrinsicKey<2> = IntrinsicKey::parse("red-fire").unwrap();
//! assert_eq!(key, parsed);
//!
//! // "dark-red" would make "dark-red-fire" ambiguous.
//! assert!(IntrinsicKey::new(["dark-red", "fire"]).is_err());
//! ```

use crate::error::PoolError;
use core::fmt;

/// Separator placed between fields in the canonical rendering.
pub const SEPARATOR: char = '-';

/// A validated, canonical key made of `N` string fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IntrinsicKey<const N: usize = 2> {
    fields: [Box<str>; N],
}

impl<const N: usize> IntrinsicKey<N> {
    /// Creates a key from its fields.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidKey`] if `N` is zero, or if any field is
    /// empty or contains [`SEPARATOR`].
    pub fn new<S: AsRef<str>>(fields: [S; N]) -> Result<Self, PoolError> {
        if N == 0 {
            return Err(PoolError::invalid_key("", "key needs at least one field"));
        }

        for field in &fields {
            let field = field.as_ref();
            if field.is_empty() {
                return Err(PoolError::invalid_key(
                    join(&fields),
                    "fields must not be empty",
                ));
            }
            if field.contains(SEPARATOR) {
                return Err(PoolError::invalid_key(
                    join(&fields),
                    "fields must not contain the separator",
                ));
            }
        }

        Ok(Self {
            fields: fields.map(|field| Box::from(field.as_ref())),
        })
    }

    /// Parses a key from its canonical rendering.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidKey`] if the string does not split into
    /// exactly `N` non-empty fields.
    pub fn parse(canonical: &str) -> Result<Self, PoolError> {
        let parts: Vec<&str> = canonical.split(SEPARATOR).collect();
        let fields: [&str; N] = parts
            .try_into()
            .map_err(|_| PoolError::invalid_key(canonical, "wrong number of fields"))?;
        Self::new(fields)
    }

    /// Returns the key's fields in order.
    #[must_use]
    pub fn fields(&self) -> &[Box<str>; N] {
        &self.fields
    }
}

impl<const N: usize> fmt::Display for IntrinsicKey<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join(&self.fields))
    }
}

impl<const N: usize> core::str::FromStr for IntrinsicKey<N> {
    type Err = PoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn join<S: AsRef<str>>(fields: &[S]) -> String {
    let mut out = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(SEPARATOR);
        }
        out.push_str(field.as_ref());
    }
    out
}
