//! Label of the mechanism that produced an identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when an `AuthType` would be empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("auth type must not be empty")]
pub struct AuthTypeError;

/// Short, non-empty label naming the mechanism that established an identity
/// (provider-supplied, or the configured mechanism name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AuthType(String);

impl AuthType {
    /// Create a new label.
    ///
    /// # Errors
    ///
    /// Returns [`AuthTypeError`] if `value` is empty or only whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, AuthTypeError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AuthTypeError);
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AuthType {
    type Error = AuthTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AuthType> for String {
    fn from(value: AuthType) -> Self {
        value.0
    }
}

impl AsRef<str> for AuthType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
