//! Callbacks a provider uses to hand credentials and principals back to the server.

use secrecy::SecretString;

use crate::error::MsgAuthError;

/// A single request from the provider to the server's security domain.
#[derive(Debug)]
pub enum Callback {
    /// Establish the caller. `None` establishes the anonymous caller.
    CallerPrincipal { name: Option<String> },

    /// Attach group memberships to the caller.
    GroupPrincipal { groups: Vec<String> },

    /// Ask the server to check a username/password pair. `result` is filled in
    /// by the handler.
    PasswordValidation {
        username: String,
        password: SecretString,
        result: bool,
    },
}

impl Callback {
    #[must_use]
    pub fn caller(name: &str) -> Self {
        Self::CallerPrincipal {
            name: Some(name.to_owned()),
        }
    }

    #[must_use]
    pub fn anonymous_caller() -> Self {
        Self::CallerPrincipal { name: None }
    }

    #[must_use]
    pub fn groups<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::GroupPrincipal {
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn password(username: &str, password: impl Into<SecretString>) -> Self {
        Self::PasswordValidation {
            username: username.to_owned(),
            password: password.into(),
            result: false,
        }
    }
}

/// Handler created by the server for one negotiation and passed to the provider
/// when it builds its server configuration.
pub trait CallbackHandler: Send + Sync {
    /// Process callbacks in order.
    ///
    /// # Errors
    ///
    /// - `Security` if a callback names an identity the server rejects
    /// - `Auth` for any other failure to process a callback
    fn handle(&self, callbacks: &mut [Callback]) -> Result<(), MsgAuthError>;
}
