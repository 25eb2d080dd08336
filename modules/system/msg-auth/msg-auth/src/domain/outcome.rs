//! Interpretation of a provider's validation response.

use msg_auth_sdk::{AuthStatus, ValidationResponse, options};
use web_security::{AuthType, SecurityIdentity};

/// What the engine should do with a validation response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// `SUCCESS`: mark the request authenticated, and cache the identity when
    /// `register_session` is set.
    Authenticated {
        identity: SecurityIdentity,
        auth_type: AuthType,
        register_session: bool,
    },
    /// `SEND_SUCCESS` with `registerSession`: cache the identity, but the
    /// current request stays unauthenticated.
    SessionOnly {
        identity: SecurityIdentity,
        auth_type: AuthType,
    },
    /// Anything else.
    NotAuthenticated,
}

/// `true` only when the `registerSession` option is present and reads as boolean true.
#[must_use]
pub fn register_session_requested(response: &ValidationResponse) -> bool {
    response
        .option(options::REGISTER_SESSION)
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// The `authType` option when usable, otherwise `mechanism`.
#[must_use]
pub fn resolve_auth_type(response: &ValidationResponse, mechanism: &AuthType) -> AuthType {
    response
        .option(options::AUTH_TYPE)
        .and_then(|v| AuthType::new(v).ok())
        .unwrap_or_else(|| mechanism.clone())
}

/// Map a validation response to an [`Outcome`].
///
/// `identity` is only called when the response is accepted.
#[must_use]
pub fn interpret<F>(response: &ValidationResponse, mechanism: &AuthType, identity: F) -> Outcome
where
    F: FnOnce() -> SecurityIdentity,
{
    let register_session = register_session_requested(response);
    let accepted = match response.status() {
        AuthStatus::Success => true,
        AuthStatus::SendSuccess => register_session,
        AuthStatus::SendFailure | AuthStatus::SendContinue => false,
    };
    if !accepted {
        return Outcome::NotAuthenticated;
    }

    let auth_type = resolve_auth_type(response, mechanism);
    let identity = identity();

    if response.status() == AuthStatus::Success {
        Outcome::Authenticated {
            identity,
            auth_type,
            register_session,
        }
    } else {
        Outcome::SessionOnly {
            identity,
            auth_type,
        }
    }
}
