//! Domain errors for message authentication.

use msg_auth_sdk::{ExchangeError, MsgAuthError};

/// Internal domain errors raised while a provider is consulted.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    /// The provider failed. Terminal for the request, never propagated.
    #[error("negotiation failed: {0}")]
    Negotiation(#[from] MsgAuthError),

    /// The hosting server failed. Propagated to the caller as-is.
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}
