//! Error types for the message authentication contracts.

use thiserror::Error;

/// Errors raised by a provider while negotiating.
///
/// Both variants are terminal for the request: the engine marks the response
/// as an internal server error and does not fall back to the base mechanism.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MsgAuthError {
    /// Authentication-specific failure inside the provider.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Security failure (e.g. a callback rejected an identity).
    #[error("security error: {0}")]
    Security(String),
}

/// Infrastructure failures of the hosting server (session store, exchange).
///
/// Never interpreted by the engine, only propagated.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The session store failed.
    #[error("session store error: {0}")]
    Session(String),

    /// A session attribute could not be encoded.
    #[error("session attribute encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Any other failure of the hosting server.
    #[error("exchange error: {0}")]
    Other(String),
}

/// The provider factory could not be obtained.
#[derive(Debug, Clone, Error)]
#[error("auth config factory unavailable: {0}")]
pub struct RegistryError(pub String);
