//! Server-side collaborator traits.
//!
//! The hosting HTTP server implements these for each request and hands them to
//! the engine. The engine never reaches into the server any other way.

use std::sync::Arc;

use http::StatusCode;
use web_security::{AuthType, SecurityIdentity};

use crate::error::{ExchangeError, RegistryError};
use crate::plugin_api::AuthConfigFactory;

/// The enclosing security context of a single request.
pub trait SecurityContext {
    /// Whether an identity has already been established for this request.
    fn is_authenticated(&self) -> bool;

    /// Whether the current path mandates authentication.
    fn is_authentication_required(&self) -> bool;

    /// Mark the request as authenticated.
    fn authentication_complete(
        &mut self,
        identity: SecurityIdentity,
        auth_type: AuthType,
        message_layer: &str,
    );
}

/// A server-managed HTTP session.
///
/// Attribute values are JSON so any session store can persist them.
pub trait HttpSession: Send + Sync {
    fn id(&self) -> &str;

    /// # Errors
    ///
    /// Returns `ExchangeError` if the session store fails.
    fn attribute(&self, key: &str) -> Result<Option<serde_json::Value>, ExchangeError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `ExchangeError` if the session store fails.
    fn set_attribute(&self, key: &str, value: serde_json::Value) -> Result<(), ExchangeError>;

    /// Remove `key`, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns `ExchangeError` if the session store fails.
    fn remove_attribute(&self, key: &str) -> Result<Option<serde_json::Value>, ExchangeError>;
}

/// The request/response exchange as seen by the engine.
pub trait ServerExchange {
    /// The inbound request.
    fn request(&self) -> &http::request::Parts;

    /// Get the request's session, creating it when `create` is `true`.
    ///
    /// # Errors
    ///
    /// Returns `ExchangeError` if the session store fails.
    fn session(&mut self, create: bool) -> Result<Option<Arc<dyn HttpSession>>, ExchangeError>;

    /// Set the response status code.
    fn set_status_code(&mut self, status: StatusCode);
}

/// The base authentication mechanism used when no provider is configured.
pub trait FallbackAuthenticator: Send + Sync {
    /// Authenticate using the base mechanism.
    ///
    /// # Errors
    ///
    /// Returns `ExchangeError` for infrastructure failures; a rejected caller
    /// is `Ok(false)`.
    fn authenticate(
        &self,
        exchange: &mut dyn ServerExchange,
        security: &mut dyn SecurityContext,
    ) -> Result<bool, ExchangeError>;
}

/// Identity source of the security domain the engine is bound to.
pub trait SecurityDomain: Send + Sync {
    /// Resolve a fully populated identity for `name`, if the domain knows it.
    fn identity_for(&self, name: &str) -> Option<SecurityIdentity>;

    /// Check a username/password pair.
    fn verify_password(&self, name: &str, password: &str) -> bool;
}

/// Access to the provider factory.
///
/// Production code points this at the process-wide factory; tests inject their own.
pub trait RegistryAccess: Send + Sync {
    /// Obtain the factory.
    ///
    /// `Ok(None)` means no factory is installed, which is the normal
    /// unconfigured state.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` if the factory exists but cannot be obtained.
    fn factory(&self) -> Result<Option<Arc<dyn AuthConfigFactory>>, RegistryError>;
}
