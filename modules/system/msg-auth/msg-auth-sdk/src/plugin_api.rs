//! Provider SPI.
//!
//! Providers implement [`AuthConfigProvider`] and register it with an
//! [`AuthConfigFactory`]. The engine discovers the provider per
//! (message layer, application context) and drives it through three stages:
//! server configuration, auth context, request validation.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::callback::CallbackHandler;
use crate::error::MsgAuthError;
use crate::models::{MessageInfo, Subject, ValidationResponse};

/// Registry of providers keyed by message layer and application context.
pub trait AuthConfigFactory: Send + Sync {
    /// Find the provider responsible for `(layer, app_context)`.
    fn config_provider(
        &self,
        layer: &str,
        app_context: &str,
    ) -> Option<Arc<dyn AuthConfigProvider>>;

    /// Register `provider`. `None` for `layer` or `app_context` registers a
    /// wildcard. Returns the registration id.
    fn register_config_provider(
        &self,
        provider: Arc<dyn AuthConfigProvider>,
        layer: Option<&str>,
        app_context: Option<&str>,
        description: &str,
    ) -> String;

    /// Remove a registration. Returns `true` if it existed.
    fn remove_registration(&self, registration_id: &str) -> bool;

    /// Ids of all current registrations.
    fn registration_ids(&self) -> Vec<String>;
}

/// A pluggable provider of server authentication configuration.
pub trait AuthConfigProvider: Send + Sync {
    /// Get the server configuration for `(layer, app_context)`.
    ///
    /// `handler` is the server's callback handler for this negotiation.
    ///
    /// # Errors
    ///
    /// - `Auth` if the provider cannot produce a configuration
    /// - `Security` if the caller is not permitted to obtain one
    fn server_auth_config(
        &self,
        layer: &str,
        app_context: &str,
        handler: Arc<dyn CallbackHandler>,
    ) -> Result<Arc<dyn ServerAuthConfig>, MsgAuthError>;
}

/// Server-side configuration for one layer and application context.
pub trait ServerAuthConfig: Send + Sync {
    /// Pick the auth context identifier that applies to `message`.
    ///
    /// # Errors
    ///
    /// Returns `Auth` if no identifier can be derived.
    fn auth_context_id(&self, message: &MessageInfo<'_>) -> Result<String, MsgAuthError>;

    /// Acquire the auth context for `id`. `Ok(None)` means the provider
    /// declines to handle it.
    ///
    /// # Errors
    ///
    /// Returns `Auth` if the context cannot be created.
    fn auth_context(
        &self,
        id: &str,
        service_subject: Option<&Subject>,
        properties: &BTreeMap<String, String>,
    ) -> Result<Option<Arc<dyn ServerAuthContext>>, MsgAuthError>;
}

/// Performs the actual request validation.
pub trait ServerAuthContext: Send + Sync {
    /// Validate the request.
    ///
    /// # Arguments
    ///
    /// * `message` - The request message and input options
    /// * `client_subject` - Receives the caller's principals
    /// * `service_subject` - The server's own subject, when one is wired
    ///
    /// # Errors
    ///
    /// - `Auth` if validation cannot be performed
    /// - `Security` if a callback rejected the caller
    fn validate_request(
        &self,
        message: &MessageInfo<'_>,
        client_subject: &mut Subject,
        service_subject: Option<&Subject>,
    ) -> Result<ValidationResponse, MsgAuthError>;
}
