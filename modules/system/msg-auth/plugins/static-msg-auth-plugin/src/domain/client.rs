//! Provider SPI implementation for the static message authentication plugin.
//!
//! Binds the domain service to `AuthConfigProvider`, `ServerAuthConfig` and
//! `ServerAuthContext`.

use std::collections::BTreeMap;
use std::sync::Arc;

use msg_auth_sdk::{
    AuthConfigProvider, CallbackHandler, MessageInfo, MsgAuthError, ServerAuthConfig,
    ServerAuthContext, Subject, ValidationResponse,
};

use super::service::Service;

/// Every request shares one auth context.
pub const AUTH_CONTEXT_ID: &str = "static";

/// Registered provider.
pub struct StaticAuthConfigProvider {
    service: Arc<Service>,
}

impl StaticAuthConfigProvider {
    #[must_use]
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

impl AuthConfigProvider for StaticAuthConfigProvider {
    fn server_auth_config(
        &self,
        _layer: &str,
        _app_context: &str,
        handler: Arc<dyn CallbackHandler>,
    ) -> Result<Arc<dyn ServerAuthConfig>, MsgAuthError> {
        Ok(Arc::new(StaticServerAuthConfig {
            service: Arc::clone(&self.service),
            handler,
        }))
    }
}

/// Server configuration bound to one negotiation's callback handler.
///
/// Also serves as its own auth context.
#[derive(Clone)]
pub struct StaticServerAuthConfig {
    service: Arc<Service>,
    handler: Arc<dyn CallbackHandler>,
}

impl ServerAuthConfig for StaticServerAuthConfig {
    fn auth_context_id(&self, _message: &MessageInfo<'_>) -> Result<String, MsgAuthError> {
        Ok(AUTH_CONTEXT_ID.to_owned())
    }

    fn auth_context(
        &self,
        auth_context_id: &str,
        _service_subject: Option<&Subject>,
        _properties: &BTreeMap<String, String>,
    ) -> Result<Option<Arc<dyn ServerAuthContext>>, MsgAuthError> {
        if auth_context_id != AUTH_CONTEXT_ID {
            return Ok(None);
        }
        Ok(Some(Arc::new(self.clone())))
    }
}

impl ServerAuthContext for StaticServerAuthConfig {
    fn validate_request(
        &self,
        message: &MessageInfo<'_>,
        client_subject: &mut Subject,
        _service_subject: Option<&Subject>,
    ) -> Result<ValidationResponse, MsgAuthError> {
        self.service
            .validate(message, client_subject, self.handler.as_ref())
    }
}
