//! Authentication resolution service.

use std::sync::Arc;

use http::StatusCode;
use tracing::{debug, trace};
use web_security::AuthType;
use web_security::constants::SERVLET_MESSAGE_LAYER;

use msg_auth_sdk::{
    AuthConfigProvider, ExchangeError, FallbackAuthenticator, RegistryAccess, SecurityContext,
    SecurityDomain, ServerExchange,
};

use super::error::DomainError;
use super::negotiation::{Negotiated, Negotiation};
use super::outcome::{Outcome, interpret};
use super::registry::ProviderRegistryLookup;
use super::session_cache::{self, SessionIdentityRecord};
use crate::config::{ConfigError, MsgAuthConfig};

/// Message authentication service.
///
/// Decides per request whether the configured provider or the base mechanism
/// authenticates it:
/// 1. A request that is already authenticated is left alone
/// 2. With providers enabled and one registered, the session cache is tried
///    first, then the provider is negotiated with; its answer is final
/// 3. Otherwise the fallback mechanism decides
pub struct Service {
    config: MsgAuthConfig,
    mechanism: AuthType,
    lookup: ProviderRegistryLookup,
    domain: Arc<dyn SecurityDomain>,
    fallback: Arc<dyn FallbackAuthenticator>,
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("config", &self.config)
            .field("mechanism", &self.mechanism)
            .finish_non_exhaustive()
    }
}

impl Service {
    /// Create the service.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptyMechanismName` if the configured mechanism name is blank.
    pub fn new(
        config: MsgAuthConfig,
        registry: Arc<dyn RegistryAccess>,
        domain: Arc<dyn SecurityDomain>,
        fallback: Arc<dyn FallbackAuthenticator>,
    ) -> Result<Self, ConfigError> {
        let mechanism = config.mechanism()?;
        trace!(
            enabled = config.enabled,
            app_context = %config.application_context,
            "Created msg_auth service"
        );
        Ok(Self {
            config,
            mechanism,
            lookup: ProviderRegistryLookup::new(registry),
            domain,
            fallback,
        })
    }

    #[must_use]
    pub fn config(&self) -> &MsgAuthConfig {
        &self.config
    }

    /// Authenticate the request carried by `exchange`.
    ///
    /// Returns `Ok(true)` when the request is authenticated. A provider error
    /// yields `Ok(false)` with the response status set to `500`.
    ///
    /// # Errors
    ///
    /// Returns `ExchangeError` when the session store or the fallback
    /// mechanism fails.
    #[tracing::instrument(skip_all, fields(app_context = %self.config.application_context))]
    pub fn authenticate(
        &self,
        exchange: &mut dyn ServerExchange,
        security: &mut dyn SecurityContext,
    ) -> Result<bool, ExchangeError> {
        if security.is_authenticated() {
            return Ok(true);
        }

        if self.config.enabled
            && let Some(provider) = self
                .lookup
                .lookup(SERVLET_MESSAGE_LAYER, &self.config.application_context)
        {
            return match self.authenticate_with(provider.as_ref(), exchange, security) {
                Ok(authenticated) => Ok(authenticated),
                Err(DomainError::Negotiation(e)) => {
                    trace!(error = %e, "Authentication failed");
                    exchange.set_status_code(StatusCode::INTERNAL_SERVER_ERROR);
                    Ok(false)
                }
                Err(DomainError::Exchange(e)) => Err(e),
            };
        }

        trace!("No provider available, using base HTTP authentication");
        self.fallback.authenticate(exchange, security)
    }

    fn authenticate_with(
        &self,
        provider: &dyn AuthConfigProvider,
        exchange: &mut dyn ServerExchange,
        security: &mut dyn SecurityContext,
    ) -> Result<bool, DomainError> {
        if let Some(record) = session_cache::restore(exchange)? {
            let (identity, auth_type) = record.into_parts();
            debug!(
                principal = %identity.display_name(),
                "SecurityIdentity restored from HttpSession"
            );
            let auth_type = auth_type.unwrap_or_else(|| self.mechanism.clone());
            security.authentication_complete(identity, auth_type, SERVLET_MESSAGE_LAYER);
            return Ok(true);
        }

        let negotiation = Negotiation {
            message_layer: SERVLET_MESSAGE_LAYER,
            application_context: &self.config.application_context,
            integrated: self.config.integrated,
            domain: &self.domain,
        };
        let mandatory = security.is_authentication_required();

        let negotiated = negotiation.run(provider, exchange.request(), mandatory)?;
        let (response, session) = match negotiated {
            Negotiated::Declined => return Ok(false),
            Negotiated::Validated { response, session } => (response, session),
        };

        match interpret(&response, &self.mechanism, || session.authorized_identity()) {
            Outcome::Authenticated {
                identity,
                auth_type,
                register_session,
            } => {
                if register_session {
                    let record =
                        SessionIdentityRecord::new(identity.clone(), Some(auth_type.clone()));
                    session_cache::store(exchange, &record)?;
                }
                debug!(
                    principal = %identity.display_name(),
                    auth_type = %auth_type,
                    "Provider authenticated request"
                );
                security.authentication_complete(identity, auth_type, SERVLET_MESSAGE_LAYER);
                Ok(true)
            }
            Outcome::SessionOnly {
                identity,
                auth_type,
            } => {
                let record = SessionIdentityRecord::new(identity, Some(auth_type));
                session_cache::store(exchange, &record)?;
                Ok(false)
            }
            Outcome::NotAuthenticated => Ok(false),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use msg_auth_sdk::{
        AuthConfigFactory, CallbackHandler, MessageInfo, MsgAuthError, ServerAuthConfig,
        ServerAuthContext, Subject, ValidationResponse,
    };
    use tracing_test::traced_test;
    use web_security::SecurityIdentity;

    use super::*;
    use crate::domain::factory::DefaultAuthConfigFactory;
    use crate::domain::registry::StaticRegistry;
    use crate::domain::session_store::{InMemoryExchange, InMemorySessionStore};

    #[derive(Default)]
    struct Context {
        authenticated: bool,
        completed: Option<(SecurityIdentity, AuthType)>,
    }

    impl SecurityContext for Context {
        fn is_authenticated(&self) -> bool {
            self.authenticated
        }

        fn is_authentication_required(&self) -> bool {
            false
        }

        fn authentication_complete(
            &mut self,
            identity: SecurityIdentity,
            auth_type: AuthType,
            _message_layer: &str,
        ) {
            self.authenticated = true;
            self.completed = Some((identity, auth_type));
        }
    }

    #[derive(Default)]
    struct CountingFallback {
        calls: AtomicUsize,
    }

    impl FallbackAuthenticator for CountingFallback {
        fn authenticate(
            &self,
            _exchange: &mut dyn ServerExchange,
            _security: &mut dyn SecurityContext,
        ) -> Result<bool, ExchangeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }
    }

    struct OpenDomain;

    impl SecurityDomain for OpenDomain {
        fn identity_for(&self, name: &str) -> Option<SecurityIdentity> {
            Some(SecurityIdentity::builder().principal(name).build())
        }

        fn verify_password(&self, _name: &str, _password: &str) -> bool {
            false
        }
    }

    /// Provider that fails in `server_auth_config` or accepts everyone as `bob`.
    struct Provider {
        fail: bool,
    }

    struct Accepting {
        handler: Arc<dyn CallbackHandler>,
    }

    impl AuthConfigProvider for Provider {
        fn server_auth_config(
            &self,
            _layer: &str,
            _app_context: &str,
            handler: Arc<dyn CallbackHandler>,
        ) -> Result<Arc<dyn ServerAuthConfig>, MsgAuthError> {
            if self.fail {
                return Err(MsgAuthError::Auth("provider misconfigured".to_owned()));
            }
            Ok(Arc::new(Accepting { handler }))
        }
    }

    impl ServerAuthConfig for Accepting {
        fn auth_context_id(&self, _message: &MessageInfo<'_>) -> Result<String, MsgAuthError> {
            Ok("ctx".to_owned())
        }

        fn auth_context(
            &self,
            _id: &str,
            _service_subject: Option<&Subject>,
            _properties: &BTreeMap<String, String>,
        ) -> Result<Option<Arc<dyn ServerAuthContext>>, MsgAuthError> {
            Ok(Some(Arc::new(Accepting {
                handler: Arc::clone(&self.handler),
            })))
        }
    }

    impl ServerAuthContext for Accepting {
        fn validate_request(
            &self,
            _message: &MessageInfo<'_>,
            client_subject: &mut Subject,
            _service_subject: Option<&Subject>,
        ) -> Result<ValidationResponse, MsgAuthError> {
            self.handler
                .handle(&mut [msg_auth_sdk::Callback::caller("bob")])?;
            client_subject.add_principal("bob");
            Ok(ValidationResponse::success())
        }
    }

    fn service(
        config: MsgAuthConfig,
        provider: Option<Provider>,
    ) -> (Service, Arc<CountingFallback>) {
        let factory = Arc::new(DefaultAuthConfigFactory::new());
        if let Some(provider) = provider {
            factory.register_config_provider(
                Arc::new(provider),
                Some(SERVLET_MESSAGE_LAYER),
                Some(&config.application_context),
                "test",
            );
        }
        let fallback = Arc::new(CountingFallback::default());
        let svc = Service::new(
            config,
            Arc::new(StaticRegistry::new(factory)),
            Arc::new(OpenDomain),
            fallback.clone(),
        )
        .unwrap();
        (svc, fallback)
    }

    fn exchange() -> InMemoryExchange {
        let (parts, ()) = http::Request::builder()
            .uri("/app")
            .body(())
            .unwrap()
            .into_parts();
        InMemoryExchange::new(InMemorySessionStore::new_shared(), parts)
    }

    #[test]
    fn already_authenticated_short_circuits() {
        let (svc, fallback) = service(MsgAuthConfig::default(), Some(Provider { fail: true }));
        let mut ex = exchange();
        let mut ctx = Context {
            authenticated: true,
            ..Context::default()
        };

        assert!(svc.authenticate(&mut ex, &mut ctx).unwrap());
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
        assert!(ctx.completed.is_none());
        assert_eq!(ex.status(), StatusCode::OK);
    }

    #[test]
    fn disabled_ignores_registered_provider() {
        let config = MsgAuthConfig {
            enabled: false,
            ..MsgAuthConfig::default()
        };
        let (svc, fallback) = service(config, Some(Provider { fail: false }));
        let mut ctx = Context::default();

        assert!(svc.authenticate(&mut exchange(), &mut ctx).unwrap());
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
        assert!(ctx.completed.is_none());
    }

    #[test]
    #[traced_test]
    fn missing_provider_uses_fallback() {
        let (svc, fallback) = service(MsgAuthConfig::default(), None);

        assert!(svc.authenticate(&mut exchange(), &mut Context::default()).unwrap());
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
        assert!(logs_contain("using base HTTP authentication"));
    }

    #[test]
    #[traced_test]
    fn provider_error_sets_500() {
        let (svc, fallback) = service(MsgAuthConfig::default(), Some(Provider { fail: true }));
        let mut ex = exchange();
        let mut ctx = Context::default();

        assert!(!svc.authenticate(&mut ex, &mut ctx).unwrap());
        assert_eq!(ex.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
        assert!(ctx.completed.is_none());
        assert!(logs_contain("provider misconfigured"));
    }

    #[test]
    fn provider_success_completes_with_mechanism() {
        let (svc, fallback) = service(MsgAuthConfig::default(), Some(Provider { fail: false }));
        let mut ex = exchange();
        let mut ctx = Context::default();

        assert!(svc.authenticate(&mut ex, &mut ctx).unwrap());
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);

        let (identity, auth_type) = ctx.completed.unwrap();
        assert_eq!(identity.principal(), Some("bob"));
        assert_eq!(auth_type.as_str(), "JASPIC");
        // No registerSession, so no session was created.
        assert!(ex.session_id().is_none());
    }

    #[test]
    fn debug_shows_config_and_mechanism() {
        let (svc, _) = service(MsgAuthConfig::default(), None);
        let rendered = format!("{svc:?}");

        assert!(rendered.starts_with("Service {"));
        assert!(rendered.contains("JASPIC"));
        assert!(rendered.ends_with(".. }"));
    }
}
