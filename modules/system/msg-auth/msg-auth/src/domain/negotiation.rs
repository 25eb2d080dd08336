//! One negotiation cycle with a provider.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use secrecy::ExposeSecret;
use tracing::trace;
use web_security::SecurityIdentity;

use msg_auth_sdk::{
    AuthConfigProvider, Callback, CallbackHandler, MessageInfo, MsgAuthError, SecurityDomain,
    Subject, ValidationResponse,
};

#[derive(Debug, Default)]
struct CallerState {
    /// Caller established through `CallerPrincipal`.
    caller: Option<SecurityIdentity>,
    /// Name accepted through `PasswordValidation`.
    validated_name: Option<String>,
    groups: Vec<String>,
}

/// Per-negotiation bridge between a provider's callbacks and the security domain.
///
/// Created fresh for each negotiation and handed to the provider as its
/// [`CallbackHandler`]. After validation, [`NegotiationSession::authorized_identity`]
/// yields the identity the callbacks established.
pub struct NegotiationSession {
    domain: Arc<dyn SecurityDomain>,
    message_layer: String,
    integrated: bool,
    state: Mutex<CallerState>,
}

impl NegotiationSession {
    #[must_use]
    pub fn new(domain: Arc<dyn SecurityDomain>, message_layer: &str, integrated: bool) -> Self {
        Self {
            domain,
            message_layer: message_layer.to_owned(),
            integrated,
            state: Mutex::new(CallerState::default()),
        }
    }

    #[must_use]
    pub fn message_layer(&self) -> &str {
        &self.message_layer
    }

    /// Resolve `name` to an identity.
    ///
    /// Integrated sessions require the domain to know the name; otherwise an
    /// identity is built from the name alone.
    fn resolve(&self, name: &str) -> Result<SecurityIdentity, MsgAuthError> {
        if self.integrated {
            self.domain.identity_for(name).ok_or_else(|| {
                MsgAuthError::Security(format!("principal '{name}' is not known to the domain"))
            })
        } else {
            Ok(SecurityIdentity::builder().principal(name).build())
        }
    }

    /// The identity established by the callbacks handled so far.
    ///
    /// Anonymous when no caller was established. Group callbacks are applied
    /// as roles.
    #[must_use]
    pub fn authorized_identity(&self) -> SecurityIdentity {
        let state = self.state.lock();

        let base = if let Some(caller) = &state.caller {
            caller.clone()
        } else if let Some(name) = &state.validated_name {
            self.domain
                .identity_for(name)
                .unwrap_or_else(|| SecurityIdentity::builder().principal(name).build())
        } else {
            SecurityIdentity::anonymous()
        };

        if state.groups.is_empty() {
            base
        } else {
            base.with_roles(state.groups.iter().cloned())
        }
    }
}

impl CallbackHandler for NegotiationSession {
    fn handle(&self, callbacks: &mut [Callback]) -> Result<(), MsgAuthError> {
        for callback in callbacks.iter_mut() {
            match callback {
                Callback::CallerPrincipal { name: Some(name) } => {
                    let identity = self.resolve(name)?;
                    trace!(principal = %name, "Caller principal established");
                    self.state.lock().caller = Some(identity);
                }
                Callback::CallerPrincipal { name: None } => {
                    trace!("Anonymous caller established");
                    let mut state = self.state.lock();
                    state.caller = Some(SecurityIdentity::anonymous());
                    state.validated_name = None;
                }
                Callback::GroupPrincipal { groups } => {
                    self.state.lock().groups.extend(groups.iter().cloned());
                }
                Callback::PasswordValidation {
                    username,
                    password,
                    result,
                } => {
                    *result = self
                        .domain
                        .verify_password(username, password.expose_secret());
                    trace!(username = %username, verified = *result, "Password validation");
                    if *result {
                        self.state.lock().validated_name = Some(username.clone());
                    }
                }
            }
        }
        Ok(())
    }
}

/// Outcome of driving a provider through one negotiation.
pub enum Negotiated {
    /// The provider returned no auth context for this request.
    Declined,
    /// Validation ran.
    Validated {
        response: ValidationResponse,
        session: Arc<NegotiationSession>,
    },
}

/// Parameters of a negotiation that do not change between requests.
pub struct Negotiation<'a> {
    pub message_layer: &'a str,
    pub application_context: &'a str,
    pub integrated: bool,
    pub domain: &'a Arc<dyn SecurityDomain>,
}

impl Negotiation<'_> {
    /// Run configuration, context acquisition and request validation.
    ///
    /// # Errors
    ///
    /// Returns whatever `MsgAuthError` the provider raises at any stage.
    #[tracing::instrument(
        skip_all,
        fields(layer = %self.message_layer, app_context = %self.application_context)
    )]
    pub fn run(
        &self,
        provider: &dyn AuthConfigProvider,
        request: &http::request::Parts,
        mandatory: bool,
    ) -> Result<Negotiated, MsgAuthError> {
        let session = Arc::new(NegotiationSession::new(
            Arc::clone(self.domain),
            self.message_layer,
            self.integrated,
        ));

        let handler: Arc<dyn CallbackHandler> = session.clone();
        let config =
            provider.server_auth_config(self.message_layer, self.application_context, handler)?;

        // From here on everything is per request.
        let message = MessageInfo::new(request).mandatory(mandatory);

        let context_id = config.auth_context_id(&message)?;
        let Some(context) = config.auth_context(&context_id, None, &BTreeMap::new())? else {
            trace!(
                context_id = %context_id,
                "No ServerAuthContext returned, negotiation can not proceed"
            );
            return Ok(Negotiated::Declined);
        };

        let mut client_subject = Subject::new();
        let response = context.validate_request(&message, &mut client_subject, None)?;
        trace!(
            context_id = %context_id,
            status = %response.status(),
            principals = client_subject.principals().len(),
            "ServerAuthContext validated request"
        );

        Ok(Negotiated::Validated { response, session })
    }
}
