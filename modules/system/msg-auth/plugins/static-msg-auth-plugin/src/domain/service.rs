//! Service implementation for the static message authentication plugin.

use std::collections::HashMap;

use http::header::AUTHORIZATION;
use msg_auth_sdk::{
    Callback, CallbackHandler, MessageInfo, MsgAuthError, Subject, ValidationResponse,
};
use tracing::trace;

use crate::config::{IdentityConfig, MsgAuthMode, StaticMsgAuthPluginConfig};

/// Static message authentication service.
///
/// Provides token-to-identity mapping based on configuration mode:
/// - `accept_all`: Any non-empty token maps to the default identity
/// - `static_tokens`: Specific tokens map to specific identities
pub struct Service {
    mode: MsgAuthMode,
    default_identity: IdentityConfig,
    token_map: HashMap<String, IdentityConfig>,
    auth_type: Option<String>,
    register_session: bool,
    send_success: bool,
}

impl Service {
    /// Create a service from plugin configuration.
    #[must_use]
    pub fn from_config(cfg: &StaticMsgAuthPluginConfig) -> Self {
        let token_map: HashMap<String, IdentityConfig> = cfg
            .tokens
            .iter()
            .map(|m| (m.token.clone(), m.identity.clone()))
            .collect();

        Self {
            mode: cfg.mode.clone(),
            default_identity: cfg.default_identity.clone(),
            token_map,
            auth_type: cfg.auth_type.clone(),
            register_session: cfg.register_session,
            send_success: cfg.send_success,
        }
    }

    /// Look up the identity for a bearer token.
    ///
    /// Returns `None` if the token is not recognized (in `static_tokens` mode)
    /// or empty.
    #[must_use]
    pub fn authenticate(&self, bearer_token: &str) -> Option<&IdentityConfig> {
        if bearer_token.is_empty() {
            return None;
        }

        match &self.mode {
            MsgAuthMode::AcceptAll => Some(&self.default_identity),
            MsgAuthMode::StaticTokens => self.token_map.get(bearer_token),
        }
    }

    /// Validate one request, reporting the caller through `handler` and
    /// adding its principal to `client_subject`.
    ///
    /// # Errors
    ///
    /// Returns whatever `MsgAuthError` the handler raises.
    pub fn validate(
        &self,
        message: &MessageInfo<'_>,
        client_subject: &mut Subject,
        handler: &dyn CallbackHandler,
    ) -> Result<ValidationResponse, MsgAuthError> {
        let Some(token) = extract_bearer_token(message.request()) else {
            if message.is_mandatory() {
                trace!("No bearer token on a protected request");
                return Ok(ValidationResponse::send_failure());
            }
            handler.handle(&mut [Callback::anonymous_caller()])?;
            return Ok(ValidationResponse::success());
        };

        let Some(identity) = self.authenticate(token) else {
            trace!("Bearer token not recognized");
            return Ok(ValidationResponse::send_failure());
        };

        let mut callbacks = vec![Callback::caller(&identity.principal)];
        if !identity.groups.is_empty() {
            callbacks.push(Callback::groups(identity.groups.iter().cloned()));
        }
        handler.handle(&mut callbacks)?;
        client_subject.add_principal(identity.principal.as_str());
        trace!(principal = %identity.principal, "Bearer token accepted");

        Ok(self.accepted())
    }

    fn accepted(&self) -> ValidationResponse {
        let response = if self.send_success {
            ValidationResponse::send_success()
        } else {
            ValidationResponse::success()
        };
        let response = response.register_session(self.register_session);
        match &self.auth_type {
            Some(auth_type) => response.auth_type(auth_type),
            None => response,
        }
    }
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(request: &http::request::Parts) -> Option<&str> {
    request
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").map(str::trim))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Mutex;

    use msg_auth_sdk::{AuthStatus, options};

    use super::*;
    use crate::config::TokenMapping;

    /// Handler that records the callbacks it was given.
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    impl CallbackHandler for Recorder {
        fn handle(&self, callbacks: &mut [Callback]) -> Result<(), MsgAuthError> {
            let mut seen = self.seen.lock().unwrap();
            for cb in callbacks.iter() {
                seen.push(match cb {
                    Callback::CallerPrincipal { name: Some(n) } => format!("caller:{n}"),
                    Callback::CallerPrincipal { name: None } => "caller:-".to_owned(),
                    Callback::GroupPrincipal { groups } => format!("groups:{}", groups.join(",")),
                    Callback::PasswordValidation { .. } => "password".to_owned(),
                });
            }
            Ok(())
        }
    }

    fn default_config() -> StaticMsgAuthPluginConfig {
        StaticMsgAuthPluginConfig::default()
    }

    fn static_config() -> StaticMsgAuthPluginConfig {
        StaticMsgAuthPluginConfig {
            mode: MsgAuthMode::StaticTokens,
            tokens: vec![TokenMapping {
                token: "token-alice".to_owned(),
                identity: IdentityConfig {
                    principal: "alice".to_owned(),
                    groups: vec!["admins".to_owned(), "users".to_owned()],
                },
            }],
            ..default_config()
        }
    }

    fn request(authorization: Option<&str>) -> http::request::Parts {
        let mut builder = http::Request::builder().uri("/orders");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn accept_all_mode_returns_default_identity() {
        let service = Service::from_config(&default_config());

        let identity = service.authenticate("any-token-value").unwrap();
        assert_eq!(identity.principal, "developer");
    }

    #[test]
    fn empty_token_is_rejected_in_both_modes() {
        assert!(Service::from_config(&default_config()).authenticate("").is_none());
        assert!(Service::from_config(&static_config()).authenticate("").is_none());
    }

    #[test]
    fn static_tokens_mode_rejects_unknown_token() {
        let service = Service::from_config(&static_config());
        assert!(service.authenticate("unknown-token").is_none());
        assert_eq!(service.authenticate("token-alice").unwrap().principal, "alice");
    }

    #[test]
    fn known_token_reports_caller_and_groups() {
        let service = Service::from_config(&static_config());
        let handler = Recorder::default();
        let parts = request(Some("Bearer token-alice"));

        let mut subject = Subject::new();
        let response = service
            .validate(&MessageInfo::new(&parts).mandatory(true), &mut subject, &handler)
            .unwrap();

        assert_eq!(response.status(), AuthStatus::Success);
        assert_eq!(response.option(options::REGISTER_SESSION), Some("false"));
        assert!(response.option(options::AUTH_TYPE).is_none());
        assert_eq!(
            *handler.seen.lock().unwrap(),
            vec!["caller:alice".to_owned(), "groups:admins,users".to_owned()]
        );
        assert_eq!(subject.principals(), ["alice".to_owned()]);
    }

    #[test]
    fn configured_options_are_reported() {
        let cfg = StaticMsgAuthPluginConfig {
            auth_type: Some("BEARER".to_owned()),
            register_session: true,
            send_success: true,
            ..default_config()
        };
        let service = Service::from_config(&cfg);
        let parts = request(Some("Bearer abc"));

        let mut subject = Subject::new();
        let response = service
            .validate(&MessageInfo::new(&parts), &mut subject, &Recorder::default())
            .unwrap();

        assert_eq!(response.status(), AuthStatus::SendSuccess);
        assert_eq!(response.option(options::REGISTER_SESSION), Some("true"));
        assert_eq!(response.option(options::AUTH_TYPE), Some("BEARER"));
    }

    #[test]
    fn missing_token_on_mandatory_request_fails() {
        let service = Service::from_config(&default_config());
        let handler = Recorder::default();
        let parts = request(None);

        let mut subject = Subject::new();
        let response = service
            .validate(&MessageInfo::new(&parts).mandatory(true), &mut subject, &handler)
            .unwrap();

        assert_eq!(response.status(), AuthStatus::SendFailure);
        assert!(handler.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn missing_token_on_optional_request_is_anonymous() {
        let service = Service::from_config(&default_config());
        let handler = Recorder::default();
        let parts = request(Some("Basic dXNlcjpwdw=="));

        let mut subject = Subject::new();
        let response = service
            .validate(&MessageInfo::new(&parts), &mut subject, &handler)
            .unwrap();

        assert_eq!(response.status(), AuthStatus::Success);
        assert_eq!(*handler.seen.lock().unwrap(), vec!["caller:-".to_owned()]);
    }

    #[test]
    fn unknown_token_fails_without_callbacks() {
        let service = Service::from_config(&static_config());
        let handler = Recorder::default();
        let parts = request(Some("Bearer token-mallory"));

        let mut subject = Subject::new();
        let response = service
            .validate(&MessageInfo::new(&parts), &mut subject, &handler)
            .unwrap();

        assert_eq!(response.status(), AuthStatus::SendFailure);
        assert!(handler.seen.lock().unwrap().is_empty());
        assert!(subject.is_empty());
    }
}
