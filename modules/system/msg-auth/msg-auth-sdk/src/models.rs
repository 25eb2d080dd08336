//! Negotiation messages exchanged between the engine and a provider.

use std::collections::BTreeMap;
use std::fmt;

/// Well-known option keys.
pub mod options {
    /// Input option: present with `"true"` when anonymous completion is unacceptable.
    pub const MANDATORY: &str = "javax.security.auth.message.MessagePolicy.isMandatory";

    /// Output option: the provider asks for the identity to be cached in the session.
    pub const REGISTER_SESSION: &str = "javax.servlet.http.registerSession";

    /// Output option: label of the mechanism that authenticated the caller.
    pub const AUTH_TYPE: &str = "javax.servlet.http.authType";
}

/// Status returned by [`crate::ServerAuthContext::validate_request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthStatus {
    /// The request was validated and the caller is established.
    Success,
    /// The provider produced a response to send; processing of the request stops.
    SendSuccess,
    /// Validation failed; a failure response should be sent.
    SendFailure,
    /// Validation needs another round trip (challenge/response).
    SendContinue,
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "SUCCESS",
            Self::SendSuccess => "SEND_SUCCESS",
            Self::SendFailure => "SEND_FAILURE",
            Self::SendContinue => "SEND_CONTINUE",
        })
    }
}

/// Per-request negotiation input.
///
/// Built fresh by the engine for every request and handed to the provider by
/// shared reference; providers report back through [`ValidationResponse`].
#[derive(Debug, Clone)]
pub struct MessageInfo<'a> {
    request: &'a http::request::Parts,
    options: BTreeMap<String, String>,
}

impl<'a> MessageInfo<'a> {
    #[must_use]
    pub fn new(request: &'a http::request::Parts) -> Self {
        Self {
            request,
            options: BTreeMap::new(),
        }
    }

    /// Set the mandatory flag. Only `true` writes the option; `false` leaves it absent.
    #[must_use]
    pub fn mandatory(self, mandatory: bool) -> Self {
        if mandatory {
            self.with_option(options::MANDATORY, "true")
        } else {
            self
        }
    }

    #[must_use]
    pub fn with_option(mut self, key: &str, value: &str) -> Self {
        self.options.insert(key.to_owned(), value.to_owned());
        self
    }

    /// The inbound request message.
    #[must_use]
    pub fn request(&self) -> &http::request::Parts {
        self.request
    }

    #[must_use]
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }

    /// Whether anonymous completion is unacceptable for this request.
    #[must_use]
    pub fn is_mandatory(&self) -> bool {
        self.option(options::MANDATORY)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}

/// Result of a validation call: the status plus the provider's output options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResponse {
    status: AuthStatus,
    options: BTreeMap<String, String>,
}

impl ValidationResponse {
    #[must_use]
    pub fn new(status: AuthStatus) -> Self {
        Self {
            status,
            options: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn success() -> Self {
        Self::new(AuthStatus::Success)
    }

    #[must_use]
    pub fn send_success() -> Self {
        Self::new(AuthStatus::SendSuccess)
    }

    #[must_use]
    pub fn send_failure() -> Self {
        Self::new(AuthStatus::SendFailure)
    }

    #[must_use]
    pub fn send_continue() -> Self {
        Self::new(AuthStatus::SendContinue)
    }

    /// Write the `registerSession` output option.
    #[must_use]
    pub fn register_session(self, register: bool) -> Self {
        let value = if register { "true" } else { "false" };
        self.with_option(options::REGISTER_SESSION, value)
    }

    /// Write the `authType` output option.
    #[must_use]
    pub fn auth_type(self, auth_type: &str) -> Self {
        self.with_option(options::AUTH_TYPE, auth_type)
    }

    #[must_use]
    pub fn with_option(mut self, key: &str, value: &str) -> Self {
        self.options.insert(key.to_owned(), value.to_owned());
        self
    }

    #[must_use]
    pub fn status(&self) -> AuthStatus {
        self.status
    }

    #[must_use]
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }
}

/// Container for the principals a provider attaches to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subject {
    principals: Vec<String>,
}

impl Subject {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_principal(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.principals.contains(&name) {
            self.principals.push(name);
        }
    }

    #[must_use]
    pub fn principals(&self) -> &[String] {
        &self.principals
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.principals.is_empty()
    }
}
