//! Configuration for the static message authentication plugin.

use serde::Deserialize;
use web_security::constants::SERVLET_MESSAGE_LAYER;

/// Principal returned in `accept_all` mode unless configured otherwise.
pub const DEFAULT_PRINCIPAL: &str = "developer";

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticMsgAuthPluginConfig {
    /// Authentication mode.
    pub mode: MsgAuthMode,

    /// Default identity returned in `accept_all` mode.
    pub default_identity: IdentityConfig,

    /// Static token-to-identity mappings for `static_tokens` mode.
    pub tokens: Vec<TokenMapping>,

    /// `authType` reported on success. `None` leaves the server's mechanism name.
    pub auth_type: Option<String>,

    /// Ask the server to cache the identity in the HTTP session.
    pub register_session: bool,

    /// Answer `SEND_SUCCESS` instead of `SUCCESS` for a known token.
    pub send_success: bool,

    /// Message layer to register for. `None` registers for every layer.
    pub layer: Option<String>,

    /// Application context to register for. `None` registers for every context.
    pub application_context: Option<String>,
}

impl Default for StaticMsgAuthPluginConfig {
    fn default() -> Self {
        Self {
            mode: MsgAuthMode::AcceptAll,
            default_identity: IdentityConfig::default(),
            tokens: Vec::new(),
            auth_type: None,
            register_session: false,
            send_success: false,
            layer: Some(SERVLET_MESSAGE_LAYER.to_owned()),
            application_context: None,
        }
    }
}

/// Authentication mode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MsgAuthMode {
    /// Accept any non-empty token and return the default identity.
    #[default]
    AcceptAll,
    /// Map specific tokens to specific identities.
    StaticTokens,
}

/// Identity handed back to the server through callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityConfig {
    /// Caller principal name.
    pub principal: String,

    /// Group memberships.
    pub groups: Vec<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            principal: DEFAULT_PRINCIPAL.to_owned(),
            groups: Vec::new(),
        }
    }
}

/// Maps a static token to a specific identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenMapping {
    /// The bearer token value to match.
    pub token: String,
    /// The identity to return when this token is presented.
    pub identity: IdentityConfig,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_register_for_servlet_layer() {
        let cfg: StaticMsgAuthPluginConfig = serde_json::from_value(json!({})).unwrap();

        assert_eq!(cfg.mode, MsgAuthMode::AcceptAll);
        assert_eq!(cfg.default_identity.principal, DEFAULT_PRINCIPAL);
        assert_eq!(cfg.layer.as_deref(), Some("HttpServlet"));
        assert!(cfg.application_context.is_none());
        assert!(!cfg.register_session);
    }

    #[test]
    fn static_tokens_parse() {
        let cfg: StaticMsgAuthPluginConfig = serde_json::from_value(json!({
            "mode": "static_tokens",
            "auth_type": "BEARER",
            "register_session": true,
            "layer": null,
            "tokens": [
                { "token": "t-alice", "identity": { "principal": "alice", "groups": ["admins"] } }
            ]
        }))
        .unwrap();

        assert_eq!(cfg.mode, MsgAuthMode::StaticTokens);
        assert_eq!(cfg.auth_type.as_deref(), Some("BEARER"));
        assert!(cfg.layer.is_none());
        assert_eq!(cfg.tokens[0].identity.groups, vec!["admins".to_owned()]);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let res: Result<StaticMsgAuthPluginConfig, _> =
            serde_json::from_value(json!({ "mode": "everything" }));
        assert!(res.is_err());
    }
}
