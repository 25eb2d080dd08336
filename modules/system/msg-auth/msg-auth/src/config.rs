//! Configuration for message authentication.

use serde::Deserialize;
use web_security::AuthType;
use web_security::constants::DEFAULT_MECHANISM_NAME;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid msg_auth configuration: {0}")]
    Invalid(#[from] serde_json::Error),

    #[error("mechanism_name must not be empty")]
    EmptyMechanismName,
}

/// Configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MsgAuthConfig {
    /// Consult external providers at all. When `false` every request goes
    /// straight to the base mechanism.
    pub enabled: bool,

    /// Resolve provider-supplied callers through the security domain. When
    /// `false` the negotiation session builds identities from the names the
    /// provider hands back.
    pub integrated: bool,

    /// Application context used to look up the provider.
    pub application_context: String,

    /// Label used as `AuthType` when the provider does not supply one.
    pub mechanism_name: String,
}

impl Default for MsgAuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            integrated: true,
            application_context: "default-host /".to_owned(),
            mechanism_name: DEFAULT_MECHANISM_NAME.to_owned(),
        }
    }
}

impl MsgAuthConfig {
    /// Build from a module config section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for unknown fields or wrong types and
    /// `ConfigError::EmptyMechanismName` for a blank mechanism name.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_value(value)?;
        cfg.mechanism()?;
        Ok(cfg)
    }

    /// The fallback `AuthType`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptyMechanismName` if `mechanism_name` is blank.
    pub fn mechanism(&self) -> Result<AuthType, ConfigError> {
        AuthType::new(self.mechanism_name.as_str()).map_err(|_| ConfigError::EmptyMechanismName)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_section_uses_defaults() {
        let cfg = MsgAuthConfig::from_value(json!({})).unwrap();

        assert!(cfg.enabled);
        assert!(cfg.integrated);
        assert_eq!(cfg.application_context, "default-host /");
        assert_eq!(cfg.mechanism().unwrap().as_str(), "JASPIC");
    }

    #[test]
    fn explicit_values_are_kept() {
        let cfg = MsgAuthConfig::from_value(json!({
            "enabled": false,
            "integrated": false,
            "application_context": "default-host /shop",
            "mechanism_name": "BEARER"
        }))
        .unwrap();

        assert!(!cfg.enabled);
        assert!(!cfg.integrated);
        assert_eq!(cfg.application_context, "default-host /shop");
        assert_eq!(cfg.mechanism().unwrap().as_str(), "BEARER");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = MsgAuthConfig::from_value(json!({ "vendor": "x" })).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn blank_mechanism_name_is_rejected() {
        let err = MsgAuthConfig::from_value(json!({ "mechanism_name": " " })).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyMechanismName));
    }
}
