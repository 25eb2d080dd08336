//! Static message authentication plugin module.

use std::sync::{Arc, OnceLock};

use msg_auth_sdk::AuthConfigFactory;
use tracing::{info, warn};

use crate::config::{MsgAuthMode, StaticMsgAuthPluginConfig};
use crate::domain::{Service, StaticAuthConfigProvider};

const DESCRIPTION: &str = "Static token-to-identity provider";

/// Static message authentication plugin module.
///
/// Provides token-to-identity mapping from configuration and registers it
/// with an `AuthConfigFactory` under the configured layer and application
/// context.
#[derive(Default)]
pub struct StaticMsgAuthPlugin {
    service: OnceLock<Arc<Service>>,
    registration_id: OnceLock<String>,
}

impl StaticMsgAuthPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration and register the provider with `factory`.
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration or when called a second time.
    pub fn init(
        &self,
        config: serde_json::Value,
        factory: &dyn AuthConfigFactory,
    ) -> anyhow::Result<String> {
        info!("Initializing static_msg_auth_plugin");

        let cfg: StaticMsgAuthPluginConfig = serde_json::from_value(config)?;
        validate(&cfg)?;
        let service = Arc::new(Service::from_config(&cfg));
        self.service
            .set(service.clone())
            .map_err(|_| anyhow::anyhow!("Service already initialized"))?;

        let id = register(service, factory, &cfg);
        self.registration_id
            .set(id.clone())
            .map_err(|_| anyhow::anyhow!("Provider already registered"))?;
        Ok(id)
    }

    /// Registration id returned by the factory, once `init` has run.
    #[must_use]
    pub fn registration_id(&self) -> Option<&str> {
        self.registration_id.get().map(String::as_str)
    }
}

/// Register a provider built from `cfg` with `factory`, returning the registration id.
///
/// # Errors
///
/// Returns an error if the plugin configuration is invalid.
pub fn install(
    factory: &dyn AuthConfigFactory,
    cfg: &StaticMsgAuthPluginConfig,
) -> anyhow::Result<String> {
    validate(cfg)?;
    Ok(register(Arc::new(Service::from_config(cfg)), factory, cfg))
}

fn validate(cfg: &StaticMsgAuthPluginConfig) -> anyhow::Result<()> {
    if cfg.auth_type.as_deref().is_some_and(|t| t.trim().is_empty()) {
        anyhow::bail!("auth_type must not be empty");
    }
    Ok(())
}

fn register(
    service: Arc<Service>,
    factory: &dyn AuthConfigFactory,
    cfg: &StaticMsgAuthPluginConfig,
) -> String {
    if cfg.mode == MsgAuthMode::AcceptAll {
        warn!(
            "Static msg_auth plugin is running in `accept_all` mode: \
             every bearer token is accepted with the default identity. \
             Do NOT use this mode in production."
        );
    }

    info!(
        mode = ?cfg.mode,
        token_count = cfg.tokens.len(),
        layer = cfg.layer.as_deref().unwrap_or("*"),
        app_context = cfg.application_context.as_deref().unwrap_or("*"),
        "Loaded plugin configuration"
    );

    let id = factory.register_config_provider(
        Arc::new(StaticAuthConfigProvider::new(service)),
        cfg.layer.as_deref(),
        cfg.application_context.as_deref(),
        DESCRIPTION,
    );
    info!(registration_id = %id, "Static msg_auth plugin registered");
    id
}
