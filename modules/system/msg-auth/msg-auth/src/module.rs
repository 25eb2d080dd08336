//! Message authentication module.

use std::sync::{Arc, OnceLock};

use msg_auth_sdk::{FallbackAuthenticator, RegistryAccess, SecurityDomain};
use tracing::info;

use crate::config::MsgAuthConfig;
use crate::domain::{ProcessRegistry, Service};

/// Collaborators the hosting server supplies at init.
#[derive(Clone)]
pub struct ModuleDeps {
    pub registry: Arc<dyn RegistryAccess>,
    pub domain: Arc<dyn SecurityDomain>,
    pub fallback: Arc<dyn FallbackAuthenticator>,
}

impl ModuleDeps {
    /// Dependencies reading providers from the process-wide factory.
    #[must_use]
    pub fn with_process_registry(
        domain: Arc<dyn SecurityDomain>,
        fallback: Arc<dyn FallbackAuthenticator>,
    ) -> Self {
        Self {
            registry: Arc::new(ProcessRegistry),
            domain,
            fallback,
        }
    }
}

/// Message authentication module.
///
/// This module:
/// 1. Loads its configuration section
/// 2. Wires the provider registry, security domain and base mechanism
/// 3. Exposes the [`Service`] the server calls once per request
///
/// Provider discovery is lazy: the registry is consulted on every request, so
/// providers registered after init are picked up.
#[derive(Default)]
pub struct MsgAuthModule {
    service: OnceLock<Arc<Service>>,
}

impl MsgAuthModule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize from the module's config section.
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration or when called a second time.
    #[tracing::instrument(skip_all, fields(app_context))]
    pub fn init(
        &self,
        config: serde_json::Value,
        deps: ModuleDeps,
    ) -> anyhow::Result<Arc<Service>> {
        let cfg = MsgAuthConfig::from_value(config)?;
        tracing::Span::current().record("app_context", cfg.application_context.as_str());
        info!(
            enabled = cfg.enabled,
            integrated = cfg.integrated,
            mechanism = %cfg.mechanism_name,
            "Initializing msg_auth"
        );

        let svc = Arc::new(Service::new(cfg, deps.registry, deps.domain, deps.fallback)?);
        self.service
            .set(svc.clone())
            .map_err(|_| anyhow::anyhow!("Service already initialized"))?;

        Ok(svc)
    }

    /// The initialized service, if `init` has run.
    #[must_use]
    pub fn service(&self) -> Option<Arc<Service>> {
        self.service.get().cloned()
    }
}
