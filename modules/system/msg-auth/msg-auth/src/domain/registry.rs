//! Provider registry lookup.
//!
//! The registry is optional infrastructure. Not having one, or having one that
//! knows nothing about the requested layer and application context, is the
//! normal unconfigured case and never an error.

use std::sync::Arc;

use msg_auth_sdk::{AuthConfigFactory, AuthConfigProvider, RegistryAccess, RegistryError};
use parking_lot::RwLock;
use tracing::trace;

static PROCESS_FACTORY: RwLock<Option<Arc<dyn AuthConfigFactory>>> =
    parking_lot::const_rwlock(None);

/// Install the process-wide factory, returning the one it replaces.
pub fn install_process_factory(
    factory: Arc<dyn AuthConfigFactory>,
) -> Option<Arc<dyn AuthConfigFactory>> {
    PROCESS_FACTORY.write().replace(factory)
}

/// Remove the process-wide factory, returning it.
pub fn clear_process_factory() -> Option<Arc<dyn AuthConfigFactory>> {
    PROCESS_FACTORY.write().take()
}

/// [`RegistryAccess`] backed by the process-wide factory slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRegistry;

impl RegistryAccess for ProcessRegistry {
    fn factory(&self) -> Result<Option<Arc<dyn AuthConfigFactory>>, RegistryError> {
        Ok(PROCESS_FACTORY.read().clone())
    }
}

/// [`RegistryAccess`] over an explicitly supplied factory, or none.
#[derive(Clone, Default)]
pub struct StaticRegistry {
    factory: Option<Arc<dyn AuthConfigFactory>>,
}

impl StaticRegistry {
    #[must_use]
    pub fn new(factory: Arc<dyn AuthConfigFactory>) -> Self {
        Self {
            factory: Some(factory),
        }
    }

    /// A registry with no factory installed.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

impl RegistryAccess for StaticRegistry {
    fn factory(&self) -> Result<Option<Arc<dyn AuthConfigFactory>>, RegistryError> {
        Ok(self.factory.clone())
    }
}

/// Resolves the provider for a (message layer, application context) pair.
#[derive(Clone)]
pub struct ProviderRegistryLookup {
    registry: Arc<dyn RegistryAccess>,
}

impl ProviderRegistryLookup {
    #[must_use]
    pub fn new(registry: Arc<dyn RegistryAccess>) -> Self {
        Self { registry }
    }

    /// Find the provider for `(layer, app_context)`.
    ///
    /// Every failure mode collapses to `None`; this runs on each request and
    /// must not fail it.
    #[must_use]
    pub fn lookup(&self, layer: &str, app_context: &str) -> Option<Arc<dyn AuthConfigProvider>> {
        let factory = match self.registry.factory() {
            Ok(Some(factory)) => factory,
            Ok(None) => {
                trace!("No AuthConfigFactory available");
                return None;
            }
            Err(e) => {
                // Runs on every request, so trace only.
                trace!(error = %e, "Unable to get AuthConfigFactory");
                return None;
            }
        };

        let provider = factory.config_provider(layer, app_context);
        if provider.is_none() {
            trace!(layer, app_context, "No AuthConfigProvider for layer and appContext");
        }
        provider
    }
}
