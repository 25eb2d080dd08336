//! Default provider factory.

use std::collections::HashMap;
use std::sync::Arc;

use msg_auth_sdk::{AuthConfigFactory, AuthConfigProvider};
use parking_lot::RwLock;
use tracing::{debug, info};

const WILDCARD: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RegistrationKey {
    layer: Option<String>,
    app_context: Option<String>,
}

impl RegistrationKey {
    fn new(layer: Option<&str>, app_context: Option<&str>) -> Self {
        Self {
            layer: layer.map(str::to_owned),
            app_context: app_context.map(str::to_owned),
        }
    }

    /// Stable id for this key. Literal values are escaped so that a
    /// registered `"*"` never renders like an absent component.
    fn registration_id(&self) -> String {
        format!(
            "{}<>{}",
            id_component(self.layer.as_deref()),
            id_component(self.app_context.as_deref())
        )
    }
}

fn id_component(value: Option<&str>) -> String {
    let Some(value) = value else {
        return WILDCARD.to_owned();
    };
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '*' | '<') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

struct Registration {
    id: String,
    description: String,
    provider: Arc<dyn AuthConfigProvider>,
}

/// Factory holding provider registrations keyed by optional layer and
/// optional application context.
///
/// Lookup tries the most specific registration first:
/// `(layer, app)`, `(*, app)`, `(layer, *)`, `(*, *)`.
#[derive(Default)]
pub struct DefaultAuthConfigFactory {
    registrations: RwLock<HashMap<RegistrationKey, Registration>>,
}

impl DefaultAuthConfigFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Description given when `registration_id` was registered.
    #[must_use]
    pub fn description(&self, registration_id: &str) -> Option<String> {
        self.registrations
            .read()
            .values()
            .find(|r| r.id == registration_id)
            .map(|r| r.description.clone())
    }
}

impl AuthConfigFactory for DefaultAuthConfigFactory {
    fn config_provider(
        &self,
        layer: &str,
        app_context: &str,
    ) -> Option<Arc<dyn AuthConfigProvider>> {
        let candidates = [
            RegistrationKey::new(Some(layer), Some(app_context)),
            RegistrationKey::new(None, Some(app_context)),
            RegistrationKey::new(Some(layer), None),
            RegistrationKey::new(None, None),
        ];

        let registrations = self.registrations.read();
        candidates.iter().find_map(|key| {
            registrations.get(key).map(|r| {
                debug!(
                    registration_id = %r.id,
                    layer,
                    app_context,
                    "Matched provider registration"
                );
                Arc::clone(&r.provider)
            })
        })
    }

    fn register_config_provider(
        &self,
        provider: Arc<dyn AuthConfigProvider>,
        layer: Option<&str>,
        app_context: Option<&str>,
        description: &str,
    ) -> String {
        let key = RegistrationKey::new(layer, app_context);
        let id = key.registration_id();
        let replaced = self
            .registrations
            .write()
            .insert(
                key,
                Registration {
                    id: id.clone(),
                    description: description.to_owned(),
                    provider,
                },
            )
            .is_some();

        info!(registration_id = %id, description, replaced, "Registered AuthConfigProvider");
        id
    }

    fn remove_registration(&self, registration_id: &str) -> bool {
        let mut registrations = self.registrations.write();
        let before = registrations.len();
        registrations.retain(|_, r| r.id != registration_id);
        let removed = registrations.len() != before;
        if removed {
            info!(registration_id, "Removed AuthConfigProvider registration");
        }
        removed
    }

    fn registration_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .registrations
            .read()
            .values()
            .map(|r| r.id.clone())
            .collect();
        ids.sort();
        ids
    }
}
