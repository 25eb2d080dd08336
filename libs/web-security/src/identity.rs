use std::collections::{BTreeMap, BTreeSet};

use uuid::Uuid;

use crate::constants::ANONYMOUS_PRINCIPAL;

/// `SecurityIdentity` is the authenticated principal handle produced for a request.
///
/// Built by the negotiation session when a provider accepts a request, or restored
/// from the session identity record on a later request. Never mutated after it is
/// built: operations that add information return a new identity.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SecurityIdentity {
    /// Identifier of the authentication event that produced this identity.
    id: Uuid,
    /// Principal name. `None` means the anonymous identity.
    principal: Option<String>,
    /// Roles resolved for the principal.
    #[serde(default)]
    roles: BTreeSet<String>,
    /// Free-form attributes attached by the security domain.
    #[serde(default)]
    attributes: BTreeMap<String, Vec<String>>,
}

impl SecurityIdentity {
    /// Create a new `SecurityIdentity` builder
    #[must_use]
    pub fn builder() -> SecurityIdentityBuilder {
        SecurityIdentityBuilder::default()
    }

    /// Create an anonymous identity with no principal, roles or attributes
    #[must_use]
    pub fn anonymous() -> Self {
        SecurityIdentityBuilder::default().build()
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get the principal name, if any.
    #[must_use]
    pub fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    /// Principal name for logging; `"anonymous"` when there is none.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.principal.as_deref().unwrap_or(ANONYMOUS_PRINCIPAL)
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.principal.is_none()
    }

    #[must_use]
    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, Vec<String>> {
        &self.attributes
    }

    /// Values of a single attribute; empty when the attribute is not set.
    #[must_use]
    pub fn attribute(&self, name: &str) -> &[String] {
        self.attributes.get(name).map_or(&[][..], Vec::as_slice)
    }

    /// Return a copy of this identity with `roles` added.
    #[must_use]
    pub fn with_roles<I, S>(&self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut next = self.clone();
        next.roles.extend(roles.into_iter().map(Into::into));
        next
    }
}

#[derive(Default)]
pub struct SecurityIdentityBuilder {
    id: Option<Uuid>,
    principal: Option<String>,
    roles: BTreeSet<String>,
    attributes: BTreeMap<String, Vec<String>>,
}

impl SecurityIdentityBuilder {
    #[must_use]
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn principal(mut self, principal: &str) -> Self {
        self.principal = Some(principal.to_owned());
        self
    }

    #[must_use]
    pub fn role(mut self, role: &str) -> Self {
        self.roles.insert(role.to_owned());
        self
    }

    #[must_use]
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn attribute(mut self, name: &str, values: Vec<String>) -> Self {
        self.attributes.insert(name.to_owned(), values);
        self
    }

    #[must_use]
    pub fn build(self) -> SecurityIdentity {
        SecurityIdentity {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            principal: self.principal,
            roles: self.roles,
            attributes: self.attributes,
        }
    }
}
