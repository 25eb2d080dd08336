//! In-memory HTTP session store.
//!
//! Used when the hosting server has no session store of its own, and by tests.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use http::StatusCode;
use parking_lot::RwLock;
use uuid::Uuid;

use msg_auth_sdk::{ExchangeError, HttpSession, ServerExchange};

/// A session whose attributes live in process memory.
///
/// Attribute operations are individually atomic; concurrent writers to the
/// same key resolve last-writer-wins.
#[derive(Debug)]
pub struct InMemorySession {
    id: String,
    attributes: RwLock<HashMap<String, serde_json::Value>>,
}

impl InMemorySession {
    fn new(id: String) -> Self {
        Self {
            id,
            attributes: RwLock::new(HashMap::new()),
        }
    }

    /// Number of attributes currently set.
    #[must_use]
    pub fn attribute_count(&self) -> usize {
        self.attributes.read().len()
    }
}

impl HttpSession for InMemorySession {
    fn id(&self) -> &str {
        &self.id
    }

    fn attribute(&self, key: &str) -> Result<Option<serde_json::Value>, ExchangeError> {
        Ok(self.attributes.read().get(key).cloned())
    }

    fn set_attribute(&self, key: &str, value: serde_json::Value) -> Result<(), ExchangeError> {
        self.attributes.write().insert(key.to_owned(), value);
        Ok(())
    }

    fn remove_attribute(&self, key: &str) -> Result<Option<serde_json::Value>, ExchangeError> {
        Ok(self.attributes.write().remove(key))
    }
}

/// Table of live sessions keyed by session id.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, Arc<InMemorySession>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Create a session with a fresh random id.
    #[must_use]
    pub fn create(&self) -> Arc<InMemorySession> {
        let session = Arc::new(InMemorySession::new(Uuid::new_v4().to_string()));
        self.sessions
            .insert(session.id.clone(), Arc::clone(&session));
        session
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<InMemorySession>> {
        self.sessions.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Drop a session. Returns `true` if it existed.
    pub fn invalidate(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// A [`ServerExchange`] backed by an [`InMemorySessionStore`].
///
/// The session id plays the role of the session cookie: pass the id returned
/// by [`InMemoryExchange::session_id`] into the next request's exchange to
/// continue the same session.
pub struct InMemoryExchange {
    store: Arc<InMemorySessionStore>,
    request: http::request::Parts,
    session_id: Option<String>,
    status: StatusCode,
}

impl InMemoryExchange {
    #[must_use]
    pub fn new(store: Arc<InMemorySessionStore>, request: http::request::Parts) -> Self {
        Self {
            store,
            request,
            session_id: None,
            status: StatusCode::OK,
        }
    }

    /// Continue an existing session.
    #[must_use]
    pub fn with_session_id(mut self, session_id: &str) -> Self {
        self.session_id = Some(session_id.to_owned());
        self
    }

    /// Id of the session attached to this exchange, if any.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Response status set so far (`200 OK` unless changed).
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl ServerExchange for InMemoryExchange {
    fn request(&self) -> &http::request::Parts {
        &self.request
    }

    fn session(&mut self, create: bool) -> Result<Option<Arc<dyn HttpSession>>, ExchangeError> {
        if let Some(existing) = self.session_id.as_deref().and_then(|id| self.store.get(id)) {
            return Ok(Some(existing));
        }
        if !create {
            return Ok(None);
        }
        let session = self.store.create();
        self.session_id = Some(session.id.clone());
        Ok(Some(session))
    }

    fn set_status_code(&mut self, status: StatusCode) {
        self.status = status;
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use serde_json::json;

    use super::*;

    fn parts() -> http::request::Parts {
        let (parts, ()) = http::Request::builder()
            .uri("/")
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn session_without_create_returns_none() {
        let store = InMemorySessionStore::new_shared();
        let mut ex = InMemoryExchange::new(store.clone(), parts());

        assert!(ex.session(false).unwrap().is_none());
        assert!(store.is_empty());
        assert!(ex.session_id().is_none());
    }

    #[test]
    fn session_with_create_is_reused() {
        let store = InMemorySessionStore::new_shared();
        let mut ex = InMemoryExchange::new(store.clone(), parts());

        let first = ex.session(true).unwrap().unwrap();
        let second = ex.session(false).unwrap().unwrap();

        assert_eq!(first.id(), second.id());
        assert_eq!(ex.session_id(), Some(first.id()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn session_id_carries_across_exchanges() {
        let store = InMemorySessionStore::new_shared();
        let mut first = InMemoryExchange::new(store.clone(), parts());
        let session = first.session(true).unwrap().unwrap();
        session.set_attribute("k", json!(1)).unwrap();

        let mut second =
            InMemoryExchange::new(store.clone(), parts()).with_session_id(session.id());
        let again = second.session(false).unwrap().unwrap();

        assert_eq!(again.attribute("k").unwrap(), Some(json!(1)));
    }

    #[test]
    fn invalidated_session_is_gone() {
        let store = InMemorySessionStore::new_shared();
        let session = store.create();
        let id = session.id().to_owned();

        assert!(store.invalidate(&id));
        assert!(!store.invalidate(&id));

        let mut ex = InMemoryExchange::new(store.clone(), parts()).with_session_id(&id);
        assert!(ex.session(false).unwrap().is_none());
    }

    #[test]
    fn attributes_are_independent() {
        let store = InMemorySessionStore::new();
        let session = store.create();

        session.set_attribute("a", json!("x")).unwrap();
        session.set_attribute("b", json!("y")).unwrap();
        assert_eq!(session.remove_attribute("a").unwrap(), Some(json!("x")));

        assert_eq!(session.attribute_count(), 1);
        assert_eq!(session.attribute("b").unwrap(), Some(json!("y")));
    }
}
