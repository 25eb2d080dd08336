//! Session identity cache.
//!
//! One reserved session attribute holds the identity a provider asked to
//! register. No other attribute is ever read or written here.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use web_security::{AuthType, SecurityIdentity};

use msg_auth_sdk::{ExchangeError, HttpSession, ServerExchange};

/// Session attribute key of the identity record.
pub const IDENTITY_KEY: &str = "msg_auth.identity_record";

/// Current encoding version of the record.
pub const RECORD_VERSION: u32 = 1;

/// Identity cached for a session, together with the mechanism that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentityRecord {
    identity: SecurityIdentity,
    auth_type: Option<AuthType>,
}

impl SessionIdentityRecord {
    #[must_use]
    pub fn new(identity: SecurityIdentity, auth_type: Option<AuthType>) -> Self {
        Self {
            identity,
            auth_type,
        }
    }

    #[must_use]
    pub fn identity(&self) -> &SecurityIdentity {
        &self.identity
    }

    #[must_use]
    pub fn auth_type(&self) -> Option<&AuthType> {
        self.auth_type.as_ref()
    }

    #[must_use]
    pub fn into_parts(self) -> (SecurityIdentity, Option<AuthType>) {
        (self.identity, self.auth_type)
    }
}

/// Stored form. `identity` is optional so that a partially written record
/// decodes and can be detected.
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    version: u32,
    identity: Option<SecurityIdentity>,
    #[serde(default)]
    auth_type: Option<String>,
}

/// What was found under [`IDENTITY_KEY`].
#[derive(Debug)]
enum Decoded {
    Valid(SessionIdentityRecord),
    Corrupted(String),
}

fn decode(value: serde_json::Value) -> Decoded {
    let stored: StoredRecord = match serde_json::from_value(value) {
        Ok(stored) => stored,
        Err(e) => return Decoded::Corrupted(e.to_string()),
    };

    if stored.version != RECORD_VERSION {
        return Decoded::Corrupted(format!("unsupported record version {}", stored.version));
    }

    let Some(identity) = stored.identity else {
        return Decoded::Corrupted("record carries no identity".to_owned());
    };

    // A blank label is treated as absent; the caller substitutes the mechanism name.
    let auth_type = stored.auth_type.and_then(|s| AuthType::new(s).ok());

    Decoded::Valid(SessionIdentityRecord::new(identity, auth_type))
}

fn encode(record: &SessionIdentityRecord) -> Result<serde_json::Value, ExchangeError> {
    let stored = StoredRecord {
        version: RECORD_VERSION,
        identity: Some(record.identity.clone()),
        auth_type: record.auth_type.as_ref().map(|a| a.as_str().to_owned()),
    };
    Ok(serde_json::to_value(stored)?)
}

/// Restore the cached identity of the request's existing session.
///
/// A record that is present but unusable is removed and reported as a miss.
/// No session is created.
///
/// # Errors
///
/// Returns `ExchangeError` if the session store fails.
pub fn restore(
    exchange: &mut dyn ServerExchange,
) -> Result<Option<SessionIdentityRecord>, ExchangeError> {
    let Some(session) = exchange.session(false)? else {
        return Ok(None);
    };
    restore_from(session.as_ref())
}

/// Restore from a specific session.
///
/// # Errors
///
/// Returns `ExchangeError` if the session store fails.
pub fn restore_from(
    session: &dyn HttpSession,
) -> Result<Option<SessionIdentityRecord>, ExchangeError> {
    let Some(value) = session.attribute(IDENTITY_KEY)? else {
        return Ok(None);
    };

    match decode(value) {
        Decoded::Valid(record) => Ok(Some(record)),
        Decoded::Corrupted(reason) => {
            debug!(
                session_id = %session.id(),
                reason = %reason,
                "Removing unusable identity record from HttpSession"
            );
            session.remove_attribute(IDENTITY_KEY)?;
            Ok(None)
        }
    }
}

/// Write `record` to the request's session, creating the session if needed.
/// Any previous record is replaced.
///
/// # Errors
///
/// Returns `ExchangeError` if the session store fails or no session can be created.
pub fn store(
    exchange: &mut dyn ServerExchange,
    record: &SessionIdentityRecord,
) -> Result<(), ExchangeError> {
    let session = exchange
        .session(true)?
        .ok_or_else(|| ExchangeError::Session("session could not be created".to_owned()))?;

    trace!(
        session_id = %session.id(),
        principal = %record.identity.display_name(),
        "Storing SecurityIdentity in HttpSession"
    );
    session.set_attribute(IDENTITY_KEY, encode(record)?)
}
