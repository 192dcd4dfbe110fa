//! Host sessions and their attributes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::SessionResult;
use crate::exchange::HttpExchange;

/// Attribute under which the host's authentication machinery stores the
/// [`AuthenticatedSession`] marker.
pub const AUTHENTICATED_SESSION_ATTRIBUTE: &str = "sessionward.authenticated-session";

/// A live session owned by the host session manager.
pub trait Session: Send + Sync {
    /// Current identifier of the session.
    fn id(&self) -> String;

    /// Returns the named attribute, if set.
    fn attribute(&self, name: &str) -> Option<SessionAttribute>;

    /// Invalidates the session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AlreadyInvalidated`] if the session was already
    /// torn down.
    ///
    /// [`SessionError::AlreadyInvalidated`]: crate::SessionError::AlreadyInvalidated
    fn invalidate(&self, exchange: Option<&mut HttpExchange>) -> SessionResult<()>;
}

/// Value stored on a session.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SessionAttribute {
    /// Marker associating the session with an authenticated account.
    AuthenticatedSession(AuthenticatedSession),
    /// Arbitrary application data.
    Value(serde_json::Value),
}

impl SessionAttribute {
    /// Returns the authenticated-session marker, if this attribute is one.
    #[must_use]
    pub fn as_authenticated_session(&self) -> Option<&AuthenticatedSession> {
        match self {
            Self::AuthenticatedSession(session) => Some(session),
            Self::Value(_) => None,
        }
    }
}

/// Marker stored on a host session once its request was authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthenticatedSession {
    /// The authenticated account.
    pub account: Account,
    /// Name of the mechanism that authenticated the account.
    pub mechanism: String,
}

impl AuthenticatedSession {
    /// Creates a marker for the given account.
    pub fn new(account: Account, mechanism: impl Into<String>) -> Self {
        Self {
            account,
            mechanism: mechanism.into(),
        }
    }

    /// Name of the authenticated principal.
    pub fn principal(&self) -> &str {
        &self.account.principal
    }
}

/// An authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Account {
    /// Principal name.
    pub principal: String,
    /// Roles granted to the principal.
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl Account {
    /// Creates an account without roles.
    pub fn new(principal: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            roles: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }
}
