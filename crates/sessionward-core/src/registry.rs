//! Forced-logout registry.
//!
//! The [`SessionLogoutRegistry`] attaches itself once to a host session manager
//! as a lifecycle listener and invalidates host sessions on request: all of
//! them, or a caller-supplied selection. Invalidation is a best-effort sweep.
//! A session that is missing or already torn down is logged at warning level
//! and the sweep carries on with the next one.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sessionward_core::{InMemorySessionManager, SessionLogoutRegistry, SessionLookupMode};
//!
//! let manager = InMemorySessionManager::new();
//! let registry = Arc::new(SessionLogoutRegistry::new(SessionLookupMode::Direct));
//! registry.attach(&manager);
//!
//! let summary = registry.logout_all(&manager);
//! assert!(summary.is_complete());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::SessionResult;
use crate::config::{SessionLookupMode, SessionsConfig};
use crate::error::SessionError;
use crate::exchange::HttpExchange;
use crate::listener::{SessionDestroyedReason, SessionListener};
use crate::manager::{FixedSessionId, SessionManager};
use crate::session::{AUTHENTICATED_SESSION_ATTRIBUTE, Session};

/// Username reported for sessions without an authenticated-session marker.
const UNAUTHENTICATED: &str = "<unauthenticated>";

/// Outcome of a forced-logout sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogoutSummary {
    /// Sessions that were invalidated, in sweep order.
    pub invalidated: Vec<String>,
    /// Sessions that were missing or already invalidated, in sweep order.
    pub failed: Vec<String>,
}

impl LogoutSummary {
    /// Returns `true` if every attempted session was invalidated.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of sessions the sweep attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.invalidated.len() + self.failed.len()
    }
}

/// Tracks host sessions so that they can be forcibly logged out.
///
/// One registry is created per deployment. It holds no per-session state; the
/// host session manager owns every session.
#[derive(Debug, Default)]
pub struct SessionLogoutRegistry {
    registered: AtomicBool,
    lookup: SessionLookupMode,
}

impl SessionLogoutRegistry {
    /// Creates a registry using the given lookup convention.
    pub fn new(lookup: SessionLookupMode) -> Self {
        Self {
            registered: AtomicBool::new(false),
            lookup,
        }
    }

    pub fn from_config(config: &SessionsConfig) -> Self {
        Self::new(config.lookup)
    }

    pub fn lookup_mode(&self) -> SessionLookupMode {
        self.lookup
    }

    /// Returns `true` once the registry is registered as a session listener.
    pub fn is_attached(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }

    /// Registers this registry as a session listener on `manager`.
    ///
    /// Only the first call registers; every later call, with the same or a
    /// different manager, is a no-op. Racing callers are safe: exactly one of
    /// them performs the registration.
    pub fn attach(self: &Arc<Self>, manager: &dyn SessionManager) {
        if self
            .registered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        manager.register_session_listener(Arc::clone(self) as Arc<dyn SessionListener>);
        debug!(lookup = %self.lookup, "Logout registry attached to session manager");
    }

    /// Invalidates every session the manager currently knows.
    pub fn logout_all(&self, manager: &dyn SessionManager) -> LogoutSummary {
        let session_ids = manager.all_sessions();
        debug!(count = session_ids.len(), "Logging out all sessions");
        self.logout_each(manager, session_ids)
    }

    /// Invalidates the given sessions, in order.
    pub fn logout_selected<I, S>(&self, manager: &dyn SessionManager, session_ids: I) -> LogoutSummary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let session_ids: Vec<S> = session_ids.into_iter().collect();
        debug!(
            session_ids = ?session_ids.iter().map(|id| id.as_ref()).collect::<Vec<&str>>(),
            "Logging out selected sessions"
        );
        self.logout_each(manager, session_ids)
    }

    fn logout_each<I, S>(&self, manager: &dyn SessionManager, session_ids: I) -> LogoutSummary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut summary = LogoutSummary::default();

        for session_id in session_ids {
            let session_id = session_id.as_ref();
            match self.invalidate_one(manager, session_id) {
                Ok(()) => summary.invalidated.push(session_id.to_string()),
                Err(e) => {
                    warn!(
                        session_id = %session_id,
                        error = %e,
                        "Session not present or already invalidated"
                    );
                    summary.failed.push(session_id.to_string());
                }
            }
        }

        summary
    }

    fn invalidate_one(&self, manager: &dyn SessionManager, session_id: &str) -> SessionResult<()> {
        debug!(session_id = %session_id, "Logging out session");
        let session = self
            .lookup_session(manager, session_id)
            .ok_or_else(|| SessionError::not_found(session_id))?;
        session.invalidate(None)
    }

    fn lookup_session(&self, manager: &dyn SessionManager, session_id: &str) -> Option<Arc<dyn Session>> {
        match self.lookup {
            SessionLookupMode::Direct => manager.session(session_id),
            SessionLookupMode::Distributed => {
                manager.session_for_exchange(None, &FixedSessionId::new(session_id))
            }
        }
    }
}

/// Principal name recorded in the session's authenticated-session marker.
pub fn username_from_session(session: &dyn Session) -> Option<String> {
    session
        .attribute(AUTHENTICATED_SESSION_ATTRIBUTE)?
        .as_authenticated_session()
        .map(|marker| marker.principal().to_string())
}

impl SessionListener for SessionLogoutRegistry {
    fn session_destroyed(
        &self,
        session: &dyn Session,
        _exchange: Option<&HttpExchange>,
        reason: SessionDestroyedReason,
    ) {
        let session_id = session.id();
        let username = username_from_session(session);
        debug!(
            session_id = %session_id,
            username = %username.as_deref().unwrap_or(UNAUTHENTICATED),
            reason = %reason,
            "Session destroyed"
        );
    }
}
