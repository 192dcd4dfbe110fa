//! Host session manager contract and the lookup shim.
//!
//! A host session manager owns the live sessions. Two lookup conventions exist:
//!
//! - Direct: [`SessionManager::session`] resolves a session from its identifier.
//! - Request-scoped: [`SessionManager::session_for_exchange`] asks a
//!   [`SessionConfig`] which session identifier belongs to an exchange. Some
//!   distributed managers only honor this path, so forced logout (which has
//!   no request to speak of) hands them a [`FixedSessionId`] shim.

use std::collections::HashSet;
use std::sync::Arc;

use crate::exchange::HttpExchange;
use crate::listener::SessionListener;
use crate::session::Session;

/// Session manager owned by the host web server.
///
/// Implementations synchronize their own session collection; every method may
/// be called concurrently from any worker thread.
pub trait SessionManager: Send + Sync {
    /// Identifiers of every session the manager currently knows.
    fn all_sessions(&self) -> HashSet<String>;

    /// Looks a session up by identifier.
    fn session(&self, session_id: &str) -> Option<Arc<dyn Session>>;

    /// Looks a session up through a request-scoped lookup context.
    fn session_for_exchange(
        &self,
        exchange: Option<&HttpExchange>,
        config: &dyn SessionConfig,
    ) -> Option<Arc<dyn Session>> {
        config
            .find_session_id(exchange)
            .and_then(|session_id| self.session(&session_id))
    }

    /// Registers a lifecycle listener.
    fn register_session_listener(&self, listener: Arc<dyn SessionListener>);
}

/// Where a session identifier was carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionCookieSource {
    Cookie,
    Url,
    Ssl,
    Other,
}

/// Binds session identifiers to exchanges (cookies, URL rewriting).
pub trait SessionConfig: Send + Sync {
    fn set_session_id(&self, exchange: &mut HttpExchange, session_id: &str);

    fn clear_session(&self, exchange: &mut HttpExchange, session_id: &str);

    /// Finds the session identifier associated with the exchange.
    fn find_session_id(&self, exchange: Option<&HttpExchange>) -> Option<String>;

    fn session_cookie_source(&self, exchange: &HttpExchange) -> Option<SessionCookieSource>;

    fn rewrite_url(&self, original_url: &str, session_id: &str) -> Option<String>;
}

/// Lookup shim that resolves every exchange to one fixed session identifier.
///
/// Only [`SessionConfig::find_session_id`] does anything; the remaining
/// operations are no-ops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedSessionId {
    session_id: String,
}

impl FixedSessionId {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl SessionConfig for FixedSessionId {
    fn set_session_id(&self, _exchange: &mut HttpExchange, _session_id: &str) {}

    fn clear_session(&self, _exchange: &mut HttpExchange, _session_id: &str) {}

    fn find_session_id(&self, _exchange: Option<&HttpExchange>) -> Option<String> {
        Some(self.session_id.clone())
    }

    fn session_cookie_source(&self, _exchange: &HttpExchange) -> Option<SessionCookieSource> {
        None
    }

    fn rewrite_url(&self, _original_url: &str, _session_id: &str) -> Option<String> {
        None
    }
}
