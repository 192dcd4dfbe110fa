//! Session lifecycle listener.
//!
//! Host session managers call registered listeners on every lifecycle event.
//! All callbacks default to no-ops so implementors only override the events
//! they care about.

use crate::exchange::HttpExchange;
use crate::session::{Session, SessionAttribute};

/// Why a session was destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionDestroyedReason {
    /// The session was explicitly invalidated.
    Invalidated,
    /// The session timed out.
    Timeout,
    /// The host is undeploying the application.
    Undeploy,
}

impl SessionDestroyedReason {
    /// Returns the reason as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invalidated => "invalidated",
            Self::Timeout => "timeout",
            Self::Undeploy => "undeploy",
        }
    }
}

impl std::fmt::Display for SessionDestroyedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Receives session lifecycle callbacks from a host session manager.
///
/// Callbacks may arrive from any worker thread.
#[allow(unused_variables)]
pub trait SessionListener: Send + Sync {
    fn session_created(&self, session: &dyn Session, exchange: Option<&HttpExchange>) {}

    fn session_destroyed(
        &self,
        session: &dyn Session,
        exchange: Option<&HttpExchange>,
        reason: SessionDestroyedReason,
    ) {
    }

    fn session_id_changed(&self, session: &dyn Session, old_session_id: &str) {}

    fn attribute_added(&self, session: &dyn Session, name: &str, value: &SessionAttribute) {}

    fn attribute_updated(
        &self,
        session: &dyn Session,
        name: &str,
        new_value: &SessionAttribute,
        old_value: &SessionAttribute,
    ) {
    }

    fn attribute_removed(&self, session: &dyn Session, name: &str, old_value: &SessionAttribute) {}
}
