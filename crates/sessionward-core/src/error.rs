//! Session error types.
//!
//! Errors raised by host sessions and session managers. None of these cross
//! the forced-logout boundary: the registry logs them and moves on.

/// Errors that can occur while looking up or invalidating host sessions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The session was already torn down when invalidation was attempted.
    #[error("Session {session_id} already invalidated")]
    AlreadyInvalidated {
        /// Identifier of the session.
        session_id: String,
    },

    /// The session manager does not know the session.
    #[error("Session {session_id} not found")]
    NotFound {
        /// Identifier of the session.
        session_id: String,
    },

    /// The session manager failed for a reason of its own.
    #[error("Session manager error: {message}")]
    Manager {
        /// Description of the manager failure.
        message: String,
    },
}

impl SessionError {
    /// Creates a new `AlreadyInvalidated` error.
    #[must_use]
    pub fn already_invalidated(session_id: impl Into<String>) -> Self {
        Self::AlreadyInvalidated {
            session_id: session_id.into(),
        }
    }

    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(session_id: impl Into<String>) -> Self {
        Self::NotFound {
            session_id: session_id.into(),
        }
    }

    /// Creates a new `Manager` error.
    #[must_use]
    pub fn manager(message: impl Into<String>) -> Self {
        Self::Manager {
            message: message.into(),
        }
    }

    /// Returns `true` if the session is gone, whether it never existed or was
    /// already invalidated.
    #[must_use]
    pub fn is_gone(&self) -> bool {
        matches!(self, Self::AlreadyInvalidated { .. } | Self::NotFound { .. })
    }
}
