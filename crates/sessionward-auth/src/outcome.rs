//! Authentication outcome vocabularies.
//!
//! The identity-provider authenticator reports an [`AuthOutcome`]; the host's
//! security pipeline speaks [`MechanismOutcome`] and [`ChallengeResult`].

use axum::http::StatusCode;

/// Result reported by the external identity-provider authenticator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthOutcome {
    /// No credentials were presented.
    NotAttempted,
    /// Credentials were presented and rejected.
    Failed,
    /// Credentials were verified.
    Authenticated,
    /// The request completed a logout.
    LoggedOut,
}

/// Result handed back to the host security pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MechanismOutcome {
    Authenticated,
    /// Authentication failed; a challenge may have been queued.
    NotAuthenticated,
    NotAttempted,
}

impl From<AuthOutcome> for MechanismOutcome {
    fn from(outcome: AuthOutcome) -> Self {
        match outcome {
            AuthOutcome::Authenticated => Self::Authenticated,
            AuthOutcome::Failed => Self::NotAuthenticated,
            AuthOutcome::NotAttempted | AuthOutcome::LoggedOut => Self::NotAttempted,
        }
    }
}

/// Whether a challenge was written to the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengeResult {
    /// `true` if a challenge was sent.
    pub sent: bool,
    /// Response status set by the challenge.
    pub status: Option<StatusCode>,
}

impl ChallengeResult {
    #[must_use]
    pub fn sent(status: StatusCode) -> Self {
        Self {
            sent: true,
            status: Some(status),
        }
    }

    #[must_use]
    pub fn not_sent() -> Self {
        Self {
            sent: false,
            status: None,
        }
    }
}
