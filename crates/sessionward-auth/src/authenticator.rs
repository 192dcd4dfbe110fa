//! Contracts of the external identity-provider authenticator.
//!
//! Token validation, refresh and challenge construction all happen behind
//! these traits; the mechanism only forwards calls and adapts results.

use std::sync::Arc;

use sessionward_core::HttpExchange;

use crate::deployment::Deployment;
use crate::error::AdapterError;
use crate::outcome::AuthOutcome;

/// Per-request authenticator supplied by the identity-provider library.
pub trait RequestAuthenticator {
    /// Verifies the credentials carried by the exchange.
    fn authenticate(&mut self, exchange: &mut HttpExchange) -> AuthOutcome;

    /// Challenge to send when authentication did not succeed, if any.
    fn challenge(&self) -> Option<Arc<dyn AuthChallenge>>;
}

/// A challenge (redirect to login, `WWW-Authenticate`, error page).
pub trait AuthChallenge: Send + Sync {
    /// Writes the challenge onto the exchange. Returns `true` if it did.
    fn challenge(&self, exchange: &mut HttpExchange) -> bool;
}

/// Challenge waiting on an exchange until the host asks for it.
#[derive(Clone)]
pub struct PendingChallenge(pub Arc<dyn AuthChallenge>);

/// Identity established for a request, attached to its exchange.
pub trait IdentityContext: Send + Sync {
    fn principal(&self) -> &str;

    /// The refreshable view of this context, if it holds refresh state.
    fn as_refreshable(&self) -> Option<&dyn RefreshableContext> {
        None
    }
}

/// Identity context holding refresh state with the identity provider.
pub trait RefreshableContext: Send + Sync {
    /// Ends the identity-provider session backing this context.
    fn logout(&self, deployment: &Deployment) -> Result<(), AdapterError>;
}

/// Exchange attachment carrying the request's [`IdentityContext`].
#[derive(Clone)]
pub struct IdentityAttachment(pub Arc<dyn IdentityContext>);
