//! Adapter error types.

/// Errors raised while adapting an identity-provider authenticator to the host.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// A token store failed to save or clear adapter state.
    #[error("Token store error: {message}")]
    TokenStore {
        /// Description of the token store failure.
        message: String,
    },

    /// The identity provider rejected or failed a request.
    #[error("Identity provider error: {message}")]
    IdentityProvider {
        /// Description of the identity provider failure.
        message: String,
    },

    /// The adapter is misconfigured.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl AdapterError {
    /// Creates a new `TokenStore` error.
    #[must_use]
    pub fn token_store(message: impl Into<String>) -> Self {
        Self::TokenStore {
            message: message.into(),
        }
    }

    /// Creates a new `IdentityProvider` error.
    #[must_use]
    pub fn identity_provider(message: impl Into<String>) -> Self {
        Self::IdentityProvider {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
