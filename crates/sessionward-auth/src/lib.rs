//! # sessionward-auth
//!
//! Adapts an external identity-provider authenticator to the host security
//! pipeline.
//!
//! [`IdentityAuthMechanism`] forwards each exchange to the authenticator,
//! translates its outcome into the host's vocabulary, queues challenges, and
//! ties identity-provider logout to the host's logout notifications. For
//! session-backed deployments it attaches the
//! [`SessionLogoutRegistry`](sessionward_core::SessionLogoutRegistry) to the
//! host session manager on the first successful authentication.
//!
//! ## Modules
//!
//! - [`authenticator`] - Contracts of the identity-provider authenticator
//! - [`config`] - Adapter configuration and loader
//! - [`deployment`] - Deployment model and resolution
//! - [`mechanism`] - The authentication mechanism
//! - [`notification`] - Host security notifications
//! - [`observability`] - Tracing setup
//! - [`outcome`] - Outcome vocabularies
//! - [`token_store`] - Session and cookie token stores

pub mod authenticator;
pub mod config;
pub mod deployment;
pub mod error;
pub mod mechanism;
pub mod notification;
pub mod observability;
pub mod outcome;
pub mod token_store;

pub use authenticator::{
    AuthChallenge, IdentityAttachment, IdentityContext, PendingChallenge, RefreshableContext,
    RequestAuthenticator,
};
pub use config::{AdapterConfig, ConfigError, LoggingConfig};
pub use deployment::{
    Deployment, DeploymentContext, StateCookieConfig, StaticDeploymentContext, TokenStoreKind,
};
pub use error::AdapterError;
pub use mechanism::IdentityAuthMechanism;
pub use notification::{
    NotificationHub, NotificationReceiver, SecurityContext, SecurityEvent, SecurityNotification,
};
pub use outcome::{AuthOutcome, ChallengeResult, MechanismOutcome};
pub use token_store::{
    CookieTokenStore, DefaultTokenStores, SessionTokenStore, TokenStore, TokenStoreFactory,
    select_token_store,
};

/// Type alias for adapter operation results.
pub type AdapterResult<T> = Result<T, AdapterError>;
