//! Adapter deployment model.
//!
//! A [`Deployment`] describes how one protected application talks to its
//! identity provider and where it keeps adapter state between requests.
//!
//! # Example (TOML)
//!
//! ```toml
//! [deployment]
//! realm = "hospital"
//! resource = "portal"
//! token_store = "cookie"
//!
//! [deployment.state_cookie]
//! name = "SESSIONWARD_ADAPTER_STATE"
//! secure = true
//! same_site = "Strict"
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sessionward_core::HttpExchange;

/// Where authenticated-token state is kept between requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStoreKind {
    /// In the host HTTP session.
    #[default]
    Session,
    /// In a client-side cookie.
    Cookie,
}

impl TokenStoreKind {
    /// Returns the token store kind as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Cookie => "cookie",
        }
    }
}

impl std::fmt::Display for TokenStoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cookie that carries adapter state for the cookie token store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StateCookieConfig {
    /// Cookie name.
    pub name: String,

    /// Cookie path.
    pub path: String,

    /// Send the cookie over HTTPS only.
    pub secure: bool,

    /// SameSite attribute ("Strict", "Lax" or "None").
    pub same_site: String,
}

impl Default for StateCookieConfig {
    fn default() -> Self {
        Self {
            name: "SESSIONWARD_ADAPTER_STATE".to_string(),
            path: "/".to_string(),
            secure: true,
            same_site: "Lax".to_string(),
        }
    }
}

impl StateCookieConfig {
    /// Builds a `Set-Cookie` value that clears the state cookie.
    #[must_use]
    pub fn build_clear_cookie(&self) -> String {
        let secure = if self.secure { "; Secure" } else { "" };

        format!(
            "{}=; Path={}; Max-Age=0; HttpOnly; SameSite={}{}",
            self.name, self.path, self.same_site, secure
        )
    }
}

/// One protected application registered with an identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Deployment {
    /// Identity-provider realm.
    pub realm: String,

    /// Client identifier of the application at the identity provider.
    pub resource: String,

    /// Where token state is kept.
    pub token_store: TokenStoreKind,

    /// Name of the host session cookie.
    pub session_cookie_name: String,

    /// State cookie used by the cookie token store.
    pub state_cookie: StateCookieConfig,
}

impl Default for Deployment {
    fn default() -> Self {
        Self {
            realm: "master".to_string(),
            resource: "sessionward".to_string(),
            token_store: TokenStoreKind::Session,
            session_cookie_name: "SESSIONID".to_string(),
            state_cookie: StateCookieConfig::default(),
        }
    }
}

/// Resolves the deployment that governs an exchange.
pub trait DeploymentContext: Send + Sync {
    fn resolve_deployment(&self, exchange: &HttpExchange) -> Arc<Deployment>;
}

/// Deployment context serving a single deployment for every exchange.
#[derive(Debug, Clone)]
pub struct StaticDeploymentContext {
    deployment: Arc<Deployment>,
}

impl StaticDeploymentContext {
    pub fn new(deployment: Deployment) -> Self {
        Self {
            deployment: Arc::new(deployment),
        }
    }
}

impl DeploymentContext for StaticDeploymentContext {
    fn resolve_deployment(&self, _exchange: &HttpExchange) -> Arc<Deployment> {
        Arc::clone(&self.deployment)
    }
}
