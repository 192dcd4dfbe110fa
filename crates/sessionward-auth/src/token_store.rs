//! Token stores.
//!
//! A token store keeps identity-provider token state between requests. The
//! deployment decides which one is used: the host session
//! ([`SessionTokenStore`]) or a client-side cookie ([`CookieTokenStore`]).

use std::sync::Arc;

use axum::http::{HeaderValue, header::SET_COOKIE};
use sessionward_core::{HttpExchange, SessionLogoutRegistry, SessionManager};
use tracing::debug;

use crate::deployment::{Deployment, StateCookieConfig, TokenStoreKind};
use crate::error::AdapterError;

/// Keeps adapter token state between requests.
pub trait TokenStore {
    /// Clears the token state bound to the exchange.
    fn logout(&self, exchange: &mut HttpExchange) -> Result<(), AdapterError>;
}

/// Builds the token stores a deployment may select.
pub trait TokenStoreFactory: Send + Sync {
    fn session_store(&self, deployment: &Deployment) -> Box<dyn TokenStore>;

    fn cookie_store(&self, deployment: &Deployment) -> Box<dyn TokenStore>;
}

/// Selects the token store configured for the deployment.
pub fn select_token_store(
    factory: &dyn TokenStoreFactory,
    deployment: &Deployment,
) -> Box<dyn TokenStore> {
    match deployment.token_store {
        TokenStoreKind::Session => factory.session_store(deployment),
        TokenStoreKind::Cookie => factory.cookie_store(deployment),
    }
}

/// Token store backed by the host HTTP session.
///
/// Logging out forces the exchange's host session out through the registry.
pub struct SessionTokenStore {
    registry: Arc<SessionLogoutRegistry>,
    manager: Arc<dyn SessionManager>,
    session_cookie_name: String,
}

impl SessionTokenStore {
    pub fn new(
        registry: Arc<SessionLogoutRegistry>,
        manager: Arc<dyn SessionManager>,
        session_cookie_name: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            manager,
            session_cookie_name: session_cookie_name.into(),
        }
    }
}

impl TokenStore for SessionTokenStore {
    fn logout(&self, exchange: &mut HttpExchange) -> Result<(), AdapterError> {
        let Some(session_id) = exchange.cookie(&self.session_cookie_name) else {
            debug!(cookie = %self.session_cookie_name, "No host session bound to exchange");
            return Ok(());
        };

        let summary = self
            .registry
            .logout_selected(self.manager.as_ref(), [&session_id]);
        debug!(
            session_id = %session_id,
            invalidated = summary.is_complete(),
            "Session token store logged out"
        );
        Ok(())
    }
}

/// Token store backed by a client-side state cookie.
///
/// Logging out tells the client to drop the cookie.
#[derive(Debug, Clone)]
pub struct CookieTokenStore {
    cookie: StateCookieConfig,
}

impl CookieTokenStore {
    pub fn new(cookie: StateCookieConfig) -> Self {
        Self { cookie }
    }
}

impl TokenStore for CookieTokenStore {
    fn logout(&self, exchange: &mut HttpExchange) -> Result<(), AdapterError> {
        let value = HeaderValue::from_str(&self.cookie.build_clear_cookie()).map_err(|e| {
            AdapterError::token_store(format!(
                "Invalid state cookie '{}': {}",
                self.cookie.name, e
            ))
        })?;
        exchange.response_headers_mut().append(SET_COOKIE, value);
        debug!(cookie = %self.cookie.name, "Cookie token store cleared state cookie");
        Ok(())
    }
}

/// Factory for the built-in session and cookie token stores.
#[derive(Clone)]
pub struct DefaultTokenStores {
    registry: Arc<SessionLogoutRegistry>,
    manager: Arc<dyn SessionManager>,
}

impl DefaultTokenStores {
    pub fn new(registry: Arc<SessionLogoutRegistry>, manager: Arc<dyn SessionManager>) -> Self {
        Self { registry, manager }
    }
}

impl TokenStoreFactory for DefaultTokenStores {
    fn session_store(&self, deployment: &Deployment) -> Box<dyn TokenStore> {
        Box::new(SessionTokenStore::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.manager),
            deployment.session_cookie_name.clone(),
        ))
    }

    fn cookie_store(&self, deployment: &Deployment) -> Box<dyn TokenStore> {
        Box::new(CookieTokenStore::new(deployment.state_cookie.clone()))
    }
}
