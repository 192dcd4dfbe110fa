//! Identity-provider authentication mechanism.
//!
//! [`IdentityAuthMechanism`] sits in the host security pipeline. It forwards
//! each exchange to the identity-provider authenticator, translates the
//! outcome for the host, queues challenges, and wires identity-provider logout
//! into the host's logout notifications.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sessionward_auth::{IdentityAuthMechanism, StaticDeploymentContext};
//!
//! let mechanism = IdentityAuthMechanism::new(
//!     Arc::new(StaticDeploymentContext::new(config.deployment.clone())),
//!     registry,
//!     session_manager,
//! );
//!
//! match mechanism.authenticate(&mut exchange, &security_context, &mut authenticator) {
//!     MechanismOutcome::Authenticated => { /* serve */ }
//!     _ => { mechanism.send_challenge(&mut exchange); }
//! }
//! ```

use std::sync::Arc;

use sessionward_core::{HttpExchange, SessionLogoutRegistry, SessionManager};
use tracing::{debug, warn};

use crate::authenticator::{IdentityAttachment, PendingChallenge, RequestAuthenticator};
use crate::deployment::{Deployment, DeploymentContext, TokenStoreKind};
use crate::notification::{
    NotificationReceiver, SecurityContext, SecurityEvent, SecurityNotification,
};
use crate::outcome::{AuthOutcome, ChallengeResult, MechanismOutcome};
use crate::token_store::{DefaultTokenStores, TokenStore, TokenStoreFactory, select_token_store};

/// Authentication mechanism backed by an external identity-provider authenticator.
pub struct IdentityAuthMechanism {
    deployments: Arc<dyn DeploymentContext>,
    registry: Arc<SessionLogoutRegistry>,
    session_manager: Arc<dyn SessionManager>,
    token_stores: Arc<dyn TokenStoreFactory>,
}

impl IdentityAuthMechanism {
    /// Creates a mechanism using the built-in token stores.
    pub fn new(
        deployments: Arc<dyn DeploymentContext>,
        registry: Arc<SessionLogoutRegistry>,
        session_manager: Arc<dyn SessionManager>,
    ) -> Self {
        let token_stores = Arc::new(DefaultTokenStores::new(
            Arc::clone(&registry),
            Arc::clone(&session_manager),
        ));
        Self {
            deployments,
            registry,
            session_manager,
            token_stores,
        }
    }

    /// Replaces the token store factory.
    #[must_use]
    pub fn with_token_stores(mut self, token_stores: Arc<dyn TokenStoreFactory>) -> Self {
        self.token_stores = token_stores;
        self
    }

    pub fn registry(&self) -> &Arc<SessionLogoutRegistry> {
        &self.registry
    }

    /// Authenticates the exchange through the identity-provider authenticator.
    ///
    /// On success the logout receiver is registered with the security context
    /// and, for session-backed deployments, the logout registry is attached to
    /// the host session manager. Otherwise any challenge the authenticator
    /// offers is queued on the exchange for [`send_challenge`].
    ///
    /// [`send_challenge`]: Self::send_challenge
    pub fn authenticate(
        &self,
        exchange: &mut HttpExchange,
        security_context: &dyn SecurityContext,
        authenticator: &mut dyn RequestAuthenticator,
    ) -> MechanismOutcome {
        let outcome = authenticator.authenticate(exchange);
        if outcome == AuthOutcome::Authenticated {
            self.register_notifications(security_context);

            let deployment = self.deployments.resolve_deployment(exchange);
            if deployment.token_store == TokenStoreKind::Session {
                self.registry.attach(self.session_manager.as_ref());
            }
            debug!(realm = %deployment.realm, "Request authenticated");
            return MechanismOutcome::Authenticated;
        }

        if let Some(challenge) = authenticator.challenge() {
            exchange.extensions_mut().insert(PendingChallenge(challenge));
        }

        debug!(outcome = ?outcome, "Request not authenticated");
        MechanismOutcome::from(outcome)
    }

    /// Sends the challenge queued on the exchange, if there is one.
    pub fn send_challenge(&self, exchange: &mut HttpExchange) -> ChallengeResult {
        let Some(PendingChallenge(challenge)) = exchange.extensions().get::<PendingChallenge>().cloned()
        else {
            return ChallengeResult::not_sent();
        };

        if challenge.challenge(exchange) {
            ChallengeResult::sent(exchange.status())
        } else {
            ChallengeResult::not_sent()
        }
    }

    /// Token store configured for the deployment.
    pub fn token_store(&self, deployment: &Deployment) -> Box<dyn TokenStore> {
        select_token_store(self.token_stores.as_ref(), deployment)
    }

    fn register_notifications(&self, security_context: &dyn SecurityContext) {
        let receiver = LogoutReceiver {
            deployments: Arc::clone(&self.deployments),
            token_stores: Arc::clone(&self.token_stores),
        };
        security_context.register_notification_receiver(Arc::new(receiver));
    }
}

/// Ends identity-provider state when the host logs a request out.
struct LogoutReceiver {
    deployments: Arc<dyn DeploymentContext>,
    token_stores: Arc<dyn TokenStoreFactory>,
}

impl NotificationReceiver for LogoutReceiver {
    fn handle_notification(&self, notification: &mut SecurityNotification<'_>) {
        if notification.event != SecurityEvent::LoggedOut {
            return;
        }

        let exchange = &mut *notification.exchange;
        let deployment = self.deployments.resolve_deployment(exchange);

        let identity = exchange.extensions().get::<IdentityAttachment>().cloned();
        if let Some(IdentityAttachment(identity)) = identity
            && let Some(refreshable) = identity.as_refreshable()
        {
            if let Err(e) = refreshable.logout(&deployment) {
                warn!(
                    principal = %identity.principal(),
                    error = %e,
                    "Identity provider logout failed"
                );
            }
        }

        let token_store = select_token_store(self.token_stores.as_ref(), &deployment);
        if let Err(e) = token_store.logout(exchange) {
            warn!(
                token_store = %deployment.token_store,
                error = %e,
                "Token store logout failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::http::StatusCode;
    use sessionward_core::{InMemorySessionManager, SessionLookupMode};
    use tracing_test::traced_test;

    use super::*;
    use crate::authenticator::{AuthChallenge, IdentityContext, RefreshableContext};
    use crate::deployment::StaticDeploymentContext;
    use crate::error::AdapterError;
    use crate::notification::NotificationHub;

    struct RedirectChallenge;

    impl AuthChallenge for RedirectChallenge {
        fn challenge(&self, exchange: &mut HttpExchange) -> bool {
            exchange.set_status(StatusCode::FOUND);
            true
        }
    }

    struct DecliningChallenge;

    impl AuthChallenge for DecliningChallenge {
        fn challenge(&self, _exchange: &mut HttpExchange) -> bool {
            false
        }
    }

    struct ScriptedAuthenticator {
        outcome: AuthOutcome,
        challenge: Option<Arc<dyn AuthChallenge>>,
    }

    impl ScriptedAuthenticator {
        fn new(outcome: AuthOutcome) -> Self {
            Self {
                outcome,
                challenge: None,
            }
        }

        fn with_challenge(mut self, challenge: Arc<dyn AuthChallenge>) -> Self {
            self.challenge = Some(challenge);
            self
        }
    }

    impl RequestAuthenticator for ScriptedAuthenticator {
        fn authenticate(&mut self, _exchange: &mut HttpExchange) -> AuthOutcome {
            self.outcome
        }

        fn challenge(&self) -> Option<Arc<dyn AuthChallenge>> {
            self.challenge.clone()
        }
    }

    #[derive(Default)]
    struct RecordingStores {
        logouts: Arc<Mutex<Vec<&'static str>>>,
    }

    struct RecordingStore {
        kind: &'static str,
        logouts: Arc<Mutex<Vec<&'static str>>>,
    }

    impl TokenStore for RecordingStore {
        fn logout(&self, _exchange: &mut HttpExchange) -> Result<(), AdapterError> {
            self.logouts.lock().unwrap().push(self.kind);
            Ok(())
        }
    }

    impl TokenStoreFactory for RecordingStores {
        fn session_store(&self, _deployment: &Deployment) -> Box<dyn TokenStore> {
            Box::new(RecordingStore {
                kind: "session",
                logouts: Arc::clone(&self.logouts),
            })
        }

        fn cookie_store(&self, _deployment: &Deployment) -> Box<dyn TokenStore> {
            Box::new(RecordingStore {
                kind: "cookie",
                logouts: Arc::clone(&self.logouts),
            })
        }
    }

    struct RefreshableIdentity {
        logouts: AtomicUsize,
        fail: bool,
    }

    impl IdentityContext for RefreshableIdentity {
        fn principal(&self) -> &str {
            "alice"
        }

        fn as_refreshable(&self) -> Option<&dyn RefreshableContext> {
            Some(self as &dyn RefreshableContext)
        }
    }

    impl RefreshableContext for RefreshableIdentity {
        fn logout(&self, _deployment: &Deployment) -> Result<(), AdapterError> {
            self.logouts.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AdapterError::identity_provider("realm unreachable"))
            } else {
                Ok(())
            }
        }
    }

    struct BearerIdentity;

    impl IdentityContext for BearerIdentity {
        fn principal(&self) -> &str {
            "bob"
        }
    }

    fn mechanism(deployment: Deployment) -> (IdentityAuthMechanism, Arc<RecordingStores>) {
        let stores = Arc::new(RecordingStores::default());
        let mechanism = IdentityAuthMechanism::new(
            Arc::new(StaticDeploymentContext::new(deployment)),
            Arc::new(SessionLogoutRegistry::new(SessionLookupMode::Direct)),
            Arc::new(InMemorySessionManager::new()),
        )
        .with_token_stores(stores.clone());
        (mechanism, stores)
    }

    fn cookie_deployment() -> Deployment {
        Deployment {
            token_store: TokenStoreKind::Cookie,
            ..Deployment::default()
        }
    }

    #[test]
    fn test_authenticated_registers_receiver_and_attaches() {
        let (mechanism, _) = mechanism(Deployment::default());
        let hub = NotificationHub::new();
        let mut exchange = HttpExchange::default();
        let mut authenticator = ScriptedAuthenticator::new(AuthOutcome::Authenticated)
            .with_challenge(Arc::new(RedirectChallenge));

        let outcome = mechanism.authenticate(&mut exchange, &hub, &mut authenticator);

        assert_eq!(outcome, MechanismOutcome::Authenticated);
        assert_eq!(hub.receiver_count(), 1);
        assert!(mechanism.registry().is_attached());
        assert!(exchange.extensions().get::<PendingChallenge>().is_none());
    }

    #[test]
    fn test_cookie_deployment_does_not_attach() {
        let (mechanism, _) = mechanism(cookie_deployment());
        let hub = NotificationHub::new();
        let mut authenticator = ScriptedAuthenticator::new(AuthOutcome::Authenticated);

        mechanism.authenticate(&mut HttpExchange::default(), &hub, &mut authenticator);

        assert!(!mechanism.registry().is_attached());
    }

    #[test]
    fn test_failed_queues_challenge() {
        let (mechanism, _) = mechanism(Deployment::default());
        let hub = NotificationHub::new();
        let mut exchange = HttpExchange::default();
        let mut authenticator = ScriptedAuthenticator::new(AuthOutcome::Failed)
            .with_challenge(Arc::new(RedirectChallenge));

        let outcome = mechanism.authenticate(&mut exchange, &hub, &mut authenticator);

        assert_eq!(outcome, MechanismOutcome::NotAuthenticated);
        assert_eq!(hub.receiver_count(), 0);
        assert!(exchange.extensions().get::<PendingChallenge>().is_some());

        let result = mechanism.send_challenge(&mut exchange);
        assert_eq!(result, ChallengeResult::sent(StatusCode::FOUND));
    }

    #[test]
    fn test_not_attempted_without_challenge() {
        let (mechanism, _) = mechanism(Deployment::default());
        let hub = NotificationHub::new();
        let mut exchange = HttpExchange::default();
        let mut authenticator = ScriptedAuthenticator::new(AuthOutcome::NotAttempted);

        let outcome = mechanism.authenticate(&mut exchange, &hub, &mut authenticator);

        assert_eq!(outcome, MechanismOutcome::NotAttempted);
        assert_eq!(mechanism.send_challenge(&mut exchange), ChallengeResult::not_sent());
    }

    #[test]
    fn test_declined_challenge_is_not_sent() {
        let (mechanism, _) = mechanism(Deployment::default());
        let hub = NotificationHub::new();
        let mut exchange = HttpExchange::default();
        let mut authenticator = ScriptedAuthenticator::new(AuthOutcome::LoggedOut)
            .with_challenge(Arc::new(DecliningChallenge));

        let outcome = mechanism.authenticate(&mut exchange, &hub, &mut authenticator);

        assert_eq!(outcome, MechanismOutcome::NotAttempted);
        assert_eq!(mechanism.send_challenge(&mut exchange), ChallengeResult::not_sent());
    }

    #[test]
    fn test_token_store_selection() {
        let (mechanism, stores) = mechanism(Deployment::default());
        let mut exchange = HttpExchange::default();

        mechanism
            .token_store(&Deployment::default())
            .logout(&mut exchange)
            .unwrap();
        mechanism
            .token_store(&cookie_deployment())
            .logout(&mut exchange)
            .unwrap();

        assert_eq!(*stores.logouts.lock().unwrap(), vec!["session", "cookie"]);
    }

    #[test]
    fn test_logout_notification_ends_refreshable_context() {
        let (mechanism, stores) = mechanism(cookie_deployment());
        let hub = NotificationHub::new();
        let identity = Arc::new(RefreshableIdentity {
            logouts: AtomicUsize::new(0),
            fail: false,
        });
        let mut exchange = HttpExchange::default();
        exchange
            .extensions_mut()
            .insert(IdentityAttachment(identity.clone()));
        let mut authenticator = ScriptedAuthenticator::new(AuthOutcome::Authenticated);
        mechanism.authenticate(&mut exchange, &hub, &mut authenticator);

        hub.notify(SecurityEvent::Authenticated, &mut exchange);
        assert_eq!(identity.logouts.load(Ordering::SeqCst), 0);
        assert!(stores.logouts.lock().unwrap().is_empty());

        hub.notify(SecurityEvent::LoggedOut, &mut exchange);
        assert_eq!(identity.logouts.load(Ordering::SeqCst), 1);
        assert_eq!(*stores.logouts.lock().unwrap(), vec!["cookie"]);
    }

    #[test]
    fn test_logout_notification_skips_non_refreshable_context() {
        let (mechanism, stores) = mechanism(Deployment::default());
        let hub = NotificationHub::new();
        let mut exchange = HttpExchange::default();
        exchange
            .extensions_mut()
            .insert(IdentityAttachment(Arc::new(BearerIdentity)));
        let mut authenticator = ScriptedAuthenticator::new(AuthOutcome::Authenticated);
        mechanism.authenticate(&mut exchange, &hub, &mut authenticator);

        hub.notify(SecurityEvent::LoggedOut, &mut exchange);

        assert_eq!(*stores.logouts.lock().unwrap(), vec!["session"]);
    }

    #[test]
    #[traced_test]
    fn test_identity_provider_failure_is_logged() {
        let (mechanism, stores) = mechanism(Deployment::default());
        let hub = NotificationHub::new();
        let identity = Arc::new(RefreshableIdentity {
            logouts: AtomicUsize::new(0),
            fail: true,
        });
        let mut exchange = HttpExchange::default();
        exchange.extensions_mut().insert(IdentityAttachment(identity));
        let mut authenticator = ScriptedAuthenticator::new(AuthOutcome::Authenticated);
        mechanism.authenticate(&mut exchange, &hub, &mut authenticator);

        hub.notify(SecurityEvent::LoggedOut, &mut exchange);

        assert!(logs_contain("Identity provider logout failed"));
        assert!(logs_contain("realm unreachable"));
        assert_eq!(*stores.logouts.lock().unwrap(), vec!["session"]);
    }
}
