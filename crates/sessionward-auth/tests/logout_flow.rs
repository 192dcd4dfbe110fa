use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::http::{HeaderValue, StatusCode, header::SET_COOKIE};
use sessionward_auth::{
    AdapterError, AuthChallenge, AuthOutcome, Deployment, IdentityAttachment, IdentityAuthMechanism,
    IdentityContext, MechanismOutcome, NotificationHub, RefreshableContext, RequestAuthenticator,
    SecurityEvent, StaticDeploymentContext, TokenStoreKind,
};
use sessionward_core::{
    AUTHENTICATED_SESSION_ATTRIBUTE, Account, AuthenticatedSession, HttpExchange,
    InMemorySessionManager, Session, SessionAttribute, SessionLogoutRegistry, SessionsConfig,
};

/// Authenticator that logs the caller into a fresh host session.
struct LoginAuthenticator {
    manager: InMemorySessionManager,
    principal: &'static str,
}

impl RequestAuthenticator for LoginAuthenticator {
    fn authenticate(&mut self, exchange: &mut HttpExchange) -> AuthOutcome {
        let session = self.manager.create_session(Some(&*exchange));
        session.set_attribute(
            AUTHENTICATED_SESSION_ATTRIBUTE,
            SessionAttribute::AuthenticatedSession(AuthenticatedSession::new(
                Account::new(self.principal),
                "OIDC",
            )),
        );
        let cookie = HeaderValue::from_str(&format!("SESSIONID={}", session.id()))
            .expect("valid cookie");
        exchange.request_headers_mut().insert("cookie", cookie);
        AuthOutcome::Authenticated
    }

    fn challenge(&self) -> Option<Arc<dyn AuthChallenge>> {
        None
    }
}

struct LoginRedirect;

impl AuthChallenge for LoginRedirect {
    fn challenge(&self, exchange: &mut HttpExchange) -> bool {
        exchange.set_status(StatusCode::FOUND);
        exchange
            .response_headers_mut()
            .insert("location", HeaderValue::from_static("/realms/master/login"));
        true
    }
}

struct AnonymousAuthenticator;

impl RequestAuthenticator for AnonymousAuthenticator {
    fn authenticate(&mut self, _exchange: &mut HttpExchange) -> AuthOutcome {
        AuthOutcome::NotAttempted
    }

    fn challenge(&self) -> Option<Arc<dyn AuthChallenge>> {
        Some(Arc::new(LoginRedirect))
    }
}

#[derive(Default)]
struct OidcIdentity {
    logouts: AtomicUsize,
}

impl IdentityContext for OidcIdentity {
    fn principal(&self) -> &str {
        "alice"
    }

    fn as_refreshable(&self) -> Option<&dyn RefreshableContext> {
        Some(self as &dyn RefreshableContext)
    }
}

impl RefreshableContext for OidcIdentity {
    fn logout(&self, _deployment: &Deployment) -> Result<(), AdapterError> {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn mechanism(
    manager: &InMemorySessionManager,
    deployment: Deployment,
) -> IdentityAuthMechanism {
    let registry = Arc::new(SessionLogoutRegistry::from_config(&SessionsConfig::default()));
    IdentityAuthMechanism::new(
        Arc::new(StaticDeploymentContext::new(deployment)),
        registry,
        Arc::new(manager.clone()),
    )
}

#[test]
fn host_logout_ends_identity_and_host_session() {
    let manager = InMemorySessionManager::new();
    let mechanism = mechanism(&manager, Deployment::default());
    let hub = NotificationHub::new();

    let bystander = manager.create_session(None);

    let mut exchange = HttpExchange::default();
    let identity = Arc::new(OidcIdentity::default());
    exchange
        .extensions_mut()
        .insert(IdentityAttachment(identity.clone()));
    let mut authenticator = LoginAuthenticator {
        manager: manager.clone(),
        principal: "alice",
    };

    let outcome = mechanism.authenticate(&mut exchange, &hub, &mut authenticator);
    assert_eq!(outcome, MechanismOutcome::Authenticated);
    assert!(mechanism.registry().is_attached());
    assert_eq!(manager.len(), 2);

    hub.notify(SecurityEvent::LoggedOut, &mut exchange);

    assert_eq!(identity.logouts.load(Ordering::SeqCst), 1);
    assert_eq!(manager.len(), 1);
    assert!(!bystander.is_invalidated());
}

#[test]
fn admin_forced_logout_sweeps_every_login() {
    let manager = InMemorySessionManager::new();
    let mechanism = mechanism(&manager, Deployment::default());

    for principal in ["alice", "bob", "carol"] {
        // Each request gets its own security context.
        let hub = NotificationHub::new();
        let mut authenticator = LoginAuthenticator {
            manager: manager.clone(),
            principal,
        };
        let outcome =
            mechanism.authenticate(&mut HttpExchange::default(), &hub, &mut authenticator);
        assert_eq!(outcome, MechanismOutcome::Authenticated);
        assert_eq!(hub.receiver_count(), 1);
    }
    assert_eq!(manager.len(), 3);

    let summary = mechanism.registry().logout_all(&manager);
    assert_eq!(summary.invalidated.len(), 3);
    assert!(summary.is_complete());
    assert!(manager.is_empty());

    // Second sweep finds nothing left to do.
    let summary = mechanism.registry().logout_all(&manager);
    assert_eq!(summary.attempted(), 0);
}

#[test]
fn cookie_deployment_clears_state_cookie_on_logout() {
    let manager = InMemorySessionManager::new();
    let deployment = Deployment {
        token_store: TokenStoreKind::Cookie,
        ..Deployment::default()
    };
    let mechanism = mechanism(&manager, deployment);
    let hub = NotificationHub::new();

    let mut exchange = HttpExchange::default();
    let mut authenticator = LoginAuthenticator {
        manager: manager.clone(),
        principal: "dave",
    };
    mechanism.authenticate(&mut exchange, &hub, &mut authenticator);
    assert!(!mechanism.registry().is_attached());

    hub.notify(SecurityEvent::LoggedOut, &mut exchange);

    let set_cookie = exchange
        .response_headers()
        .get(SET_COOKIE)
        .expect("state cookie cleared");
    assert!(
        set_cookie
            .to_str()
            .expect("ascii cookie")
            .contains("Max-Age=0")
    );
    // The host session is left to the host.
    assert_eq!(manager.len(), 1);
}

#[test]
fn unauthenticated_request_gets_login_redirect() {
    let manager = InMemorySessionManager::new();
    let mechanism = mechanism(&manager, Deployment::default());
    let hub = NotificationHub::new();
    let mut exchange = HttpExchange::default();

    let outcome = mechanism.authenticate(&mut exchange, &hub, &mut AnonymousAuthenticator);
    assert_eq!(outcome, MechanismOutcome::NotAttempted);
    assert!(!mechanism.registry().is_attached());

    let result = mechanism.send_challenge(&mut exchange);
    assert!(result.sent);
    assert_eq!(result.status, Some(StatusCode::FOUND));
    assert_eq!(
        exchange.response_headers().get("location"),
        Some(&HeaderValue::from_static("/realms/master/login"))
    );
}
