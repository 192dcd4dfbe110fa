//! In-memory host session manager.
//!
//! A reference [`SessionManager`] for embedding and tests. Sessions live in a
//! [`DashMap`] keyed by identifier; listeners are notified after the map has
//! been updated and outside of any internal lock, so a listener may call back
//! into the manager.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard, Weak};

use dashmap::DashMap;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::SessionResult;
use crate::error::SessionError;
use crate::exchange::HttpExchange;
use crate::listener::{SessionDestroyedReason, SessionListener};
use crate::manager::SessionManager;
use crate::session::{Session, SessionAttribute};

struct Shared {
    sessions: DashMap<String, Arc<InMemorySession>>,
    listeners: RwLock<Vec<Arc<dyn SessionListener>>>,
}

impl Shared {
    fn listeners(&self) -> Vec<Arc<dyn SessionListener>> {
        match self.listeners.read() {
            Ok(listeners) => listeners.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Session manager that keeps every session in process memory.
#[derive(Clone)]
pub struct InMemorySessionManager {
    shared: Arc<Shared>,
}

impl Default for InMemorySessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionManager {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                sessions: DashMap::new(),
                listeners: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Creates a session with a fresh identifier.
    pub fn create_session(&self, exchange: Option<&HttpExchange>) -> Arc<InMemorySession> {
        let session = Arc::new(InMemorySession {
            id: RwLock::new(Uuid::new_v4().to_string()),
            attributes: DashMap::new(),
            invalidated: AtomicBool::new(false),
            shared: Arc::downgrade(&self.shared),
        });
        let session_id = session.id();
        self.shared.sessions.insert(session_id.clone(), Arc::clone(&session));
        trace!(session_id = %session_id, "Session created");

        for listener in self.shared.listeners() {
            listener.session_created(session.as_ref(), exchange);
        }
        session
    }

    /// Looks up a live session with its concrete type.
    pub fn get(&self, session_id: &str) -> Option<Arc<InMemorySession>> {
        self.shared
            .sessions
            .get(session_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Assigns a fresh identifier to a live session and returns it.
    ///
    /// Returns `None` if the session is unknown or already invalidated.
    pub fn change_session_id(&self, session_id: &str) -> Option<String> {
        let session = self.get(session_id)?;
        let new_id = Uuid::new_v4().to_string();
        {
            // The id lock serializes re-keying against `destroy`.
            let mut id = session.id_write();
            if session.is_invalidated() || *id != session_id {
                return None;
            }
            self.shared.sessions.remove(session_id);
            *id = new_id.clone();
            self.shared.sessions.insert(new_id.clone(), Arc::clone(&session));
        }
        debug!(old_session_id = %session_id, session_id = %new_id, "Session id changed");

        for listener in self.shared.listeners() {
            listener.session_id_changed(session.as_ref(), session_id);
        }
        Some(new_id)
    }

    /// Destroys a session on behalf of the host (timeout, undeploy).
    pub fn expire(&self, session_id: &str, reason: SessionDestroyedReason) -> SessionResult<()> {
        let session = self
            .get(session_id)
            .ok_or_else(|| SessionError::not_found(session_id))?;
        session.destroy(None, reason)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.shared.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.sessions.is_empty()
    }
}

impl SessionManager for InMemorySessionManager {
    fn all_sessions(&self) -> HashSet<String> {
        self.shared
            .sessions
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    fn session(&self, session_id: &str) -> Option<Arc<dyn Session>> {
        self.get(session_id).map(|session| session as Arc<dyn Session>)
    }

    fn register_session_listener(&self, listener: Arc<dyn SessionListener>) {
        match self.shared.listeners.write() {
            Ok(mut listeners) => listeners.push(listener),
            Err(poisoned) => poisoned.into_inner().push(listener),
        }
    }
}

/// A session held by an [`InMemorySessionManager`].
pub struct InMemorySession {
    id: RwLock<String>,
    attributes: DashMap<String, SessionAttribute>,
    invalidated: AtomicBool,
    shared: Weak<Shared>,
}

impl InMemorySession {
    fn id_write(&self) -> RwLockWriteGuard<'_, String> {
        self.id.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn listeners(&self) -> Vec<Arc<dyn SessionListener>> {
        self.shared
            .upgrade()
            .map(|shared| shared.listeners())
            .unwrap_or_default()
    }

    /// Sets an attribute and returns the previous value.
    ///
    /// Invalidated sessions are left untouched and return `None`.
    pub fn set_attribute(
        &self,
        name: impl Into<String>,
        value: SessionAttribute,
    ) -> Option<SessionAttribute> {
        if self.is_invalidated() {
            return None;
        }
        let name = name.into();
        let previous = self.attributes.insert(name.clone(), value.clone());

        for listener in self.listeners() {
            match &previous {
                Some(old_value) => listener.attribute_updated(self, &name, &value, old_value),
                None => listener.attribute_added(self, &name, &value),
            }
        }
        previous
    }

    /// Removes an attribute and returns its value.
    pub fn remove_attribute(&self, name: &str) -> Option<SessionAttribute> {
        if self.is_invalidated() {
            return None;
        }
        let (_, old_value) = self.attributes.remove(name)?;

        for listener in self.listeners() {
            listener.attribute_removed(self, name, &old_value);
        }
        Some(old_value)
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidated.load(Ordering::Acquire)
    }

    fn destroy(
        &self,
        exchange: Option<&mut HttpExchange>,
        reason: SessionDestroyedReason,
    ) -> SessionResult<()> {
        let session_id = {
            let id = self.id_write();
            if self.invalidated.swap(true, Ordering::AcqRel) {
                return Err(SessionError::already_invalidated(id.clone()));
            }
            if let Some(shared) = self.shared.upgrade() {
                shared.sessions.remove(id.as_str());
            }
            id.clone()
        };
        debug!(session_id = %session_id, reason = %reason, "Session removed");

        let exchange = exchange.map(|exchange| &*exchange);
        for listener in self.listeners() {
            listener.session_destroyed(self, exchange, reason);
        }
        Ok(())
    }
}

impl Session for InMemorySession {
    fn id(&self) -> String {
        match self.id.read() {
            Ok(id) => id.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn attribute(&self, name: &str) -> Option<SessionAttribute> {
        self.attributes.get(name).map(|entry| entry.value().clone())
    }

    fn invalidate(&self, exchange: Option<&mut HttpExchange>) -> SessionResult<()> {
        self.destroy(exchange, SessionDestroyedReason::Invalidated)
    }
}
