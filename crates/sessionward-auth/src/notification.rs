//! Security notifications.
//!
//! The host security context announces authentication events to registered
//! receivers. The mechanism uses this to hook identity-provider logout into the
//! host's own logout.

use std::sync::{Arc, RwLock};

use sessionward_core::HttpExchange;

/// Security event kinds announced by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityEvent {
    Authenticated,
    FailedAuthentication,
    LoggedOut,
}

impl SecurityEvent {
    /// Returns the event as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authenticated => "authenticated",
            Self::FailedAuthentication => "failed_authentication",
            Self::LoggedOut => "logged_out",
        }
    }
}

impl std::fmt::Display for SecurityEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A security event together with the exchange it happened on.
pub struct SecurityNotification<'a> {
    pub event: SecurityEvent,
    pub exchange: &'a mut HttpExchange,
}

/// Receives security notifications.
pub trait NotificationReceiver: Send + Sync {
    fn handle_notification(&self, notification: &mut SecurityNotification<'_>);
}

/// Per-request security context of the host.
pub trait SecurityContext: Send + Sync {
    fn register_notification_receiver(&self, receiver: Arc<dyn NotificationReceiver>);
}

/// Security context that fans notifications out to its receivers in
/// registration order.
#[derive(Default)]
pub struct NotificationHub {
    receivers: RwLock<Vec<Arc<dyn NotificationReceiver>>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Announces an event to every registered receiver.
    pub fn notify(&self, event: SecurityEvent, exchange: &mut HttpExchange) {
        let receivers = match self.receivers.read() {
            Ok(receivers) => receivers.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };

        let mut notification = SecurityNotification { event, exchange };
        for receiver in receivers {
            receiver.handle_notification(&mut notification);
        }
    }

    pub fn receiver_count(&self) -> usize {
        match self.receivers.read() {
            Ok(receivers) => receivers.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

impl SecurityContext for NotificationHub {
    fn register_notification_receiver(&self, receiver: Arc<dyn NotificationReceiver>) {
        match self.receivers.write() {
            Ok(mut receivers) => receivers.push(receiver),
            Err(poisoned) => poisoned.into_inner().push(receiver),
        }
    }
}
