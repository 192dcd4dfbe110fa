//! # sessionward-core
//!
//! Host session contracts and the forced-logout registry for sessionward.
//!
//! This crate provides:
//! - The contracts a host web server exposes for its session layer
//!   ([`SessionManager`], [`Session`], [`SessionConfig`], [`SessionListener`])
//! - The [`SessionLogoutRegistry`], which attaches to a host session manager
//!   and invalidates one, several, or all sessions on request
//! - An [`InMemorySessionManager`] reference host implementation
//!
//! ## Overview
//!
//! The registry never owns sessions. It holds a single registration flag and
//! performs every mutation through the host manager's own API, so forced logout
//! is a best-effort sweep: failures are logged and the sweep continues.
//!
//! ## Modules
//!
//! - [`config`] - Session lookup configuration
//! - [`error`] - Session error types
//! - [`exchange`] - The HTTP exchange handed through the security pipeline
//! - [`session`] - Sessions and their attributes
//! - [`manager`] - Host session manager and lookup shim
//! - [`listener`] - Session lifecycle listener
//! - [`registry`] - Forced-logout registry
//! - [`memory`] - In-memory host session manager

pub mod config;
pub mod error;
pub mod exchange;
pub mod listener;
pub mod manager;
pub mod memory;
pub mod registry;
pub mod session;

pub use config::{SessionLookupMode, SessionsConfig};
pub use error::SessionError;
pub use exchange::HttpExchange;
pub use listener::{SessionDestroyedReason, SessionListener};
pub use manager::{FixedSessionId, SessionConfig, SessionCookieSource, SessionManager};
pub use memory::{InMemorySession, InMemorySessionManager};
pub use registry::{LogoutSummary, SessionLogoutRegistry};
pub use session::{
    AUTHENTICATED_SESSION_ATTRIBUTE, Account, AuthenticatedSession, Session, SessionAttribute,
};

/// Type alias for session operation results.
pub type SessionResult<T> = Result<T, SessionError>;
