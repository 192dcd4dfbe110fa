//! Session lookup configuration.
//!
//! Host session managers come in two flavors. Ordinary managers resolve a
//! session directly from its identifier. Distributed (clustered) managers only
//! resolve sessions through a request-scoped lookup abstraction, so the
//! registry has to hand them a synthetic lookup context instead. Which flavor
//! is in use is decided when the deployment is wired, not by inspecting the
//! manager at runtime.
//!
//! # Example (TOML)
//!
//! ```toml
//! [sessions]
//! lookup = "distributed"
//! ```

use serde::{Deserialize, Serialize};

/// How the registry resolves a session identifier through the host manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionLookupMode {
    /// Look sessions up directly by identifier.
    #[default]
    Direct,
    /// Look sessions up through a pass-through [`SessionConfig`] shim.
    ///
    /// [`SessionConfig`]: crate::manager::SessionConfig
    Distributed,
}

impl SessionLookupMode {
    /// Returns the lookup mode as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Distributed => "distributed",
        }
    }
}

impl std::fmt::Display for SessionLookupMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Host session configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionsConfig {
    /// Lookup convention of the host session manager.
    pub lookup: SessionLookupMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_direct() {
        assert_eq!(SessionsConfig::default().lookup, SessionLookupMode::Direct);
    }

    #[test]
    fn test_lookup_mode_deserialization() {
        let config: SessionsConfig = serde_json::from_str(r#"{"lookup": "distributed"}"#).unwrap();
        assert_eq!(config.lookup, SessionLookupMode::Distributed);

        let config: SessionsConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.lookup, SessionLookupMode::Direct);

        assert!(serde_json::from_str::<SessionsConfig>(r#"{"lookup": "sticky"}"#).is_err());
    }

    #[test]
    fn test_lookup_mode_display() {
        assert_eq!(SessionLookupMode::Direct.to_string(), "direct");
        assert_eq!(SessionLookupMode::Distributed.to_string(), "distributed");
    }
}
