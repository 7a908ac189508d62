//! Server configuration from the environment.

use std::env;
use std::net::SocketAddr;

use yggforge_session::{AuthorityConfig, MemoryAuthority};

use crate::YggforgeError;

/// Environment variable holding the listen address.
pub const BIND_VAR: &str = "YGGFORGE_BIND";
/// Environment variable holding the `preferredLanguage` user property.
pub const LANGUAGE_VAR: &str = "YGGFORGE_LANGUAGE";

const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Settings for a Yggforge server process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub bind_addr: SocketAddr,
    /// Value of the `preferredLanguage` property in user info.
    pub preferred_language: String,
}

impl ServerConfig {
    /// Loads settings from `YGGFORGE_BIND` and `YGGFORGE_LANGUAGE`,
    /// falling back to the defaults for unset variables.
    ///
    /// # Errors
    /// [`YggforgeError::Config`] if `YGGFORGE_BIND` isn't a socket address.
    pub fn from_env() -> Result<Self, YggforgeError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, YggforgeError> {
        let bind = lookup(BIND_VAR).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind.parse().map_err(|e| {
            YggforgeError::Config(format!("{BIND_VAR}={bind:?}: {e}"))
        })?;

        let preferred_language = lookup(LANGUAGE_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| AuthorityConfig::default().preferred_language);

        Ok(Self {
            bind_addr,
            preferred_language,
        })
    }

    /// The authority settings carried by this config.
    pub fn authority_config(&self) -> AuthorityConfig {
        AuthorityConfig {
            preferred_language: self.preferred_language.clone(),
        }
    }

    /// An empty in-memory authority configured from these settings.
    pub fn memory_authority(&self) -> MemoryAuthority {
        MemoryAuthority::new(self.authority_config())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            preferred_language: AuthorityConfig::default().preferred_language,
        }
    }
}
