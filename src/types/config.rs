//! Configuration Types
//!
//! Client configuration for the Artsy API.

use secrecy::SecretString;
use std::time::Duration;

use crate::core::{Environment, EnvironmentSwitch};

/// Production API host.
pub const PRODUCTION_HOST: &str = "https://api.artsy.net";

/// Staging API host.
pub const STAGING_HOST: &str = "https://stagingapi.artsy.net";

/// Default configuration values.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("artsy-integration/", env!("CARGO_PKG_VERSION"));

/// Artsy client configuration.
#[derive(Clone, Debug)]
pub struct ArtsyConfig {
    /// Application credentials traded for an X-App token.
    pub credentials: ClientCredentials,
    /// Production and staging hosts.
    pub hosts: ApiHosts,
    /// Shared staging/production selector.
    pub environment: EnvironmentSwitch,
    /// HTTP timeout.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl ArtsyConfig {
    /// Base URL for the currently selected environment.
    pub fn base_url(&self) -> &str {
        self.hosts.base_for(self.environment.current())
    }
}

/// Base URLs for each environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiHosts {
    pub production: String,
    pub staging: String,
}

impl ApiHosts {
    /// Create hosts, trimming any trailing slash.
    pub fn new(production: impl Into<String>, staging: impl Into<String>) -> Self {
        Self {
            production: production.into().trim_end_matches('/').to_string(),
            staging: staging.into().trim_end_matches('/').to_string(),
        }
    }

    /// Select the host for an environment.
    pub fn base_for(&self, environment: Environment) -> &str {
        match environment {
            Environment::Production => &self.production,
            Environment::Staging => &self.staging,
        }
    }
}

impl Default for ApiHosts {
    fn default() -> Self {
        Self::new(PRODUCTION_HOST, STAGING_HOST)
    }
}

/// Application client credentials.
#[derive(Clone)]
pub struct ClientCredentials {
    /// Client identifier.
    pub client_id: String,
    /// Client secret.
    pub client_secret: SecretString,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
        }
    }
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}
