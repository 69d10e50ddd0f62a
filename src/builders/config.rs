//! Configuration Builder
//!
//! Fluent builder for Artsy configuration.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

use crate::core::{Environment, EnvironmentSwitch};
use crate::error::{ArtsyError, ArtsyResult, ConfigurationError};
use crate::types::{
    ApiHosts, ArtsyConfig, ClientCredentials, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
    PRODUCTION_HOST, STAGING_HOST,
};

/// Artsy configuration builder.
#[derive(Default)]
pub struct ArtsyConfigBuilder {
    client_id: Option<String>,
    client_secret: Option<SecretString>,
    production_host: Option<String>,
    staging_host: Option<String>,
    environment: Environment,
    environment_switch: Option<EnvironmentSwitch>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl ArtsyConfigBuilder {
    /// Create new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set client ID.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set client secret.
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(SecretString::new(client_secret.into()));
        self
    }

    /// Target the staging API instead of production.
    pub fn use_staging(mut self, use_staging: bool) -> Self {
        self.environment = if use_staging {
            Environment::Staging
        } else {
            Environment::Production
        };
        self
    }

    /// Set the initial environment.
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Share an existing environment flag instead of creating one.
    ///
    /// Takes precedence over [`use_staging`](Self::use_staging).
    pub fn environment_switch(mut self, switch: EnvironmentSwitch) -> Self {
        self.environment_switch = Some(switch);
        self
    }

    /// Override the production host.
    pub fn production_host(mut self, url: impl Into<String>) -> Self {
        self.production_host = Some(url.into());
        self
    }

    /// Override the staging host.
    pub fn staging_host(mut self, url: impl Into<String>) -> Self {
        self.staging_host = Some(url.into());
        self
    }

    /// Point both environments at one host (local servers, proxies).
    pub fn base_url(self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.production_host(url.clone()).staging_host(url)
    }

    /// Set request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ArtsyResult<ArtsyConfig> {
        let client_id = self
            .client_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| missing("client_id"))?;

        let client_secret = self
            .client_secret
            .filter(|secret| !secret.expose_secret().trim().is_empty())
            .ok_or_else(|| missing("client_secret"))?;

        let production = self
            .production_host
            .unwrap_or_else(|| PRODUCTION_HOST.to_string());
        let staging = self.staging_host.unwrap_or_else(|| STAGING_HOST.to_string());
        validate_host(&production)?;
        validate_host(&staging)?;

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        if timeout.is_zero() {
            return Err(ConfigurationError::InvalidConfig {
                message: "timeout must be greater than zero".to_string(),
            }
            .into());
        }

        let environment = match self.environment_switch {
            Some(switch) => switch,
            None => EnvironmentSwitch::new(self.environment),
        };

        Ok(ArtsyConfig {
            credentials: ClientCredentials {
                client_id,
                client_secret,
            },
            hosts: ApiHosts::new(production, staging),
            environment,
            timeout,
            user_agent: self
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        })
    }
}

fn missing(field: &str) -> ArtsyError {
    ConfigurationError::MissingRequired {
        field: field.to_string(),
    }
    .into()
}

fn validate_host(host: &str) -> ArtsyResult<()> {
    let invalid = || ConfigurationError::InvalidBaseUrl {
        url: host.to_string(),
    };

    let url = Url::parse(host).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid().into());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid().into());
    }
    Ok(())
}

/// Create a new Artsy configuration builder.
pub fn artsy_config() -> ArtsyConfigBuilder {
    ArtsyConfigBuilder::new()
}

impl ArtsyConfig {
    /// Start building a configuration.
    pub fn builder() -> ArtsyConfigBuilder {
        ArtsyConfigBuilder::new()
    }

    /// Create configuration from environment variables.
    ///
    /// Reads `ARTSY_CLIENT_ID`, `ARTSY_CLIENT_SECRET`, `ARTSY_USE_STAGING`
    /// and `ARTSY_TIMEOUT` (seconds).
    pub fn from_env() -> ArtsyResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ArtsyResult<Self> {
        let mut builder = ArtsyConfigBuilder::new();

        if let Some(id) = lookup("ARTSY_CLIENT_ID") {
            builder = builder.client_id(id);
        }
        if let Some(secret) = lookup("ARTSY_CLIENT_SECRET") {
            builder = builder.client_secret(secret);
        }

        if let Some(staging) = lookup("ARTSY_USE_STAGING") {
            let staging = staging.trim().to_ascii_lowercase();
            builder = builder.use_staging(matches!(staging.as_str(), "1" | "true" | "yes"));
        }

        if let Some(timeout) = lookup("ARTSY_TIMEOUT") {
            let secs = timeout
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigurationError::InvalidConfig {
                    message: format!("ARTSY_TIMEOUT is not a number of seconds: {timeout}"),
                })?;
            builder = builder.timeout(Duration::from_secs(secs));
        }

        builder.build()
    }
}
