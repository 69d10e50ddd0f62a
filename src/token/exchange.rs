//! Credential Exchange
//!
//! Trades the application's client credentials for an X-App token.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use secrecy::ExposeSecret;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::core::HttpTransport;
use crate::endpoint::{Endpoint, EndpointRegistry, ParameterSet};
use crate::error::{parse_error_response, ArtsyError, AuthenticationError};
use crate::types::{AccessToken, ClientCredentials, XAppTokenResponse};

/// Credential exchange interface.
#[async_trait]
pub trait CredentialExchange: Send + Sync {
    /// Obtain a fresh token.
    async fn exchange(&self) -> Result<AccessToken, AuthenticationError>;
}

/// Exchange against the `XApp` endpoint.
///
/// The request never carries an `X-Xapp-Token` header.
pub struct XAppExchange {
    registry: EndpointRegistry,
    credentials: ClientCredentials,
    transport: Arc<dyn HttpTransport>,
    timeout: std::time::Duration,
}

impl XAppExchange {
    pub fn new(
        registry: EndpointRegistry,
        credentials: ClientCredentials,
        transport: Arc<dyn HttpTransport>,
        timeout: std::time::Duration,
    ) -> Self {
        Self {
            registry,
            credentials,
            transport,
            timeout,
        }
    }
}

/// Query parameters that identify the application to the `XApp` endpoint.
pub fn credential_parameters(credentials: &ClientCredentials) -> ParameterSet {
    ParameterSet::new()
        .with("client_id", credentials.client_id.as_str())
        .with(
            "client_secret",
            credentials.client_secret.expose_secret().as_str(),
        )
}

#[async_trait]
impl CredentialExchange for XAppExchange {
    async fn exchange(&self) -> Result<AccessToken, AuthenticationError> {
        let request = self
            .registry
            .resolve(&Endpoint::XApp)
            .and_then(|resolved| {
                resolved
                    .with_overrides(&credential_parameters(&self.credentials))
                    .to_http_request(None, self.timeout)
            })
            .map_err(|e| AuthenticationError::Unreachable {
                message: e.to_string(),
            })?;

        let response = self.transport.send(request).await.map_err(|e| match e {
            ArtsyError::Authentication(inner) => inner,
            other => AuthenticationError::Unreachable {
                message: other.to_string(),
            },
        })?;

        if !response.is_success() {
            let message = parse_error_response(&response.body)
                .and_then(|r| r.message)
                .unwrap_or_else(|| format!("HTTP {}", response.status));
            return Err(AuthenticationError::Rejected {
                status: response.status,
                message,
            });
        }

        let parsed: XAppTokenResponse = serde_json::from_str(&response.body).map_err(|e| {
            AuthenticationError::InvalidTokenResponse {
                message: e.to_string(),
            }
        })?;

        if parsed.token.is_empty() {
            return Err(AuthenticationError::InvalidTokenResponse {
                message: "empty token".to_string(),
            });
        }

        let token = AccessToken::from(parsed);
        if !token.is_valid() {
            return Err(AuthenticationError::InvalidTokenResponse {
                message: format!("token already expired at {}", token.expires_at()),
            });
        }

        debug!(expires_at = %token.expires_at(), "Received X-App token");
        Ok(token)
    }
}

/// Mock credential exchange for testing.
#[derive(Default)]
pub struct MockCredentialExchange {
    calls: AtomicUsize,
    responses: Mutex<VecDeque<Result<AccessToken, AuthenticationError>>>,
    latency: Mutex<Option<std::time::Duration>>,
}

impl MockCredentialExchange {
    /// Create new mock exchange.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a token to return.
    pub fn queue_token(&self, token: AccessToken) -> &Self {
        self.responses.lock().push_back(Ok(token));
        self
    }

    /// Queue a failure.
    pub fn queue_error(&self, error: AuthenticationError) -> &Self {
        self.responses.lock().push_back(Err(error));
        self
    }

    /// Delay every exchange.
    pub fn set_latency(&self, latency: std::time::Duration) -> &Self {
        *self.latency.lock() = Some(latency);
        self
    }

    /// Number of exchanges started.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialExchange for MockCredentialExchange {
    async fn exchange(&self) -> Result<AccessToken, AuthenticationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let queued = self.responses.lock().pop_front();
        queued.unwrap_or_else(|| {
            Ok(AccessToken::new(
                format!("mock-xapp-token-{}", call),
                Utc::now() + Duration::days(7),
            ))
        })
    }
}
