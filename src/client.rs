//! Artsy Client
//!
//! Authenticated dispatcher for catalog endpoints. Every request for an
//! endpoint that needs a token first goes through the shared
//! [`TokenLifecycle`], then is resolved, sent with the `X-Xapp-Token` header,
//! and decoded into the caller's result type.

use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::core::{
    EnvironmentSwitch, HttpTransport, ReqwestHttpTransport, DEFAULT_MAX_RESPONSE_SIZE,
};
use crate::endpoint::{Coordinates, Endpoint, EndpointRegistry};
use crate::error::{create_error_from_response, ArtsyError, ArtsyResult, DecodingError};
use crate::token::{
    credential_parameters, DefaultsStore, TokenLifecycle, TokenState, TokenStore, XAppExchange,
};
use crate::types::{AccessToken, ArtsyConfig, Artwork, Image, Show, XAppTokenResponse};

/// Artsy API client.
///
/// Cheap to clone; clones share the token manager, transport and
/// environment flag.
#[derive(Clone)]
pub struct ArtsyClient {
    config: ArtsyConfig,
    registry: EndpointRegistry,
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<TokenLifecycle>,
}

impl ArtsyClient {
    /// Create a client backed by reqwest, persisting the token in `defaults`.
    pub fn new(config: ArtsyConfig, defaults: Arc<dyn DefaultsStore>) -> ArtsyResult<Self> {
        let transport = Arc::new(ReqwestHttpTransport::with_options(
            &config.user_agent,
            config.timeout,
            DEFAULT_MAX_RESPONSE_SIZE,
        )?);
        Ok(Self::with_transport(config, transport, defaults))
    }

    /// Create a client over a custom transport.
    ///
    /// The token exchange goes through the same transport.
    pub fn with_transport(
        config: ArtsyConfig,
        transport: Arc<dyn HttpTransport>,
        defaults: Arc<dyn DefaultsStore>,
    ) -> Self {
        let exchange = Arc::new(XAppExchange::new(
            EndpointRegistry::from_config(&config),
            config.credentials.clone(),
            transport.clone(),
            config.timeout,
        ));
        let tokens = Arc::new(TokenLifecycle::new(TokenStore::new(defaults), exchange));
        Self::with_components(config, transport, tokens)
    }

    /// Create a client with custom components.
    pub fn with_components(
        config: ArtsyConfig,
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<TokenLifecycle>,
    ) -> Self {
        Self {
            registry: EndpointRegistry::from_config(&config),
            config,
            transport,
            tokens,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ArtsyConfig {
        &self.config
    }

    /// Environment flag; switching it affects requests resolved afterwards.
    pub fn environment(&self) -> &EnvironmentSwitch {
        self.registry.environment()
    }

    /// Shared token manager.
    pub fn tokens(&self) -> &Arc<TokenLifecycle> {
        &self.tokens
    }

    pub fn token_state(&self) -> TokenState {
        self.tokens.state()
    }

    /// Execute `endpoint` and decode the body as `T`.
    ///
    /// Yields exactly one result. No retries happen here; a 401 or 403
    /// discards the token that was sent so the next request refreshes.
    pub async fn execute<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> ArtsyResult<T> {
        endpoint.validate()?;

        let token = if endpoint.requires_auth() {
            Some(self.tokens.ensure_valid().await?)
        } else {
            None
        };

        let mut resolved = self.registry.resolve(endpoint)?;
        if !resolved.requires_auth {
            resolved = resolved.with_overrides(&credential_parameters(&self.config.credentials));
        }

        let request = resolved.to_http_request(
            token.as_ref().map(AccessToken::secret),
            self.config.timeout,
        )?;

        debug!(
            endpoint = endpoint.name(),
            method = resolved.method.as_str(),
            path = %resolved.path,
            "Dispatching request"
        );

        let response = self.transport.send(request).await?;

        if !response.is_success() {
            let error = create_error_from_response(
                response.status,
                &response.body,
                response.retry_after(),
            );
            warn!(
                endpoint = endpoint.name(),
                status = response.status,
                code = error.error_code(),
                "Request failed"
            );
            if let Some(sent) = token.as_ref().filter(|_| error.needs_reauth()) {
                self.tokens.invalidate_if_current(sent);
            }
            return Err(error);
        }

        debug!(endpoint = endpoint.name(), status = response.status, "Request succeeded");

        serde_json::from_str(&response.body).map_err(|e| {
            DecodingError::InvalidJson {
                target: std::any::type_name::<T>(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Start `endpoint` on its own task.
    ///
    /// The returned handle can be awaited or cancelled independently of other
    /// requests. Cancelling it never cancels a token refresh that other
    /// requests are waiting on.
    pub fn request<T>(&self, endpoint: Endpoint) -> RequestHandle<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.clone();
        RequestHandle {
            task: tokio::spawn(async move { client.execute(&endpoint).await }),
        }
    }

    // ========== Typed Endpoints ==========

    /// Exchange the client credentials for a token without touching the
    /// managed token.
    pub async fn xapp_token(&self) -> ArtsyResult<XAppTokenResponse> {
        self.execute(&Endpoint::XApp).await
    }

    pub async fn show(&self, show_id: impl Into<String>) -> ArtsyResult<Show> {
        self.execute(&Endpoint::ShowInfo {
            show_id: show_id.into(),
        })
        .await
    }

    /// Shows open now near `near`, ending soonest first.
    pub async fn running_shows_near(
        &self,
        page: u32,
        amount: u32,
        near: Option<Coordinates>,
    ) -> ArtsyResult<Vec<Show>> {
        self.execute(&Endpoint::RunningShowsNearLocation { page, amount, near })
            .await
    }

    /// Shows opening soon near `near`.
    pub async fn upcoming_shows_near(
        &self,
        page: u32,
        amount: u32,
        near: Option<Coordinates>,
    ) -> ArtsyResult<Vec<Show>> {
        self.execute(&Endpoint::UpcomingShowsNearLocation { page, amount, near })
            .await
    }

    /// Closed shows near `near`, most recently ended first.
    pub async fn past_shows_near(
        &self,
        page: u32,
        amount: u32,
        near: Option<Coordinates>,
    ) -> ArtsyResult<Vec<Show>> {
        self.execute(&Endpoint::PastShowsNearLocation { page, amount, near })
            .await
    }

    pub async fn artworks_for_show(
        &self,
        partner_id: impl Into<String>,
        show_id: impl Into<String>,
        page: u32,
    ) -> ArtsyResult<Vec<Artwork>> {
        self.execute(&Endpoint::ArtworksForShow {
            partner_id: partner_id.into(),
            show_id: show_id.into(),
            page,
        })
        .await
    }

    /// Installation shots of a show.
    pub async fn images_for_show(
        &self,
        show_id: impl Into<String>,
        page: u32,
    ) -> ArtsyResult<Vec<Image>> {
        self.execute(&Endpoint::ImagesForShow {
            show_id: show_id.into(),
            page,
        })
        .await
    }

    pub async fn featured_shows(&self) -> ArtsyResult<Vec<Show>> {
        self.execute(&Endpoint::FeaturedShows).await
    }
}

impl std::fmt::Debug for ArtsyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtsyClient")
            .field("environment", &self.environment().current())
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

/// Handle to a request running on its own task.
///
/// Dropping the handle detaches the request; use [`RequestHandle::cancel`]
/// to stop it.
pub struct RequestHandle<T> {
    task: JoinHandle<ArtsyResult<T>>,
}

impl<T> RequestHandle<T> {
    /// Abort the request. Awaiting the handle then yields
    /// [`ArtsyError::Cancelled`] unless it had already finished.
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl<T> Future for RequestHandle<T> {
    type Output = ArtsyResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.task).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(e)) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Poll::Ready(Err(_)) => Poll::Ready(Err(ArtsyError::Cancelled)),
        }
    }
}
