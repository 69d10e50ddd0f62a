//! Token Manager
//!
//! Keeps the X-App token usable: hands out the cached token while it is
//! valid and runs a credential exchange when it is not.
//!
//! # Concurrency
//!
//! At most one exchange is in flight per manager. The exchange runs on its
//! own spawned task and is shared between every caller that needs it, so a
//! caller that gives up waiting does not cancel the refresh for the others.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::AuthenticationError;
use crate::token::{CredentialExchange, TokenStore};
use crate::types::AccessToken;

type RefreshOutcome = Result<AccessToken, AuthenticationError>;
type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

/// Observable lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenState {
    /// The cached token can be used as is.
    Valid,
    /// A refresh is needed before the next authenticated request.
    Invalid,
    /// An exchange is in flight.
    Refreshing,
}

struct Inner {
    token: AccessToken,
    in_flight: Option<SharedRefresh>,
}

/// Owns the in-memory token; the [`TokenStore`] mirrors it to disk.
pub struct TokenLifecycle {
    store: TokenStore,
    exchange: Arc<dyn CredentialExchange>,
    inner: Arc<Mutex<Inner>>,
}

impl TokenLifecycle {
    /// Create a manager seeded from the persisted token.
    pub fn new(store: TokenStore, exchange: Arc<dyn CredentialExchange>) -> Self {
        let token = store.load();
        debug!(valid = token.is_valid(), "Loaded persisted X-App token");

        Self {
            store,
            exchange,
            inner: Arc::new(Mutex::new(Inner {
                token,
                in_flight: None,
            })),
        }
    }

    /// Current state. Expiry is evaluated at call time.
    pub fn state(&self) -> TokenState {
        let inner = self.inner.lock();
        if inner.in_flight.is_some() {
            TokenState::Refreshing
        } else if inner.token.is_valid() {
            TokenState::Valid
        } else {
            TokenState::Invalid
        }
    }

    /// The cached token, valid or not.
    pub fn current_token(&self) -> AccessToken {
        self.inner.lock().token.clone()
    }

    /// Drop the cached token so the next call refreshes.
    ///
    /// The persisted copy is left alone; the next successful refresh
    /// overwrites it.
    pub fn invalidate(&self) {
        let mut inner = self.inner.lock();
        inner.token = AccessToken::empty();
        info!("X-App token invalidated");
    }

    /// Invalidate only if `stale` is still the cached token.
    ///
    /// A request that was rejected with an older token must not discard one
    /// that was refreshed while it was in flight.
    pub fn invalidate_if_current(&self, stale: &AccessToken) -> bool {
        let mut inner = self.inner.lock();
        if inner.token != *stale {
            return false;
        }
        inner.token = AccessToken::empty();
        info!("X-App token rejected by the API; invalidated");
        true
    }

    /// Return a valid token, refreshing first if needed.
    ///
    /// Concurrent callers during a refresh all receive the outcome of the
    /// same exchange. A failed refresh is not retried; the next call starts
    /// a new one.
    pub async fn ensure_valid(&self) -> Result<AccessToken, AuthenticationError> {
        let refresh = {
            let mut inner = self.inner.lock();
            if inner.token.is_valid() {
                return Ok(inner.token.clone());
            }

            match &inner.in_flight {
                Some(refresh) => {
                    debug!("Joining in-flight X-App token refresh");
                    refresh.clone()
                }
                None => {
                    let refresh = self.spawn_refresh();
                    inner.in_flight = Some(refresh.clone());
                    refresh
                }
            }
        };

        refresh.await
    }

    // Must be called with `inner` locked; the task takes the lock to publish
    // its result, so it cannot finish before `in_flight` is set.
    fn spawn_refresh(&self) -> SharedRefresh {
        let exchange = self.exchange.clone();
        let store = self.store.clone();
        let inner = self.inner.clone();

        info!("Refreshing X-App token");
        let task = tokio::spawn(async move {
            let outcome = exchange.exchange().await;

            // Flushing the defaults store does blocking file I/O.
            if let Ok(token) = &outcome {
                let token = token.clone();
                if let Err(e) = tokio::task::spawn_blocking(move || store.save(&token)).await {
                    warn!(error = %e, "X-App token persistence task failed");
                }
            }

            let mut guard = inner.lock();
            guard.in_flight = None;
            match &outcome {
                Ok(token) => {
                    guard.token = token.clone();
                    info!(expires_at = %token.expires_at(), "X-App token refreshed");
                }
                Err(e) => warn!(error = %e, "X-App token refresh failed"),
            }

            outcome
        });

        async move {
            task.await
                .unwrap_or_else(|_| Err(AuthenticationError::RefreshAborted))
        }
        .boxed()
        .shared()
    }
}

impl std::fmt::Debug for TokenLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenLifecycle")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
