//! Artsy Integration Module
//!
//! Typed access to the Artsy catalog API with transparent X-App token
//! management.
//!
//! # Features
//!
//! - Endpoint registry for shows, artworks, installation images and featured sets
//! - Per-family default query parameters merged with per-call overrides
//! - X-App token persisted to a key-value defaults store
//! - Single-flight token refresh shared by concurrent requests
//! - Runtime switch between production and staging hosts
//!
//! # Example
//!
//! ```rust,ignore
//! use artsy_integration::{artsy_config, ArtsyClient, Coordinates, JsonFileDefaults};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = artsy_config()
//!         .client_id("my-client-id")
//!         .client_secret("my-client-secret")
//!         .build()?;
//!
//!     let defaults = Arc::new(JsonFileDefaults::open("artsy-defaults.json"));
//!     let client = ArtsyClient::new(config, defaults)?;
//!
//!     let shows = client
//!         .running_shows_near(1, 5, Some(Coordinates::new("40.7128", "-74.0060")))
//!         .await?;
//!
//!     for show in shows {
//!         println!("{} at {}", show.name, show.partner.name);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: configuration, token and catalog model types
//! - `error`: error hierarchy and HTTP status mapping
//! - `core`: HTTP transport and environment selection
//! - `endpoint`: endpoint registry and parameter merging
//! - `token`: token persistence, credential exchange and lifecycle
//! - `builders`: fluent configuration builder
//! - `client`: authenticated dispatcher

pub mod builders;
pub mod client;
pub mod core;
pub mod endpoint;
pub mod error;
pub mod token;
pub mod types;

// Re-export main client
pub use client::{ArtsyClient, RequestHandle};

// Re-export builders
pub use builders::{artsy_config, ArtsyConfigBuilder};

// Re-export errors
pub use error::{
    create_error_from_response, parse_error_response, ArtsyError, ArtsyErrorResponse, ArtsyResult,
    AuthenticationError, ConfigurationError, DecodingError, NetworkError, ResponseError,
    StorageError,
};

// Re-export types
pub use types::{
    // Config
    ApiHosts, ArtsyConfig, ClientCredentials, PRODUCTION_HOST, STAGING_HOST,
    // Token
    AccessToken, XAppTokenResponse,
    // Models
    Artist, Artwork, GeoPoint, Image, Location, Partner, Show,
};

// Re-export core components
pub use core::{
    // Transport
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, MockHttpTransport,
    ReqwestHttpTransport,
    // Environment
    Environment, EnvironmentSwitch,
};

// Re-export endpoints
pub use endpoint::{
    merge, Coordinates, Endpoint, EndpointRegistry, ParamValue, ParameterSet, ResolvedRequest,
    ShowStatus, XAPP_TOKEN_HEADER,
};

// Re-export token management
pub use token::{
    // Storage
    DefaultsKeys, DefaultsStore, InMemoryDefaults, JsonFileDefaults, TokenStore,
    // Exchange
    CredentialExchange, MockCredentialExchange, XAppExchange,
    // Manager
    TokenLifecycle, TokenState,
};
