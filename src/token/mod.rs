//! Token Management
//!
//! X-App token lifecycle:
//!
//! - **Token Storage**: persistence of the token through a key-value defaults store
//! - **Credential Exchange**: trading client credentials for a fresh token
//! - **Token Manager**: validity checks and single-flight refresh

pub mod exchange;
pub mod manager;
pub mod storage;

// Token Storage
pub use storage::{DefaultsKeys, DefaultsStore, InMemoryDefaults, JsonFileDefaults, TokenStore};

// Credential Exchange
pub use exchange::{
    credential_parameters, CredentialExchange, MockCredentialExchange, XAppExchange,
};

// Token Manager
pub use manager::{TokenLifecycle, TokenState};
