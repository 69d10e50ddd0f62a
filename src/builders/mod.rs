//! Builders
//!
//! Fluent builder for the Artsy client configuration.

pub mod config;

pub use config::{artsy_config, ArtsyConfigBuilder};
