//! Artsy Types
//!
//! Configuration, token, and catalog model definitions.

pub mod config;
pub mod models;
pub mod token;

pub use config::*;
pub use models::*;
pub use token::*;
