//! Artsy Core Components
//!
//! HTTP transport and environment selection.

pub mod environment;
pub mod transport;

pub use environment::*;
pub use transport::*;
