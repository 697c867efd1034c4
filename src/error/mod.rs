//! Error handling
//!
//! Defines error types for loading credentials and running the service.

pub mod types;

pub use types::*;
