//! Utility modules
//!
//! Logging setup shared by the binary and tests.

pub mod logging;

pub use logging::setup_logging;
