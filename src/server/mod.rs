//! Server module
//!
//! TCP front end for the credential store.

pub mod core;

pub use self::core::{Server, load_credentials, run};

#[cfg(unix)]
pub use self::core::spawn_reload_on_hangup;
