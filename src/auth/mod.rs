//! Authentication and authorization
//!
//! Credential loading, password verification with a verified-hash cache,
//! and per-user / all-users permission checks.

pub mod cache;
pub mod credentials;
pub mod hash;
pub mod perms;
pub mod request;
pub mod shared;
pub mod store;

pub use cache::HashCache;
pub use credentials::{Credential, parse_credentials};
pub use hash::{BcryptVerifier, HashVerifier};
pub use request::{BasicAuther, BasicCredentials};
pub use shared::SharedCredentials;
pub use store::{CredentialsStore, authenticate_and_authorize};
