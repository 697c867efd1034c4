pub mod auth;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod utils;

pub use auth::{
    BasicAuther, BasicCredentials, Credential, CredentialsStore, SharedCredentials,
    authenticate_and_authorize,
};
pub use config::AppConfig;
pub use error::{LoadError, ServerError};
pub use server::Server;
