//! Credential records
//!
//! Decodes the credentials file: a JSON array of
//! `{"username": ..., "password": ..., "perms": [...]}` objects.

use crate::error::LoadError;
use serde::Deserialize;
use std::io::Read;

/// Authentication and authorization configuration for a single user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Credential {
    pub username: String,
    /// Plaintext or a bcrypt hash.
    pub password: String,
    pub perms: Vec<String>,
}

impl Credential {
    pub fn new<P: Into<String>>(
        username: impl Into<String>,
        password: impl Into<String>,
        perms: impl IntoIterator<Item = P>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            perms: perms.into_iter().map(Into::into).collect(),
        }
    }
}

/// Decodes every record from `reader`. Nothing is returned unless the whole
/// array parses.
pub fn parse_credentials<R: Read>(reader: R) -> Result<Vec<Credential>, LoadError> {
    let records: Vec<Credential> = serde_json::from_reader(reader)?;
    Ok(records)
}
