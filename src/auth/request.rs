//! Request adapter
//!
//! The only seam between the store and whatever transport carries
//! credentials.

/// Anything able to yield basic-auth style credentials.
pub trait BasicAuther {
    /// Returns `(username, password)`, or `None` when the request carries no
    /// credentials at all.
    fn basic_auth(&self) -> Option<(&str, &str)>;
}

/// Owned username/password pair, as parsed from a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: Option<String>,
    pub password: String,
}

impl BasicCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: password.into(),
        }
    }

    /// Credentials for a request that carried none.
    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl BasicAuther for BasicCredentials {
    fn basic_auth(&self) -> Option<(&str, &str)> {
        self.username
            .as_deref()
            .map(|username| (username, self.password.as_str()))
    }
}
