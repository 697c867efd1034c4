//! Verified hash cache
//!
//! Remembers password values that already passed an expensive hash
//! comparison so the comparison is never repeated for the same user.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

/// Per-user set of values proven to match that user's stored hash.
///
/// Entries are only ever added. Safe to share between threads.
#[derive(Debug, Default)]
pub struct HashCache {
    verified: RwLock<HashMap<String, HashSet<String>>>,
}

impl HashCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `candidate` was previously stored for `username`.
    pub fn check(&self, username: &str, candidate: &str) -> bool {
        let verified = self.verified.read().unwrap_or_else(PoisonError::into_inner);
        verified
            .get(username)
            .is_some_and(|values| values.contains(candidate))
    }

    /// Records `candidate` as verified for `username`.
    pub fn store(&self, username: &str, candidate: &str) {
        let mut verified = self
            .verified
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        verified
            .entry(username.to_string())
            .or_default()
            .insert(candidate.to_string());
    }
}
