//! Credential store
//!
//! Holds the username → password and username → permissions tables and
//! answers authentication and authorization queries against them. Every
//! query is total: unknown users, wrong passwords and missing permissions
//! all come back as `false`.

use super::cache::HashCache;
use super::credentials::{Credential, parse_credentials};
use super::hash::{BcryptVerifier, HashVerifier};
use super::perms::{ALL_USERS, PERM_ALL};
use super::request::BasicAuther;
use crate::error::LoadError;
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Authentication and authorization data for all users.
pub struct CredentialsStore {
    passwords: HashMap<String, String>,
    perms: HashMap<String, HashSet<String>>,
    use_cache: bool,
    hash_cache: HashCache,
    verifier: Box<dyn HashVerifier>,
}

impl fmt::Debug for CredentialsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Stored passwords stay out of debug output.
        f.debug_struct("CredentialsStore")
            .field("users", &self.passwords.len())
            .field("use_cache", &self.use_cache)
            .finish_non_exhaustive()
    }
}

impl Default for CredentialsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialsStore {
    /// Empty store with the hash cache enabled and bcrypt verification.
    pub fn new() -> Self {
        Self {
            passwords: HashMap::new(),
            perms: HashMap::new(),
            use_cache: true,
            hash_cache: HashCache::new(),
            verifier: Box::new(BcryptVerifier),
        }
    }

    /// Builds a store from already-decoded records. Later records with the
    /// same username replace earlier ones.
    pub fn from_credentials<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Credential>,
    {
        let mut store = Self::new();
        store.install(records);
        store
    }

    /// Builds a store from a JSON credentials stream.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let mut store = Self::new();
        store.load(reader)?;
        Ok(store)
    }

    /// Builds a store from a JSON credentials file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let store = Self::from_reader(BufReader::new(file))?;
        info!(
            "Loaded {} credential(s) from {}",
            store.len(),
            path.display()
        );
        Ok(store)
    }

    /// Merges records from a JSON stream into this store. The stream is
    /// decoded in full first; on error the store is left untouched.
    pub fn load<R: Read>(&mut self, reader: R) -> Result<(), LoadError> {
        let records = parse_credentials(reader)?;
        self.install(records);
        Ok(())
    }

    fn install<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = Credential>,
    {
        for cred in records {
            self.perms
                .insert(cred.username.clone(), cred.perms.into_iter().collect());
            self.passwords.insert(cred.username, cred.password);
        }
    }

    /// Replaces the hash verifier.
    pub fn with_verifier<V: HashVerifier + 'static>(mut self, verifier: V) -> Self {
        self.verifier = Box::new(verifier);
        self
    }

    /// Enables or disables consulting the hash cache. Successful hash
    /// comparisons are recorded either way.
    pub fn set_use_cache(&mut self, use_cache: bool) {
        self.use_cache = use_cache;
    }

    pub fn use_cache(&self) -> bool {
        self.use_cache
    }

    /// Number of loaded identities, the wildcard included.
    pub fn len(&self) -> usize {
        self.passwords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passwords.is_empty()
    }

    /// Returns true if `password` is correct for `username`.
    ///
    /// Plaintext equality is tried first, then the cache of values that
    /// already passed a hash comparison, and finally the hash comparison
    /// itself. A cache miss always falls through to the comparison.
    pub fn check(&self, username: &str, password: &str) -> bool {
        let Some(stored) = self.passwords.get(username) else {
            return false;
        };

        if password == stored {
            return true;
        }

        if self.use_cache && self.hash_cache.check(username, password) {
            debug!("Hash cache hit for user {}", username);
            return true;
        }

        if !self.verifier.verify(password, stored) {
            return false;
        }

        self.hash_cache.store(username, password);
        true
    }

    /// Raw stored value for `username`, no verification.
    pub fn password(&self, username: &str) -> Option<&str> {
        self.passwords.get(username).map(String::as_str)
    }

    /// Returns true if `username` holds `perm`, directly or through the
    /// wildcard identity. Holding [`PERM_ALL`] satisfies any `perm`. No
    /// password checking is done.
    pub fn has_perm(&self, username: &str, perm: &str) -> bool {
        self.grants(username, perm) || self.grants(ALL_USERS, perm)
    }

    fn grants(&self, username: &str, perm: &str) -> bool {
        self.perms
            .get(username)
            .is_some_and(|set| set.contains(perm) || set.contains(PERM_ALL))
    }

    /// Returns true if `username` holds at least one of `perms`.
    pub fn has_any_perm(&self, username: &str, perms: &[&str]) -> bool {
        perms.iter().any(|perm| self.has_perm(username, perm))
    }

    /// Authenticates `username`/`password` and checks it holds `perm`.
    ///
    /// If the wildcard identity already holds `perm`, no authentication is
    /// performed at all and anonymous callers are let through.
    pub fn aa(&self, username: &str, password: &str, perm: &str) -> bool {
        if self.grants(ALL_USERS, perm) {
            return true;
        }

        if username.is_empty() {
            debug!("Denied {}: no username supplied", perm);
            return false;
        }

        if !self.check(username, password) {
            debug!("Denied {}: bad credentials for user {}", perm, username);
            return false;
        }

        let allowed = self.has_perm(username, perm);
        if !allowed {
            debug!("Denied {}: user {} lacks permission", perm, username);
        }
        allowed
    }

    /// Returns true if `request` carries a valid username and password.
    pub fn check_request(&self, request: &dyn BasicAuther) -> bool {
        match request.basic_auth() {
            Some((username, password)) => self.check(username, password),
            None => false,
        }
    }

    /// Returns true if the username carried by `request` holds `perm`. The
    /// password is not checked, but a request without credentials is denied.
    pub fn has_perm_request(&self, request: &dyn BasicAuther, perm: &str) -> bool {
        match request.basic_auth() {
            Some((username, _)) => self.has_perm(username, perm),
            None => false,
        }
    }

    /// Composite gate fed from a request. Missing credentials are treated as
    /// an anonymous caller.
    pub fn aa_request(&self, request: &dyn BasicAuther, perm: &str) -> bool {
        let (username, password) = request.basic_auth().unwrap_or(("", ""));
        self.aa(username, password, perm)
    }
}

/// Composite gate over an optional store. No store means authorization is
/// not configured, and everything is allowed.
pub fn authenticate_and_authorize(
    store: Option<&CredentialsStore>,
    username: &str,
    password: &str,
    perm: &str,
) -> bool {
    match store {
        None => true,
        Some(store) => store.aa(username, password, perm),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::perms::{PERM_EXECUTE, PERM_QUERY, PERM_REMOVE, PERM_STATUS};
    use crate::auth::request::BasicCredentials;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Verifier that accepts a fixed password and counts its calls. It can
    /// be switched off to prove a later success came from the cache.
    #[derive(Clone)]
    struct CountingVerifier {
        accept: &'static str,
        calls: Arc<AtomicUsize>,
        enabled: Arc<AtomicBool>,
    }

    impl CountingVerifier {
        fn new(accept: &'static str) -> Self {
            Self {
                accept,
                calls: Arc::new(AtomicUsize::new(0)),
                enabled: Arc::new(AtomicBool::new(true)),
            }
        }
    }

    impl HashVerifier for CountingVerifier {
        fn verify(&self, password: &str, _stored: &str) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.enabled.load(Ordering::SeqCst) && password == self.accept
        }
    }

    fn alice_store() -> CredentialsStore {
        CredentialsStore::from_credentials([Credential::new("alice", "secret", [PERM_QUERY])])
    }

    #[test]
    fn test_check_plaintext() {
        let store = alice_store();
        assert!(store.check("alice", "secret"));
        assert!(!store.check("alice", "wrong"));
        assert!(!store.check("alice", ""));
        assert!(!store.check("mallory", "secret"));
    }

    #[test]
    fn test_check_bcrypt_hash() {
        let hashed = bcrypt::hash("pw", 4).unwrap();
        let store = CredentialsStore::from_credentials([Credential::new("bob", hashed, [PERM_ALL])]);
        assert!(store.check("bob", "pw"));
        assert!(store.check("bob", "pw"));
        assert!(!store.check("bob", "pw2"));
    }

    #[test]
    fn test_check_denies_overlong_password_with_shared_prefix() {
        let prefix = "a".repeat(72);
        let hashed = bcrypt::hash(format!("{prefix}REALSUFFIX"), 4).unwrap();
        let store = CredentialsStore::from_credentials([Credential::new("bob", hashed, [PERM_ALL])]);

        let wrong = format!("{prefix}attacker-garbage");
        assert!(!store.check("bob", &wrong));
        assert!(!store.hash_cache.check("bob", &wrong));
        assert!(!store.aa("bob", &wrong, PERM_REMOVE));
    }

    #[test]
    fn test_check_uses_cache_after_hash_success() {
        let verifier = CountingVerifier::new("pw");
        let store = CredentialsStore::from_credentials([Credential::new("bob", "$hash", [PERM_ALL])])
            .with_verifier(verifier.clone());

        assert!(store.check("bob", "pw"));
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 1);

        verifier.enabled.store(false, Ordering::SeqCst);
        assert!(store.check("bob", "pw"));
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cache_miss_falls_through_to_verifier() {
        let verifier = CountingVerifier::new("pw");
        let store = CredentialsStore::from_credentials([Credential::new("bob", "$hash", [PERM_ALL])])
            .with_verifier(verifier.clone());

        assert!(!store.check("bob", "nope"));
        assert!(!store.check("bob", "nope"));
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cache_disabled_always_verifies() {
        let verifier = CountingVerifier::new("pw");
        let mut store =
            CredentialsStore::from_credentials([Credential::new("bob", "$hash", [PERM_ALL])])
                .with_verifier(verifier.clone());
        store.set_use_cache(false);
        assert!(!store.use_cache());

        assert!(store.check("bob", "pw"));
        assert!(store.check("bob", "pw"));
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cached_value_is_per_user() {
        let verifier = CountingVerifier::new("pw");
        let store = CredentialsStore::from_credentials([
            Credential::new("bob", "$hash", [PERM_ALL]),
            Credential::new("carol", "other", [PERM_ALL]),
        ])
        .with_verifier(verifier.clone());

        assert!(store.check("bob", "pw"));
        verifier.enabled.store(false, Ordering::SeqCst);
        assert!(!store.check("carol", "pw"));
    }

    #[test]
    fn test_password_lookup() {
        let store = alice_store();
        assert_eq!(store.password("alice"), Some("secret"));
        assert_eq!(store.password("bob"), None);
    }

    #[test]
    fn test_has_perm_direct_and_wildcard() {
        let store = CredentialsStore::from_credentials([
            Credential::new("alice", "secret", [PERM_QUERY]),
            Credential::new(ALL_USERS, "", [PERM_STATUS]),
        ]);
        assert!(store.has_perm("alice", PERM_QUERY));
        assert!(store.has_perm("alice", PERM_STATUS));
        assert!(!store.has_perm("alice", PERM_REMOVE));
        assert!(store.has_perm("nobody", PERM_STATUS));
        assert!(!store.has_perm("nobody", PERM_QUERY));
    }

    #[test]
    fn test_has_perm_all_sentinel() {
        let store = CredentialsStore::from_credentials([Credential::new("root", "pw", [PERM_ALL])]);
        assert!(store.has_perm("root", PERM_REMOVE));
        assert!(store.has_any_perm("root", &[PERM_REMOVE, PERM_EXECUTE]));
        assert!(!store.has_perm("other", PERM_REMOVE));
    }

    #[test]
    fn test_has_any_perm() {
        let store = alice_store();
        assert!(store.has_any_perm("alice", &[PERM_REMOVE, PERM_QUERY]));
        assert!(!store.has_any_perm("alice", &[PERM_REMOVE, PERM_EXECUTE]));
        assert!(!store.has_any_perm("alice", &[]));
    }

    #[test]
    fn test_aa_disabled_store_allows_everything() {
        assert!(authenticate_and_authorize(None, "", "", PERM_REMOVE));
        assert!(authenticate_and_authorize(None, "x", "y", "anything"));
    }

    #[test]
    fn test_aa_configured_store() {
        let store = alice_store();
        assert!(authenticate_and_authorize(Some(&store), "alice", "secret", PERM_QUERY));
        assert!(!authenticate_and_authorize(Some(&store), "alice", "wrong", PERM_QUERY));
        assert!(!authenticate_and_authorize(Some(&store), "alice", "secret", PERM_REMOVE));
        assert!(!authenticate_and_authorize(Some(&store), "", "", PERM_QUERY));
    }

    #[test]
    fn test_aa_wildcard_skips_authentication() {
        let verifier = CountingVerifier::new("never");
        let store = CredentialsStore::from_credentials([Credential::new(ALL_USERS, "", [PERM_STATUS])])
            .with_verifier(verifier.clone());
        assert!(store.aa("", "", PERM_STATUS));
        assert!(store.aa("ghost", "whatever", PERM_STATUS));
        assert!(!store.aa("", "", PERM_REMOVE));
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_aa_wildcard_all_opens_everything() {
        let store = CredentialsStore::from_credentials([Credential::new(ALL_USERS, "", [PERM_ALL])]);
        assert!(store.aa("", "", PERM_REMOVE));
        assert!(store.aa("", "", "custom-capability"));
    }

    #[test]
    fn test_aa_empty_username_denied_without_wildcard() {
        let store = CredentialsStore::from_credentials([Credential::new("", "", [PERM_ALL])]);
        assert!(!store.aa("", "", PERM_QUERY));
    }

    #[test]
    fn test_empty_store_denies() {
        let store = CredentialsStore::new();
        assert!(store.is_empty());
        assert!(!store.check("", ""));
        assert!(!store.check("alice", "secret"));
        assert!(!store.has_perm("alice", PERM_QUERY));
        assert!(!store.has_perm(ALL_USERS, PERM_QUERY));
        assert!(!store.aa("alice", "secret", PERM_QUERY));
    }

    #[test]
    fn test_last_record_wins() {
        let store = CredentialsStore::from_credentials([
            Credential::new("alice", "first", [PERM_QUERY]),
            Credential::new("alice", "second", [PERM_STATUS]),
        ]);
        assert_eq!(store.len(), 1);
        assert!(!store.check("alice", "first"));
        assert!(store.check("alice", "second"));
        assert!(!store.has_perm("alice", PERM_QUERY));
        assert!(store.has_perm("alice", PERM_STATUS));
    }

    #[test]
    fn test_load_merges_and_is_all_or_nothing() {
        let mut store = alice_store();
        store
            .load(r#"[{"username": "bob", "password": "pw", "perms": ["status"]}]"#.as_bytes())
            .unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.check("alice", "secret"));
        assert!(store.check("bob", "pw"));

        let result = store.load(
            r#"[{"username": "carol", "password": "pw"}, {"username": "#.as_bytes(),
        );
        assert!(result.is_err());
        assert_eq!(store.len(), 2);
        assert!(!store.check("carol", "pw"));
    }

    #[test]
    fn test_request_wrappers() {
        let store = alice_store();
        let good = BasicCredentials::new("alice", "secret");
        let bad = BasicCredentials::new("alice", "wrong");
        let anon = BasicCredentials::anonymous();

        assert!(store.check_request(&good));
        assert!(!store.check_request(&bad));
        assert!(!store.check_request(&anon));

        assert!(store.has_perm_request(&bad, PERM_QUERY));
        assert!(!store.has_perm_request(&anon, PERM_QUERY));

        assert!(store.aa_request(&good, PERM_QUERY));
        assert!(!store.aa_request(&bad, PERM_QUERY));
        assert!(!store.aa_request(&anon, PERM_QUERY));
    }

    #[test]
    fn test_debug_hides_passwords() {
        let output = format!("{:?}", alice_store());
        assert!(!output.contains("secret"));
    }
}
