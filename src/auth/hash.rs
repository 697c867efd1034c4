//! Password hash verification

use log::debug;

/// Compares a presented password against a stored one-way hash.
pub trait HashVerifier: Send + Sync {
    /// Returns true if `password` hashes to `stored`. A stored value that is
    /// not a recognizable hash simply fails verification.
    fn verify(&self, password: &str, stored: &str) -> bool;
}

/// bcrypt-backed verifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct BcryptVerifier;

impl HashVerifier for BcryptVerifier {
    fn verify(&self, password: &str, stored: &str) -> bool {
        // bcrypt only reads 72 bytes; longer candidates are refused outright.
        match bcrypt::non_truncating_verify(password, stored) {
            Ok(matched) => matched,
            Err(e) => {
                debug!("bcrypt verification rejected: {}", e);
                false
            }
        }
    }
}
