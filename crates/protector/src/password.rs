//! bcrypt password hashing for credential storage.
//!
//! Independent of the symmetric path: no shared keys, salts, or parameters.
//! Each hash embeds its own random salt and cost, and [`PasswordHasher::verify`]
//! always uses the values embedded in the stored hash.
//!
//! Hashing is deliberately slow, so both operations run on Tokio's blocking
//! pool and only suspend the calling task.

use std::fmt;

use common::ProtectError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::validate::ensure_strong_secret;

/// Work factor used when none is configured.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Lowest cost bcrypt accepts.
pub const MIN_BCRYPT_COST: u32 = 4;

/// Highest cost bcrypt accepts.
pub const MAX_BCRYPT_COST: u32 = 31;

/// Length of a modular-crypt bcrypt string (`$2b$12$` + 22 salt + 31 hash chars).
const ENCODED_LEN: usize = 60;

const PREFIXES: [&str; 4] = ["$2a$", "$2b$", "$2x$", "$2y$"];

/// A self-contained bcrypt hash string, e.g. `$2b$12$<salt><digest>`.
///
/// Compare with [`PasswordHasher::verify`], never with `==` against a fresh hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a stored hash string after checking its shape.
    ///
    /// # Errors
    ///
    /// Returns [`ProtectError::VerificationFailure`] if `encoded` is not a
    /// modular-crypt bcrypt string.
    pub fn parse(encoded: &str) -> Result<Self, ProtectError> {
        let well_formed = encoded.len() == ENCODED_LEN
            && PREFIXES.iter().any(|p| encoded.starts_with(p))
            && parse_cost(encoded).is_some();
        if !well_formed {
            return Err(ProtectError::VerificationFailure(
                "malformed password hash".into(),
            ));
        }
        Ok(Self(encoded.to_owned()))
    }

    /// The encoded hash.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The work factor embedded in the hash.
    pub fn cost(&self) -> Option<u32> {
        parse_cost(&self.0)
    }
}

impl fmt::Display for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn parse_cost(encoded: &str) -> Option<u32> {
    let cost: u32 = encoded.get(4..6)?.parse().ok()?;
    if encoded.get(6..7)? != "$" || !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return None;
    }
    Some(cost)
}

/// Produces and checks bcrypt hashes at a fixed cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// A hasher using `cost`, clamped into bcrypt's accepted range.
    pub fn with_cost(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_BCRYPT_COST, MAX_BCRYPT_COST),
        }
    }

    /// The configured work factor.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash `password` with a fresh random salt.
    ///
    /// Two calls with the same password return different strings.
    ///
    /// # Errors
    ///
    /// - [`ProtectError::WeakSecret`] if `password` is shorter than 8 characters.
    /// - [`ProtectError::HashingFailure`] on an internal bcrypt or worker fault.
    pub async fn hash(&self, password: &str) -> Result<PasswordHash, ProtectError> {
        ensure_strong_secret(password)?;
        let password = Zeroizing::new(password.to_owned());
        let cost = self.cost;

        let encoded = tokio::task::spawn_blocking(move || bcrypt::hash(password.as_bytes(), cost))
            .await
            .map_err(|e| {
                warn!(error = %e, "password hashing worker did not complete");
                ProtectError::HashingFailure
            })?
            .map_err(|_| ProtectError::HashingFailure)?;

        debug!(cost, "password hashed");
        Ok(PasswordHash(encoded))
    }

    /// Check `password` against a stored hash.
    ///
    /// A mismatch is `Ok(false)`. No length minimum is applied here: a short
    /// candidate simply does not match.
    ///
    /// # Errors
    ///
    /// Returns [`ProtectError::VerificationFailure`] if `stored` is malformed
    /// or the worker faults.
    pub async fn verify(&self, password: &str, stored: &str) -> Result<bool, ProtectError> {
        let stored = PasswordHash::parse(stored)?;
        let password = Zeroizing::new(password.to_owned());

        tokio::task::spawn_blocking(move || bcrypt::verify(password.as_bytes(), stored.as_str()))
            .await
            .map_err(|e| {
                warn!(error = %e, "password verification worker did not complete");
                ProtectError::VerificationFailure("internal error".into())
            })?
            .map_err(|_| ProtectError::VerificationFailure("unreadable password hash".into()))
    }

    /// Whether `stored` was produced at a different cost than this hasher's.
    pub fn needs_rehash(&self, stored: &PasswordHash) -> bool {
        stored.cost() != Some(self.cost)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::with_cost(DEFAULT_BCRYPT_COST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> PasswordHasher {
        PasswordHasher::with_cost(MIN_BCRYPT_COST)
    }

    #[tokio::test]
    async fn default_cost_is_embedded() {
        let hasher = PasswordHasher::default();
        let hash = hasher.hash("secret123").await.unwrap();
        assert!(hash.as_str().starts_with("$2b$12$"), "got: {hash}");
        assert_eq!(hash.cost(), Some(12));
        assert!(hasher.verify("secret123", hash.as_str()).await.unwrap());
    }

    #[tokio::test]
    async fn correct_password_verifies() {
        let hash = fast().hash("secret123").await.unwrap();
        assert!(fast().verify("secret123", hash.as_str()).await.unwrap());
    }

    #[tokio::test]
    async fn wrong_password_is_false_not_error() {
        let hash = fast().hash("secret123").await.unwrap();
        assert!(!fast().verify("wrong", hash.as_str()).await.unwrap());
        assert!(!fast().verify("secret124", hash.as_str()).await.unwrap());
        assert!(!fast().verify("", hash.as_str()).await.unwrap());
    }

    #[tokio::test]
    async fn hashes_are_salted() {
        let a = fast().hash("secret123").await.unwrap();
        let b = fast().hash("secret123").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn verify_uses_embedded_cost() {
        let hash = PasswordHasher::with_cost(5).hash("secret123").await.unwrap();
        // A hasher configured at a different cost still verifies.
        assert!(fast().verify("secret123", hash.as_str()).await.unwrap());
    }

    #[tokio::test]
    async fn short_password_is_weak() {
        let err = fast().hash("short").await.unwrap_err();
        assert_eq!(err, ProtectError::WeakSecret { min: 8 });
    }

    #[tokio::test]
    async fn malformed_hash_is_error() {
        let err = fast().verify("secret123", "not-a-hash").await.unwrap_err();
        assert_eq!(err.code(), "verification_failure");

        let truncated = "$2b$04$abcdefghijklmnopqrstuv";
        assert!(fast().verify("secret123", truncated).await.is_err());
    }

    #[test]
    fn cost_is_clamped() {
        assert_eq!(PasswordHasher::with_cost(1).cost(), MIN_BCRYPT_COST);
        assert_eq!(PasswordHasher::with_cost(99).cost(), MAX_BCRYPT_COST);
        assert_eq!(PasswordHasher::default().cost(), DEFAULT_BCRYPT_COST);
    }

    #[test]
    fn parse_rejects_bad_shapes() {
        let valid = format!("$2b$10${}", "a".repeat(53));
        assert_eq!(PasswordHash::parse(&valid).unwrap().cost(), Some(10));
        assert!(PasswordHash::parse(&valid.replacen("$2b$", "$3x$", 1)).is_err());
        assert!(PasswordHash::parse(&format!("$2b$99${}", "a".repeat(53))).is_err());
        assert!(PasswordHash::parse(&valid[..59]).is_err());
    }

    #[tokio::test]
    async fn needs_rehash_on_cost_change() {
        let hash = fast().hash("secret123").await.unwrap();
        assert!(!fast().needs_rehash(&hash));
        assert!(PasswordHasher::with_cost(10).needs_rehash(&hash));
    }
}
