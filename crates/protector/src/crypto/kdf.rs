//! PBKDF2-HMAC-SHA256 key derivation from a caller-supplied secret.
//!
//! Derivation is deterministic: the same `(secret, salt, iterations)` always
//! yields the same key, which is how `decrypt` re-creates the encryption key
//! from the salt carried in the bundle.

use hmac::Hmac;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::validate::{ensure_strong_secret, MIN_SECRET_LEN};

/// Byte length of a derived AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of a key-derivation salt (16 bytes = 128 bits).
pub const SALT_LEN: usize = 16;

/// Iteration count used when the caller does not configure one.
pub const DEFAULT_KDF_ITERATIONS: u32 = 10_000;

/// Lowest iteration count accepted anywhere.
pub const MIN_KDF_ITERATIONS: u32 = 10_000;

/// Errors produced by the key-derivation layer.
#[derive(Debug, Error)]
pub enum KdfError {
    /// The secret is shorter than [`MIN_SECRET_LEN`] characters.
    #[error("secret must be at least {MIN_SECRET_LEN} characters long")]
    WeakSecret,

    /// The iteration count is below [`MIN_KDF_ITERATIONS`].
    #[error("iteration count {0} is below the minimum of {MIN_KDF_ITERATIONS}")]
    TooFewIterations(u32),

    /// The PRF rejected its input (unreachable for HMAC).
    #[error("key derivation failed")]
    Derivation,
}

/// A derived 256-bit symmetric key.
///
/// Owned by exactly one encrypt/decrypt call. The bytes are zeroed when the
/// value is dropped and never appear in `Debug` output.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    #[cfg(test)]
    pub(crate) fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

/// A fresh random salt from the OS CSPRNG.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive a key with [`DEFAULT_KDF_ITERATIONS`], the cost every default
/// [`DataProtector`](crate::DataProtector) bundle is sealed with.
///
/// # Errors
///
/// See [`derive_with_iterations`].
pub fn derive(secret: &str, salt: &[u8]) -> Result<SecretKey, KdfError> {
    derive_with_iterations(secret, salt, DEFAULT_KDF_ITERATIONS)
}

/// Derive a 256-bit key from `secret` and `salt` with `iterations` rounds of
/// PBKDF2-HMAC-SHA256.
///
/// # Errors
///
/// Returns [`KdfError::WeakSecret`] if `secret` is shorter than
/// [`MIN_SECRET_LEN`] characters, and [`KdfError::TooFewIterations`] if
/// `iterations` is below [`MIN_KDF_ITERATIONS`].
pub fn derive_with_iterations(
    secret: &str,
    salt: &[u8],
    iterations: u32,
) -> Result<SecretKey, KdfError> {
    ensure_strong_secret(secret).map_err(|_| KdfError::WeakSecret)?;
    if iterations < MIN_KDF_ITERATIONS {
        return Err(KdfError::TooFewIterations(iterations));
    }

    let mut key = SecretKey([0u8; KEY_LEN]);
    stretch(secret.as_bytes(), salt, iterations, &mut key.0)?;
    Ok(key)
}

fn stretch(secret: &[u8], salt: &[u8], iterations: u32, out: &mut [u8]) -> Result<(), KdfError> {
    pbkdf2::pbkdf2::<Hmac<Sha256>>(secret, salt, iterations, out).map_err(|_| KdfError::Derivation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pbkdf2_sha256_known_answer() {
        // Published PBKDF2-HMAC-SHA256 vector: P = "password", S = "salt", c = 4096.
        let mut out = [0u8; KEY_LEN];
        stretch(b"password", b"salt", 4096, &mut out).unwrap();
        assert_eq!(
            hex::encode(out),
            "c5e478d59288c841aa530db6845c4c8d962893a001ce4e11a4963873aa98134a"
        );
    }

    #[test]
    fn derivation_is_deterministic() {
        let salt = [7u8; SALT_LEN];
        let a = derive("correct horse", &salt).unwrap();
        let b = derive("correct horse", &salt).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_salt_gives_different_key() {
        let a = derive("correct horse", &[1u8; SALT_LEN]).unwrap();
        let b = derive("correct horse", &[2u8; SALT_LEN]).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_secret_gives_different_key() {
        let salt = generate_salt();
        let a = derive("correct horse", &salt).unwrap();
        let b = derive("battery staple", &salt).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn iteration_count_changes_key() {
        let salt = [3u8; SALT_LEN];
        let a = derive_with_iterations("correct horse", &salt, 10_000).unwrap();
        let b = derive_with_iterations("correct horse", &salt, 10_001).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn weak_secret_rejected() {
        assert!(matches!(
            derive("short", &[0u8; SALT_LEN]),
            Err(KdfError::WeakSecret)
        ));
    }

    #[test]
    fn too_few_iterations_rejected() {
        assert!(matches!(
            derive_with_iterations("correct horse", &[0u8; SALT_LEN], 1000),
            Err(KdfError::TooFewIterations(1000))
        ));
    }

    #[test]
    fn salts_are_fresh() {
        assert_ne!(generate_salt(), generate_salt());
    }

    #[test]
    fn secret_key_redacted_in_debug() {
        let key = derive("correct horse", &[0u8; SALT_LEN]).unwrap();
        assert_eq!(format!("{key:?}"), "SecretKey([REDACTED])");
    }
}
