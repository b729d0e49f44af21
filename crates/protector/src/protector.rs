//! [`DataProtector`]: the public entry point.
//!
//! # Request flows
//!
//! - **Encrypt:** validate → derive key (fresh salt) → seal (fresh IV) → encode bundle.
//! - **Decrypt:** validate → reject ciphertext too long for the output limit →
//!   start deadline → derive key (bundle salt) → open → check output size →
//!   release deadline → plaintext.
//!
//! No state survives between calls. A protector holds parameters only, never
//! keys, so one value can be shared freely across tasks and threads. Nothing
//! here retries: a cryptographic failure is never transient.

use common::{DecryptionOptions, EncryptionBundle, ProtectError};
use rand::{rngs::OsRng, RngCore};
use serde::Serialize;
use tracing::{debug, warn};
use zeroize::{Zeroize, Zeroizing};

use crate::config::ProtectorConfig;
use crate::crypto::{
    cipher,
    kdf::{self, KdfError, DEFAULT_KDF_ITERATIONS, MIN_KDF_ITERATIONS},
    RawBundle,
};
use crate::guard::{checkpoint, TimeoutGuard};
use crate::mask::{mask, DEFAULT_MASK_LENGTH};
use crate::password::{PasswordHash, PasswordHasher};
use crate::validate::{ensure_bundle_complete, ensure_strong_secret, MIN_SECRET_LEN};

/// Random bytes produced by [`generate_secure_key`] when no length is given.
pub const DEFAULT_KEY_LENGTH: usize = 32;

/// Encrypts, decrypts, hashes passwords, and masks log output.
///
/// Both sides of a bundle must use the same `kdf_iterations`; a mismatch is
/// indistinguishable from a wrong secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataProtector {
    kdf_iterations: u32,
    hasher: PasswordHasher,
    decryption_defaults: DecryptionOptions,
    mask_length: usize,
}

impl DataProtector {
    /// A protector with every parameter at its default.
    pub fn new() -> Self {
        Self {
            kdf_iterations: DEFAULT_KDF_ITERATIONS,
            hasher: PasswordHasher::default(),
            decryption_defaults: DecryptionOptions::default(),
            mask_length: DEFAULT_MASK_LENGTH,
        }
    }

    /// A protector built from a validated [`ProtectorConfig`].
    pub fn from_config(cfg: &ProtectorConfig) -> Self {
        Self::new()
            .with_kdf_iterations(cfg.kdf_iterations)
            .with_bcrypt_cost(cfg.bcrypt_cost)
            .with_decryption_defaults(cfg.decryption_options())
            .with_mask_length(cfg.mask_length)
    }

    /// Use `iterations` PBKDF2 rounds, raised to the minimum if lower.
    #[must_use]
    pub fn with_kdf_iterations(mut self, iterations: u32) -> Self {
        self.kdf_iterations = iterations.max(MIN_KDF_ITERATIONS);
        self
    }

    /// Use bcrypt at `cost`, clamped into bcrypt's accepted range.
    #[must_use]
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.hasher = PasswordHasher::with_cost(cost);
        self
    }

    /// Options used by [`decrypt`](Self::decrypt) when the caller passes `None`.
    #[must_use]
    pub fn with_decryption_defaults(mut self, options: DecryptionOptions) -> Self {
        self.decryption_defaults = options;
        self
    }

    /// Characters kept at each end by [`log_securely`](Self::log_securely).
    #[must_use]
    pub fn with_mask_length(mut self, mask_length: usize) -> Self {
        self.mask_length = mask_length;
        self
    }

    /// The configured PBKDF2 iteration count.
    pub fn kdf_iterations(&self) -> u32 {
        self.kdf_iterations
    }

    // -----------------------------------------------------------------------
    // Symmetric path
    // -----------------------------------------------------------------------

    /// Encrypt `plaintext` under `secret`.
    ///
    /// Every call draws a fresh salt and IV, so encrypting the same input twice
    /// gives unrelated bundles.
    ///
    /// # Errors
    ///
    /// - [`ProtectError::WeakSecret`] if `secret` is shorter than 8 characters.
    /// - [`ProtectError::EncryptionFailure`] on an internal cipher fault.
    pub fn encrypt(&self, plaintext: &str, secret: &str) -> Result<EncryptionBundle, ProtectError> {
        let result = self.seal(plaintext, secret);
        if let Err(e) = &result {
            warn!(code = e.code(), "encryption rejected");
        }
        result
    }

    /// Serialise `value` to compact JSON and encrypt it.
    ///
    /// # Errors
    ///
    /// - [`ProtectError::InvalidInput`] if `value` serialises to `null` or fails to serialise.
    /// - Anything [`encrypt`](Self::encrypt) returns.
    pub fn encrypt_json<T>(&self, value: &T, secret: &str) -> Result<EncryptionBundle, ProtectError>
    where
        T: Serialize + ?Sized,
    {
        let json = Zeroizing::new(
            serde_json::to_string(value)
                .map_err(|_| ProtectError::InvalidInput("data could not be serialised".into()))?,
        );
        if json.as_str() == "null" {
            return Err(ProtectError::InvalidInput("data is required".into()));
        }
        self.encrypt(&json, secret)
    }

    fn seal(&self, plaintext: &str, secret: &str) -> Result<EncryptionBundle, ProtectError> {
        ensure_strong_secret(secret)?;

        let salt = kdf::generate_salt();
        let iv = cipher::generate_iv();
        let key = kdf::derive_with_iterations(secret, &salt, self.kdf_iterations)
            .map_err(|e| kdf_failure(e, ProtectError::EncryptionFailure))?;
        let ciphertext = cipher::seal(&key, &iv, plaintext.as_bytes()).map_err(|e| {
            warn!(error = %e, "cipher fault while sealing");
            ProtectError::EncryptionFailure
        })?;
        drop(key);

        debug!(
            plaintext_len = plaintext.len(),
            ciphertext_len = ciphertext.len(),
            "payload sealed"
        );
        Ok(RawBundle {
            ciphertext,
            iv,
            salt,
        }
        .encode())
    }

    /// Decrypt `bundle` with `secret` under the size and time limits in `options`
    /// (or this protector's defaults when `None`). A zero limit falls back to
    /// its default.
    ///
    /// # Errors
    ///
    /// - [`ProtectError::InvalidInput`] for a missing or malformed bundle field.
    /// - [`ProtectError::WeakSecret`] if `secret` is shorter than 8 characters.
    /// - [`ProtectError::DecryptionFailure`] for a wrong secret, tampered or
    ///   corrupted ciphertext, bad padding, or non-text output.
    /// - [`ProtectError::OutputTooLarge`] if the plaintext exceeds `max_output_length` bytes.
    /// - [`ProtectError::Timeout`] if the deadline passes first.
    pub async fn decrypt(
        &self,
        bundle: &EncryptionBundle,
        secret: &str,
        options: Option<DecryptionOptions>,
    ) -> Result<String, ProtectError> {
        let result = self.open(bundle, secret, options).await;
        match &result {
            Ok(plaintext) => debug!(plaintext_len = plaintext.len(), "payload opened"),
            Err(e) => warn!(code = e.code(), "decryption rejected"),
        }
        result
    }

    async fn open(
        &self,
        bundle: &EncryptionBundle,
        secret: &str,
        options: Option<DecryptionOptions>,
    ) -> Result<String, ProtectError> {
        let opts = options.unwrap_or(self.decryption_defaults).resolved();
        ensure_bundle_complete(bundle)?;
        ensure_strong_secret(secret)?;
        let raw = RawBundle::decode(bundle)?;

        // Padding adds at most one block, so this much ciphertext can never fit.
        let max = opts.max_output_length;
        if raw.ciphertext.len().saturating_sub(cipher::BLOCK_LEN) > max {
            return Err(ProtectError::OutputTooLarge { max });
        }

        let secret = Zeroizing::new(secret.to_owned());
        let iterations = self.kdf_iterations;

        TimeoutGuard::new(opts.timeout())
            .run(move |token| {
                let key = kdf::derive_with_iterations(&secret, &raw.salt, iterations)
                    .map_err(|e| kdf_failure(e, ProtectError::DecryptionFailure))?;
                checkpoint(&token)?;

                let mut plaintext = cipher::open(&key, &raw.iv, &raw.ciphertext)
                    .map_err(|_| ProtectError::DecryptionFailure)?;
                drop(key);
                checkpoint(&token)?;

                if plaintext.len() > max {
                    plaintext.zeroize();
                    return Err(ProtectError::OutputTooLarge { max });
                }
                Ok(plaintext)
            })
            .await
    }

    // -----------------------------------------------------------------------
    // Password path
    // -----------------------------------------------------------------------

    /// Hash `password` for storage.
    ///
    /// # Errors
    ///
    /// See [`PasswordHasher::hash`].
    pub async fn hash_password(&self, password: &str) -> Result<PasswordHash, ProtectError> {
        self.hasher.hash(password).await
    }

    /// Check `password` against a stored hash. A mismatch is `Ok(false)`.
    ///
    /// # Errors
    ///
    /// See [`PasswordHasher::verify`].
    pub async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, ProtectError> {
        self.hasher.verify(password, hash).await
    }

    /// The password hasher this protector uses.
    pub fn password_hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    // -----------------------------------------------------------------------
    // Utilities
    // -----------------------------------------------------------------------

    /// Mask `data` for logging, keeping `mask_length` characters at each end
    /// (this protector's configured length when `None`, the default when zero).
    pub fn log_securely(&self, data: &str, mask_length: Option<usize>) -> String {
        mask(data, mask_length.unwrap_or(self.mask_length))
    }
}

impl Default for DataProtector {
    fn default() -> Self {
        Self::new()
    }
}

fn kdf_failure(e: KdfError, fault: ProtectError) -> ProtectError {
    match e {
        KdfError::WeakSecret => ProtectError::WeakSecret {
            min: MIN_SECRET_LEN,
        },
        KdfError::TooFewIterations(_) | KdfError::Derivation => fault,
    }
}

/// Random token of `length` bytes from the OS CSPRNG, hex-encoded
/// (`2 * length` characters). Suitable as a one-off secret.
pub fn generate_secure_key(length: usize) -> String {
    let mut bytes = Zeroizing::new(vec![0u8; length]);
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes.as_slice())
}

// ---------------------------------------------------------------------------
// Default-parameter shortcuts
// ---------------------------------------------------------------------------

/// [`DataProtector::encrypt`] with default parameters.
///
/// # Errors
///
/// See [`DataProtector::encrypt`].
pub fn encrypt(plaintext: &str, secret: &str) -> Result<EncryptionBundle, ProtectError> {
    DataProtector::default().encrypt(plaintext, secret)
}

/// [`DataProtector::encrypt_json`] with default parameters.
///
/// # Errors
///
/// See [`DataProtector::encrypt_json`].
pub fn encrypt_json<T>(value: &T, secret: &str) -> Result<EncryptionBundle, ProtectError>
where
    T: Serialize + ?Sized,
{
    DataProtector::default().encrypt_json(value, secret)
}

/// [`DataProtector::decrypt`] with default parameters.
///
/// # Errors
///
/// See [`DataProtector::decrypt`].
pub async fn decrypt(
    bundle: &EncryptionBundle,
    secret: &str,
    options: Option<DecryptionOptions>,
) -> Result<String, ProtectError> {
    DataProtector::default().decrypt(bundle, secret, options).await
}

/// [`DataProtector::hash_password`] at the default bcrypt cost.
///
/// # Errors
///
/// See [`PasswordHasher::hash`].
pub async fn hash_password(password: &str) -> Result<PasswordHash, ProtectError> {
    DataProtector::default().hash_password(password).await
}

/// [`DataProtector::verify_password`] with default parameters.
///
/// # Errors
///
/// See [`PasswordHasher::verify`].
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, ProtectError> {
    DataProtector::default().verify_password(password, hash).await
}

/// [`DataProtector::log_securely`] with the default mask length.
pub fn log_securely(data: &str, mask_length: Option<usize>) -> String {
    DataProtector::default().log_securely(data, mask_length)
}
