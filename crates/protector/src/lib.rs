//! `protector`: secret-based encryption and password hashing for application data.
//!
//! - Symmetric path: PBKDF2-HMAC-SHA256 key derivation + AES-256-CBC, producing
//!   a text [`EncryptionBundle`] of `{ciphertext, iv, salt}`. Decryption runs
//!   under a deadline and an output-size limit.
//! - Password path: bcrypt hashes with an embedded salt and cost.
//! - Log masking for values that are about to be written to a log.
//!
//! Callers supply the secret on every call. Nothing is cached between calls.
//!
//! # Security invariants
//!
//! - Derived keys live only for the duration of one call, are zeroed on drop,
//!   and never appear in logs, errors, or `Debug` output.
//! - Salt and IV are drawn from the OS CSPRNG on every encryption.
//! - Bundles carry **no authentication tag**. Tampering is detected only
//!   incidentally, through padding and UTF-8 validation.

pub mod config;
pub mod crypto;
pub mod guard;
pub mod mask;
pub mod password;
pub mod protector;
pub mod telemetry;
pub mod validate;

pub use common::{DecryptionOptions, EncryptionBundle, ProtectError};
pub use config::ProtectorConfig;
pub use guard::TimeoutGuard;
pub use mask::Masked;
pub use password::{PasswordHash, PasswordHasher};
pub use protector::{
    decrypt, encrypt, encrypt_json, generate_secure_key, hash_password, log_securely,
    verify_password, DataProtector, DEFAULT_KEY_LENGTH,
};
