//! Input validation shared by every operation.
//!
//! All checks here run before any cryptographic work starts.

use common::{EncryptionBundle, ProtectError};

/// Minimum secret / password length, in characters.
pub const MIN_SECRET_LEN: usize = 8;

/// Reject secrets and passwords shorter than [`MIN_SECRET_LEN`] characters.
///
/// Length is counted in Unicode scalar values, so multi-byte characters count once.
pub fn ensure_strong_secret(secret: &str) -> Result<(), ProtectError> {
    if secret.chars().count() < MIN_SECRET_LEN {
        return Err(ProtectError::WeakSecret {
            min: MIN_SECRET_LEN,
        });
    }
    Ok(())
}

/// Reject bundles with a missing field.
///
/// Encoding-level checks (hex, base64, lengths) happen when the bundle is decoded.
pub fn ensure_bundle_complete(bundle: &EncryptionBundle) -> Result<(), ProtectError> {
    for (name, value) in [
        ("ciphertext", &bundle.ciphertext),
        ("iv", &bundle.iv),
        ("salt", &bundle.salt),
    ] {
        if value.trim().is_empty() {
            return Err(ProtectError::InvalidInput(format!(
                "invalid encrypted data structure: {name} is empty"
            )));
        }
    }
    Ok(())
}
