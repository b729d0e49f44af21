//! Common error types shared across crates.

use thiserror::Error;

/// Error taxonomy for every data-protection operation.
///
/// Messages are safe to hand back to callers: no variant ever carries key
/// material, plaintext, or the raw text of an underlying crypto-library error.
/// Use [`ProtectError::code`] when a stable machine-readable kind is needed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtectError {
    /// Missing or empty data, malformed bundle fields, or unusable options.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A secret or password is shorter than the enforced minimum.
    #[error("secret must be at least {min} characters long")]
    WeakSecret {
        /// Minimum accepted length, in characters.
        min: usize,
    },

    /// Internal cipher fault while sealing. Unreachable for well-formed input.
    #[error("encryption failed")]
    EncryptionFailure,

    /// Wrong secret, corrupted or tampered ciphertext, bad padding, or non-text output.
    #[error("decryption failed")]
    DecryptionFailure,

    /// The decrypted plaintext is larger than the caller allowed.
    #[error("decrypted data exceeds maximum length of {max} bytes")]
    OutputTooLarge {
        /// The configured `max_output_length`.
        max: usize,
    },

    /// Decryption did not finish before its deadline.
    #[error("decryption timed out after {timeout_ms} ms")]
    Timeout {
        /// The configured deadline in milliseconds.
        timeout_ms: u64,
    },

    /// Internal fault while producing a password hash.
    #[error("password hashing failed")]
    HashingFailure,

    /// The stored hash is malformed or verification hit an internal fault.
    ///
    /// A password that simply does not match is *not* an error.
    #[error("password verification failed: {0}")]
    VerificationFailure(String),
}

impl ProtectError {
    /// Returns the short machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            ProtectError::InvalidInput(_) => "invalid_input",
            ProtectError::WeakSecret { .. } => "weak_secret",
            ProtectError::EncryptionFailure => "encryption_failure",
            ProtectError::DecryptionFailure => "decryption_failure",
            ProtectError::OutputTooLarge { .. } => "output_too_large",
            ProtectError::Timeout { .. } => "timeout",
            ProtectError::HashingFailure => "hashing_failure",
            ProtectError::VerificationFailure(_) => "verification_failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes() {
        assert_eq!(ProtectError::InvalidInput("x".into()).code(), "invalid_input");
        assert_eq!(ProtectError::WeakSecret { min: 8 }.code(), "weak_secret");
        assert_eq!(ProtectError::EncryptionFailure.code(), "encryption_failure");
        assert_eq!(ProtectError::DecryptionFailure.code(), "decryption_failure");
        assert_eq!(
            ProtectError::OutputTooLarge { max: 1 }.code(),
            "output_too_large"
        );
        assert_eq!(ProtectError::Timeout { timeout_ms: 1 }.code(), "timeout");
        assert_eq!(ProtectError::HashingFailure.code(), "hashing_failure");
        assert_eq!(
            ProtectError::VerificationFailure("x".into()).code(),
            "verification_failure"
        );
    }

    #[test]
    fn display_includes_message() {
        let e = ProtectError::InvalidInput("iv is not valid hex".into());
        assert!(e.to_string().contains("iv is not valid hex"));
    }

    #[test]
    fn display_includes_limits() {
        assert!(ProtectError::WeakSecret { min: 8 }.to_string().contains('8'));
        assert!(ProtectError::OutputTooLarge { max: 1024 }
            .to_string()
            .contains("1024"));
        assert!(ProtectError::Timeout { timeout_ms: 250 }
            .to_string()
            .contains("250 ms"));
    }
}
