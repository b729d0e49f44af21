//! Types exchanged between the protector and its callers.
//!
//! These types are plain text/number containers so they can travel as JSON
//! through forms, storage, or any other transport the caller chooses.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Encryption bundle
// ---------------------------------------------------------------------------

/// Output of `encrypt` and input of `decrypt`.
///
/// All three fields are text encodings of bytes:
/// - `ciphertext`: standard base64 (padded) of the AES-256-CBC output.
/// - `iv`: lowercase hex of the 16-byte initialisation vector.
/// - `salt`: lowercase hex of the 16-byte key-derivation salt.
///
/// A bundle is only meaningful together with the exact secret used to create it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionBundle {
    /// Encoded ciphertext.
    pub ciphertext: String,
    /// Encoded initialisation vector.
    pub iv: String,
    /// Encoded key-derivation salt.
    pub salt: String,
}

// ---------------------------------------------------------------------------
// Decryption options
// ---------------------------------------------------------------------------

/// Default upper bound on decrypted output, in bytes (1 MiB).
pub const DEFAULT_MAX_OUTPUT_LENGTH: usize = 1024 * 1024;

/// Default decryption deadline, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Caller-tunable safety limits for a single decryption.
///
/// These bound resource usage; they are not security parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionOptions {
    /// Largest plaintext, in bytes, the caller is willing to receive.
    #[serde(default = "default_max_output_length")]
    pub max_output_length: usize,

    /// Wall-clock budget for the whole decryption, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_max_output_length() -> usize {
    DEFAULT_MAX_OUTPUT_LENGTH
}
fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl DecryptionOptions {
    /// Replace the output-size limit.
    #[must_use]
    pub fn with_max_output_length(mut self, max_output_length: usize) -> Self {
        self.max_output_length = max_output_length;
        self
    }

    /// Replace the deadline.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// These options with every zero field replaced by its default.
    ///
    /// A zero limit means "not set", so `with_timeout_ms(0)` behaves exactly
    /// like leaving the deadline at [`DEFAULT_TIMEOUT_MS`].
    #[must_use]
    pub fn resolved(self) -> Self {
        Self {
            max_output_length: match self.max_output_length {
                0 => DEFAULT_MAX_OUTPUT_LENGTH,
                n => n,
            },
            timeout_ms: match self.timeout_ms {
                0 => DEFAULT_TIMEOUT_MS,
                n => n,
            },
        }
    }

    /// The deadline as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for DecryptionOptions {
    fn default() -> Self {
        Self {
            max_output_length: DEFAULT_MAX_OUTPUT_LENGTH,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bundle_serialises_as_three_text_fields() {
        let bundle = EncryptionBundle {
            ciphertext: "q83vEjRWeJA=".into(),
            iv: "00112233445566778899aabbccddeeff".into(),
            salt: "ffeeddccbbaa99887766554433221100".into(),
        };
        let value = serde_json::to_value(&bundle).unwrap();
        assert_eq!(
            value,
            json!({
                "ciphertext": "q83vEjRWeJA=",
                "iv": "00112233445566778899aabbccddeeff",
                "salt": "ffeeddccbbaa99887766554433221100",
            })
        );
    }

    #[test]
    fn options_defaults() {
        let opts = DecryptionOptions::default();
        assert_eq!(opts.max_output_length, 1024 * 1024);
        assert_eq!(opts.timeout_ms, 5000);
        assert_eq!(opts.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn options_missing_fields_take_defaults() {
        let opts: DecryptionOptions = serde_json::from_str(r#"{"timeout_ms": 3000}"#).unwrap();
        assert_eq!(opts.timeout_ms, 3000);
        assert_eq!(opts.max_output_length, DEFAULT_MAX_OUTPUT_LENGTH);
    }

    #[test]
    fn options_setters() {
        let opts = DecryptionOptions::default()
            .with_max_output_length(1024)
            .with_timeout_ms(3000);
        assert_eq!(opts.max_output_length, 1024);
        assert_eq!(opts.timeout(), Duration::from_millis(3000));
    }

    #[test]
    fn zero_fields_resolve_to_defaults() {
        let zeroed = DecryptionOptions::default()
            .with_max_output_length(0)
            .with_timeout_ms(0);
        assert_eq!(zeroed.resolved(), DecryptionOptions::default());

        let set = DecryptionOptions::default()
            .with_max_output_length(10)
            .with_timeout_ms(0)
            .resolved();
        assert_eq!(set.max_output_length, 10);
        assert_eq!(set.timeout_ms, DEFAULT_TIMEOUT_MS);
    }
}
