//! Text encoding of [`EncryptionBundle`] fields.
//!
//! `ciphertext` is standard padded base64; `iv` and `salt` are lowercase hex.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::{EncryptionBundle, ProtectError};

use super::cipher::IV_LEN;
use super::kdf::SALT_LEN;

/// A bundle with every field decoded back to bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBundle {
    /// Raw CBC output.
    pub ciphertext: Vec<u8>,
    /// Raw initialisation vector.
    pub iv: [u8; IV_LEN],
    /// Raw key-derivation salt.
    pub salt: [u8; SALT_LEN],
}

impl RawBundle {
    /// Encode into the text form handed to callers.
    pub fn encode(&self) -> EncryptionBundle {
        EncryptionBundle {
            ciphertext: STANDARD.encode(&self.ciphertext),
            iv: hex::encode(self.iv),
            salt: hex::encode(self.salt),
        }
    }

    /// Decode a caller-supplied bundle.
    ///
    /// # Errors
    ///
    /// Returns [`ProtectError::InvalidInput`] if any field is not valid in its
    /// encoding, or if the IV or salt has the wrong length.
    pub fn decode(bundle: &EncryptionBundle) -> Result<Self, ProtectError> {
        let ciphertext = STANDARD
            .decode(bundle.ciphertext.trim())
            .map_err(|_| invalid("ciphertext is not valid base64"))?;
        if ciphertext.is_empty() {
            return Err(invalid("ciphertext is empty"));
        }
        let iv = decode_fixed::<IV_LEN>(&bundle.iv, "iv")?;
        let salt = decode_fixed::<SALT_LEN>(&bundle.salt, "salt")?;
        Ok(Self {
            ciphertext,
            iv,
            salt,
        })
    }
}

fn decode_fixed<const N: usize>(field: &str, name: &str) -> Result<[u8; N], ProtectError> {
    let bytes = hex::decode(field.trim())
        .map_err(|_| invalid(&format!("{name} is not valid hex")))?;
    bytes
        .try_into()
        .map_err(|_| invalid(&format!("{name} must be {N} bytes")))
}

fn invalid(msg: &str) -> ProtectError {
    ProtectError::InvalidInput(msg.to_owned())
}
