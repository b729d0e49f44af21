//! AES-256-CBC sealing and opening of text payloads.
//!
//! **Mode:** CBC with PKCS#7 padding and a fresh random IV per message. There is
//! no authentication tag. A wrong key or tampered ciphertext is only caught
//! because the padding (or the UTF-8 check after it) almost never survives,
//! which is probabilistic, not cryptographic, detection.
//!
//! **Never reuse an IV with the same key.** Every call to `encrypt` draws both a
//! new salt (hence a new key) and a new IV.

use aes::Aes256;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;
use zeroize::Zeroize;

use super::kdf::SecretKey;

/// AES block size in bytes.
pub const BLOCK_LEN: usize = 16;

/// Byte length of a CBC initialisation vector (one block).
pub const IV_LEN: usize = BLOCK_LEN;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key or IV has the wrong length.
    #[error("invalid key or IV length")]
    InvalidKeyLength,

    /// The ciphertext is empty or not a whole number of blocks.
    #[error("ciphertext length is not a positive multiple of {BLOCK_LEN}")]
    InvalidLength,

    /// PKCS#7 padding was malformed after decryption.
    #[error("bad padding")]
    BadPadding,

    /// The decrypted bytes are not valid UTF-8.
    #[error("decrypted data is not valid text")]
    NotText,
}

/// A fresh random IV from the OS CSPRNG.
pub fn generate_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    iv
}

/// Encrypt `plaintext` under `key` and `iv`, returning the padded ciphertext.
///
/// Output length is always `plaintext.len()` rounded up to the next whole block
/// (an exact multiple gains one full padding block).
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] on an internal key-schedule fault
/// (unreachable with a [`SecretKey`] and a fixed-size IV).
pub fn seal(key: &SecretKey, iv: &[u8; IV_LEN], plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
    let cipher = build_encryptor(key, iv)?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// Decrypt `ciphertext` under `key` and `iv` and decode it as UTF-8 text.
///
/// # Errors
///
/// - [`CipherError::InvalidLength`] if `ciphertext` is empty or not block-aligned.
/// - [`CipherError::BadPadding`] if the padding is malformed (near-certain under a wrong key).
/// - [`CipherError::NotText`] if the unpadded bytes are not UTF-8.
pub fn open(key: &SecretKey, iv: &[u8; IV_LEN], ciphertext: &[u8]) -> Result<String, CipherError> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(CipherError::InvalidLength);
    }
    let cipher = build_decryptor(key, iv)?;
    let plaintext = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CipherError::BadPadding)?;

    String::from_utf8(plaintext).map_err(|e| {
        e.into_bytes().zeroize();
        CipherError::NotText
    })
}

fn build_encryptor(key: &SecretKey, iv: &[u8; IV_LEN]) -> Result<Aes256CbcEnc, CipherError> {
    Aes256CbcEnc::new_from_slices(key.as_bytes(), iv).map_err(|_| CipherError::InvalidKeyLength)
}

fn build_decryptor(key: &SecretKey, iv: &[u8; IV_LEN]) -> Result<Aes256CbcDec, CipherError> {
    Aes256CbcDec::new_from_slices(key.as_bytes(), iv).map_err(|_| CipherError::InvalidKeyLength)
}
