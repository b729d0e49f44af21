//! Symmetric encryption primitives: key derivation, AES-256-CBC, bundle encoding.
//!
//! This module is free of async and configuration concerns. The facade in
//! `crate::protector` composes these pieces and maps their errors.
//!
//! # Bundle format
//!
//! ```text
//! { "ciphertext": <base64(AES-256-CBC(PKCS#7(plaintext)))>,
//!   "iv":         <hex(16 random bytes)>,
//!   "salt":       <hex(16 random bytes)> }
//! ```
//!
//! The key is `PBKDF2-HMAC-SHA256(secret, salt, iterations)`, 32 bytes.

pub mod bundle;
pub mod cipher;
pub mod kdf;

pub use bundle::RawBundle;
pub use kdf::{SecretKey, KEY_LEN, SALT_LEN};
