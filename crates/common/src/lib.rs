//! Shared types and errors for the `protector` data-protection crates.

pub mod error;
pub mod protocol;

pub use error::ProtectError;
pub use protocol::{DecryptionOptions, EncryptionBundle};
