//! Optional configuration loading and validation.
//!
//! The library never reads the environment on its own. Callers that want
//! environment-driven tuning call [`ProtectorConfig::from_env`] and pass the
//! result to [`DataProtector::from_config`](crate::DataProtector::from_config).
//! Every variable is prefixed with `PROTECTOR_`.

use anyhow::{Context, Result};
use common::protocol::{DEFAULT_MAX_OUTPUT_LENGTH, DEFAULT_TIMEOUT_MS};
use common::DecryptionOptions;
use serde::Deserialize;

use crate::crypto::kdf::{DEFAULT_KDF_ITERATIONS, MIN_KDF_ITERATIONS};
use crate::mask::DEFAULT_MASK_LENGTH;
use crate::password::{DEFAULT_BCRYPT_COST, MAX_BCRYPT_COST, MIN_BCRYPT_COST};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "PROTECTOR";

/// Validated protector configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProtectorConfig {
    /// PBKDF2 iteration count (`PROTECTOR_KDF_ITERATIONS`).
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// bcrypt work factor (`PROTECTOR_BCRYPT_COST`).
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    /// Default decrypted-size limit in bytes (`PROTECTOR_MAX_OUTPUT_LENGTH`).
    #[serde(default = "default_max_output_length")]
    pub max_output_length: usize,

    /// Default decryption deadline in ms (`PROTECTOR_DECRYPT_TIMEOUT_MS`).
    #[serde(default = "default_decrypt_timeout_ms")]
    pub decrypt_timeout_ms: u64,

    /// Characters kept at each end by `log_securely` (`PROTECTOR_MASK_LENGTH`).
    #[serde(default = "default_mask_length")]
    pub mask_length: usize,

    /// Tracing log level, e.g. `"info"` (`PROTECTOR_LOG_LEVEL`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_kdf_iterations() -> u32 {
    DEFAULT_KDF_ITERATIONS
}
fn default_bcrypt_cost() -> u32 {
    DEFAULT_BCRYPT_COST
}
fn default_max_output_length() -> usize {
    DEFAULT_MAX_OUTPUT_LENGTH
}
fn default_decrypt_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}
fn default_mask_length() -> usize {
    DEFAULT_MASK_LENGTH
}
fn default_log_level() -> String {
    "info".into()
}

impl ProtectorConfig {
    /// Load and validate configuration from `PROTECTOR_*` environment variables.
    ///
    /// Unset variables take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("failed to build protector configuration from environment")?;

        let c: ProtectorConfig = cfg
            .try_deserialize()
            .context("failed to deserialise protector configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    pub fn validate(&self) -> Result<()> {
        if self.kdf_iterations < MIN_KDF_ITERATIONS {
            anyhow::bail!("PROTECTOR_KDF_ITERATIONS must be >= {MIN_KDF_ITERATIONS}");
        }
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost) {
            anyhow::bail!(
                "PROTECTOR_BCRYPT_COST must be between {MIN_BCRYPT_COST} and {MAX_BCRYPT_COST}"
            );
        }
        if self.max_output_length == 0 {
            anyhow::bail!("PROTECTOR_MAX_OUTPUT_LENGTH must be > 0");
        }
        if self.decrypt_timeout_ms == 0 {
            anyhow::bail!("PROTECTOR_DECRYPT_TIMEOUT_MS must be > 0");
        }
        if self.log_level.trim().is_empty() {
            anyhow::bail!("PROTECTOR_LOG_LEVEL must not be empty");
        }
        Ok(())
    }

    /// The default [`DecryptionOptions`] described by this configuration.
    pub fn decryption_options(&self) -> DecryptionOptions {
        DecryptionOptions {
            max_output_length: self.max_output_length,
            timeout_ms: self.decrypt_timeout_ms,
        }
    }
}

impl Default for ProtectorConfig {
    fn default() -> Self {
        Self {
            kdf_iterations: default_kdf_iterations(),
            bcrypt_cost: default_bcrypt_cost(),
            max_output_length: default_max_output_length(),
            decrypt_timeout_ms: default_decrypt_timeout_ms(),
            mask_length: default_mask_length(),
            log_level: default_log_level(),
        }
    }
}
