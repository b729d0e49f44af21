//! `protector-demo`: exercises every protector operation end to end.
//!
//! Startup sequence:
//! 1. Load and validate [`ProtectorConfig`] from `PROTECTOR_*` environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Encrypt a JSON object, decrypt it under tight limits, then hash and
//!    verify a password.

use anyhow::{Context, Result};
use serde_json::json;
use tracing::info;

use protector::{
    generate_secure_key, DataProtector, DecryptionOptions, Masked, ProtectorConfig,
    DEFAULT_KEY_LENGTH,
};

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = ProtectorConfig::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    protector::telemetry::init(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        kdf_iterations = cfg.kdf_iterations,
        bcrypt_cost = cfg.bcrypt_cost,
        "protector-demo starting"
    );

    let protector = DataProtector::from_config(&cfg);

    // -----------------------------------------------------------------------
    // 3. Symmetric round trip
    // -----------------------------------------------------------------------
    let secret = generate_secure_key(DEFAULT_KEY_LENGTH);
    let bundle = protector
        .encrypt_json(&json!({ "message": "Hello, World!" }), &secret)
        .context("encryption failed")?;
    let bundle_json = serde_json::to_string(&bundle)?;
    info!(bundle = %Masked::new(&bundle_json), "operation result");

    let options = DecryptionOptions::default()
        .with_max_output_length(1024)
        .with_timeout_ms(3000);
    let decrypted = protector
        .decrypt(&bundle, &secret, Some(options))
        .await
        .context("decryption failed")?;
    info!(decrypted_len = decrypted.len(), "decrypted");

    // -----------------------------------------------------------------------
    // 4. Password hashing
    // -----------------------------------------------------------------------
    let password = "securepassword123";
    let hash = protector
        .hash_password(password)
        .await
        .context("password hashing failed")?;
    info!(cost = ?hash.cost(), "password hashed");

    let valid = protector
        .verify_password(password, hash.as_str())
        .await
        .context("password verification failed")?;
    info!(valid, "password verified");

    Ok(())
}
