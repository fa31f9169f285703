//! Hashing - SHA-256 Digests for Run Reproduction
//!
//! Two runs with the same input text, directive list and options must
//! produce the same output digest and the same run fingerprint.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::transform::TransformOptions;

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[derive(Serialize)]
struct FingerprintInput<'a> {
    engine_version: &'a str,
    options: &'a TransformOptions,
    input_sha256: String,
    directives: &'a Value,
}

/// Fingerprint of everything that determines a run's output.
///
/// Directive key order is significant (it shapes the rendered literal), so
/// the directive list is hashed in its given order, not canonicalized.
pub fn compute_run_fingerprint(
    input: &str,
    directives: &Value,
    options: &TransformOptions,
    engine_version: &str,
) -> Result<String, serde_json::Error> {
    let payload = serde_json::to_string(&FingerprintInput {
        engine_version,
        options,
        input_sha256: sha256_hex(input.as_bytes()),
        directives,
    })?;
    Ok(sha256_hex(payload.as_bytes()))
}
