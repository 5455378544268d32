//! Opaque Key Generation

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Length of a stable key in hex characters
const STABLE_KEY_LEN: usize = 32;

/// How opaque keys are minted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStrategy {
    /// Fresh random key on every run
    #[default]
    Random,
    /// Derived from import path and function name; survives regeneration
    Stable,
}

impl KeyStrategy {
    /// Mint a key for `function_name` in the package at `import_path`
    pub fn key_for(&self, import_path: &str, function_name: &str) -> String {
        match self {
            Self::Random => Uuid::new_v4().simple().to_string(),
            Self::Stable => stable_key(import_path, function_name),
        }
    }
}

/// SHA-256 of `import_path.function_name`, truncated to 32 hex characters
pub fn stable_key(import_path: &str, function_name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(import_path.as_bytes());
    hasher.update(b".");
    hasher.update(function_name.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..STABLE_KEY_LEN].to_string()
}
