//! Run provenance digests (blake3).
//!
//! A run report carries the digest of the manifest bytes and of the solver
//! config, so two ledgers can be compared for "same inputs" without diffing.

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hash256([u8; 32]);

impl Hash256 {
    /// Full 64-char lowercase hex.
    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }

    /// First 12 hex chars, enough to tell runs apart in logs.
    pub fn short(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(12);
        hex
    }
}

impl std::fmt::Display for Hash256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

pub fn hash_bytes(bytes: &[u8]) -> Hash256 {
    Hash256(*blake3::hash(bytes).as_bytes())
}

/// Digest of a value's JSON encoding. Field order follows the struct
/// definition, so equal configs hash equal.
pub fn hash_serde<T: Serialize>(value: &T) -> Result<Hash256> {
    let json = serde_json::to_vec(value)?;
    Ok(hash_bytes(&json))
}
