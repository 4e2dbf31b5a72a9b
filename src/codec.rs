//! Ledger value codec.
//!
//! Serde already provides the schema-preserving encode/decode round trip;
//! this module centralizes it so every component maps failures the same
//! way: encoding failures are backend-shaped, while bytes that no longer
//! decode as the expected structure surface as corrupt state (index or
//! content drift), never as a silent reset.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

/// Encode a value for storage at `key`.
pub fn encode<T: Serialize>(key: &str, value: &T) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(value).map_err(|e| StoreError::Encode {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Decode the bytes stored at `key`.
pub fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::CorruptState {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Stable hex digest of a value's canonical encoding.
///
/// The stamp operations accept any opaque value; this helper is the
/// natural source for one, committing to the exact record state at
/// stamping time.
pub fn digest<T: Serialize>(value: &T) -> Result<String, StoreError> {
    let bytes = encode("digest", value)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}
