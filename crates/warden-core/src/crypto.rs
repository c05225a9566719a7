// crates/warden-core/src/crypto.rs
//
// Hash helpers. `hash_to_field` must match the external verifier bit for bit:
// keccak256 of the packed bytes, read as a big-endian uint256, shifted right
// by 8 bits so the value fits the proof system's scalar field.

use sha2::{Digest, Sha256};
use sha3::Keccak256;

use crate::types::{Address, Field};

/// Compute Keccak-256 of the given bytes.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Compute SHA-256 hash of the given bytes.
pub fn hash_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// `uint256(keccak256(data)) >> 8`.
///
/// Big-endian, a right shift by one byte drops the last digest byte and
/// prepends a zero.
pub fn hash_to_field(data: &[u8]) -> Field {
    let digest = keccak256(data);
    let mut out = [0u8; 32];
    out[1..].copy_from_slice(&digest[..31]);
    Field(out)
}

/// Signal hash binding a proof to the acting identity (packed 20 bytes).
pub fn signal_hash(user: &Address) -> Field {
    hash_to_field(user.as_bytes())
}

/// External nullifier for an app/action pair.
///
/// The app id is field-hashed first; the action string is packed after the
/// resulting 32 bytes and the whole buffer is field-hashed again.
pub fn external_nullifier_hash(app_id: &str, action_id: &str) -> Field {
    let app_hash = hash_to_field(app_id.as_bytes());
    let mut packed = Vec::with_capacity(32 + action_id.len());
    packed.extend_from_slice(app_hash.as_bytes());
    packed.extend_from_slice(action_id.as_bytes());
    hash_to_field(&packed)
}
