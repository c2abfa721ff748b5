//! Keystore integrity tag
//!
//! ```text
//! mac = HMAC-SHA256(key = derivedKey, derivedKey[16..32] || ciphertext || iv || cipherName)
//! ```
//!
//! This differs from Web3 secret-storage, which hashes a half-key with
//! Keccak. Files from generic Ethereum tooling will not verify.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::error::{KeystoreError, KeystoreResult};

type HmacSha256 = Hmac<Sha256>;

/// Derived key bytes covered by the MAC message
const MAC_KEY_RANGE: std::ops::Range<usize> = 16..32;

fn keyed_mac(
    derived_key: &[u8],
    ciphertext: &[u8],
    iv: &[u8],
    cipher_name: &str,
) -> KeystoreResult<HmacSha256> {
    let half = derived_key.get(MAC_KEY_RANGE).ok_or_else(|| {
        KeystoreError::InvalidKdfParams(format!(
            "derived key must be at least 32 bytes, got {}",
            derived_key.len()
        ))
    })?;

    let mut mac = HmacSha256::new_from_slice(derived_key)
        .map_err(|e| KeystoreError::KdfError(e.to_string()))?;
    mac.update(half);
    mac.update(ciphertext);
    mac.update(iv);
    mac.update(cipher_name.as_bytes());
    Ok(mac)
}

/// Compute the MAC for a keystore
pub fn compute_mac(
    derived_key: &[u8],
    ciphertext: &[u8],
    iv: &[u8],
    cipher_name: &str,
) -> KeystoreResult<[u8; 32]> {
    let mac = keyed_mac(derived_key, ciphertext, iv, cipher_name)?;
    Ok(mac.finalize().into_bytes().into())
}

/// Check `expected` against the recomputed MAC in constant time
pub fn verify_mac(
    derived_key: &[u8],
    ciphertext: &[u8],
    iv: &[u8],
    cipher_name: &str,
    expected: &[u8],
) -> KeystoreResult<bool> {
    let mac = keyed_mac(derived_key, ciphertext, iv, cipher_name)?;
    Ok(mac.verify_slice(expected).is_ok())
}

/// Constant-time comparison to prevent timing attacks
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
