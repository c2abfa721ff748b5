//! Schnorr signatures over secp256k1
//!
//! ```text
//! Q = k·G
//! r = SHA256(Q || P || m) mod q
//! s = k - r·x mod q
//! ```
//!
//! Points are hashed in compressed SEC1 form. Verification recomputes
//! `Q' = s·G + r·P` and accepts iff the challenge over `Q'` equals `r`.

use alloy_primitives::U256;
use k256::elliptic_curve::bigint::ArrayEncoding;
use k256::elliptic_curve::group::Group;
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::{Curve, PrimeField};
use k256::{FieldBytes, ProjectivePoint, Scalar, Secp256k1};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::drbg;
use crate::error::{CryptoError, CryptoResult};
use crate::hash::sha256;
use crate::keys::{strip_hex_prefix, PrivateKey, PublicKey};

/// Encoded signature length: `r || s`, 32 bytes each
pub const SIGNATURE_LENGTH: usize = 64;

/// Schnorr signature `(r, s)` with both components in `[1, q-1]`
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    r: Scalar,
    s: Scalar,
}

impl Signature {
    /// Decode from 64 bytes (`r || s`)
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(CryptoError::InvalidSignature);
        }

        let r = scalar_from_slice(&bytes[..32]).ok_or(CryptoError::InvalidSignature)?;
        let s = scalar_from_slice(&bytes[32..]).ok_or(CryptoError::InvalidSignature)?;

        if bool::from(r.is_zero()) || bool::from(s.is_zero()) {
            return Err(CryptoError::InvalidSignature);
        }

        Ok(Self { r, s })
    }

    /// Decode from 128 hex characters, with or without `0x`
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let bytes = hex::decode(strip_hex_prefix(s.trim()))?;
        Self::from_bytes(&bytes)
    }

    /// Serialize to 64 bytes
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..32].copy_from_slice(&self.r.to_bytes());
        out[32..].copy_from_slice(&self.s.to_bytes());
        out
    }

    /// Lowercase hex of `r || s`
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// The challenge component
    pub fn r(&self) -> [u8; 32] {
        self.r.to_bytes().into()
    }

    /// The response component
    pub fn s(&self) -> [u8; 32] {
        self.s.to_bytes().into()
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Order `q` of the secp256k1 group
pub fn curve_order() -> U256 {
    U256::from_be_slice(&Secp256k1::ORDER.to_be_byte_array())
}

/// Sign `message`, drawing a fresh nonce `k` uniformly from `[1, q-1]`.
///
/// The nonce generator is reseeded with system entropy on every call, so
/// signing the same message twice yields different signatures.
pub fn sign(message: &[u8], private_key: &PrivateKey) -> CryptoResult<Signature> {
    let order = curve_order();

    loop {
        let k = drbg::random_below(order, None)?;
        if k.is_zero() {
            continue;
        }

        let k_bytes = Zeroizing::new(k.to_be_bytes::<32>());
        let Some(k) = scalar_from_slice(k_bytes.as_slice()) else {
            continue;
        };

        if let Some(signature) = sign_with_k(message, private_key, &k) {
            return Ok(signature);
        }
    }
}

/// Sign with a caller-supplied nonce.
///
/// Returns `None` when `k`, `r` or `s` is zero; the caller must retry with a
/// new nonce. Reusing `k` across two messages reveals the private key.
pub fn sign_with_k(message: &[u8], private_key: &PrivateKey, k: &Scalar) -> Option<Signature> {
    if bool::from(k.is_zero()) {
        return None;
    }

    let public_key = private_key.public_key();
    let commitment = ProjectivePoint::GENERATOR * k;
    let r = challenge(&commitment, &public_key, message);
    if bool::from(r.is_zero()) {
        return None;
    }

    let s = *k - r * private_key.scalar();
    if bool::from(s.is_zero()) {
        return None;
    }

    Some(Signature { r, s })
}

/// Verify `signature` over `message` for `public_key`
pub fn verify(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    if bool::from(signature.r.is_zero()) || bool::from(signature.s.is_zero()) {
        return false;
    }

    let commitment =
        ProjectivePoint::GENERATOR * signature.s + public_key.to_projective() * signature.r;
    if bool::from(commitment.is_identity()) {
        return false;
    }

    challenge(&commitment, public_key, message) == signature.r
}

/// Verify an encoded signature; malformed input yields `false`.
pub fn verify_bytes(message: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
    let Ok(signature) = Signature::from_bytes(signature) else {
        return false;
    };
    let Ok(public_key) = PublicKey::from_bytes(public_key) else {
        return false;
    };
    verify(message, &signature, &public_key)
}

fn challenge(commitment: &ProjectivePoint, public_key: &PublicKey, message: &[u8]) -> Scalar {
    let commitment = commitment.to_affine().to_encoded_point(true);
    let digest = sha256(&[
        commitment.as_bytes(),
        &public_key.to_compressed_bytes(),
        message,
    ]);
    <Scalar as Reduce<k256::U256>>::reduce_bytes(&FieldBytes::from(digest))
}

fn scalar_from_slice(bytes: &[u8]) -> Option<Scalar> {
    Option::from(Scalar::from_repr(*FieldBytes::from_slice(bytes)))
}
