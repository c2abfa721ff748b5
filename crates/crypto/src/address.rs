//! Account addresses
//!
//! An address is the low 20 bytes of `SHA256(compressed public key)`. It has
//! three interchangeable text forms:
//!
//! - raw: 40 lowercase hex characters, no prefix
//! - checksum: `0x` + hex with letter case chosen from `SHA256(address)`,
//!   one bit every 6 starting at bit 255
//! - bech32: BIP-0173 with human-readable part `zil`

use std::fmt;
use std::str::FromStr;

use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32, Hrp};
use serde::{Deserialize, Serialize};

use crate::error::{CryptoError, CryptoResult};
use crate::hash::sha256;
use crate::keys::PublicKey;

/// Address length in bytes
pub const ADDRESS_LENGTH: usize = 20;

/// Bech32 human-readable part
pub const BECH32_HRP: Hrp = Hrp::parse_unchecked("zil");

/// A 20-byte account address
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// Wrap raw address bytes
    pub fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Derive the address of a public key
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let hash = sha256(&[&public_key.to_compressed_bytes()]);
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&hash[32 - ADDRESS_LENGTH..]);
        Self(bytes)
    }

    /// Parse 40 hex characters, with an optional `0x` prefix, in any case
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        if !is_valid_address(s) {
            return Err(CryptoError::InvalidAddress(s.to_string()));
        }

        let mut bytes = [0u8; ADDRESS_LENGTH];
        hex::decode_to_slice(strip_prefix(s), &mut bytes)?;
        Ok(Self(bytes))
    }

    /// Decode a `zil1…` bech32 string
    pub fn from_bech32(s: &str) -> CryptoResult<Self> {
        let checked = CheckedHrpstring::new::<Bech32>(s)
            .map_err(|e| CryptoError::InvalidBech32(e.to_string()))?;

        if checked.hrp().to_lowercase() != BECH32_HRP.as_str() {
            return Err(CryptoError::InvalidBech32(format!(
                "expected prefix {}, found {}",
                BECH32_HRP,
                checked.hrp()
            )));
        }

        let data: Vec<u8> = checked.byte_iter().collect();
        let bytes: [u8; ADDRESS_LENGTH] = data.as_slice().try_into().map_err(|_| {
            CryptoError::InvalidBech32(format!(
                "expected {} data bytes, found {}",
                ADDRESS_LENGTH,
                data.len()
            ))
        })?;

        Ok(Self(bytes))
    }

    /// Parse any of the three encodings
    pub fn parse(s: &str) -> CryptoResult<Self> {
        let s = s.trim();
        if is_bech32_address(s) {
            Self::from_bech32(s)
        } else {
            Self::from_hex(s)
        }
    }

    /// Raw address bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Canonical form: 40 lowercase hex characters, no prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Mixed-case checksum form with `0x` prefix
    pub fn to_checksum(&self) -> String {
        let lower = self.to_hex();
        let hash = sha256(&[&self.0]);

        let mut out = String::with_capacity(2 + lower.len());
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            if c.is_ascii_alphabetic() && bit_set(&hash, 255 - 6 * i) {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }

    /// Bech32 form with the `zil` prefix
    pub fn to_bech32(&self) -> CryptoResult<String> {
        bech32::encode::<Bech32>(BECH32_HRP, &self.0)
            .map_err(|e| CryptoError::InvalidBech32(e.to_string()))
    }
}

/// Test bit `index` (0 = least significant) of a big-endian 256-bit value
fn bit_set(value: &[u8; 32], index: usize) -> bool {
    value[31 - index / 8] & (1 << (index % 8)) != 0
}

fn strip_prefix(s: &str) -> &str {
    match s.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("0x") => &s[2..],
        _ => s,
    }
}

impl FromStr for Address {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Whether `s` is 40 hex characters after an optional `0x` prefix
pub fn is_valid_address(s: &str) -> bool {
    let body = strip_prefix(s);
    body.len() == 2 * ADDRESS_LENGTH && body.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Normalize any accepted encoding to canonical lowercase hex
pub fn to_valid_address(s: &str) -> CryptoResult<String> {
    Address::parse(s).map(|address| address.to_hex())
}

/// Checksum form of a hex address
pub fn to_checksum_address(s: &str) -> CryptoResult<String> {
    Address::from_hex(s).map(|address| address.to_checksum())
}

/// Whether `s` is exactly the checksum form of its own bytes
pub fn is_valid_checksum_address(s: &str) -> bool {
    match Address::from_hex(s) {
        Ok(address) => address.to_checksum() == s,
        Err(_) => false,
    }
}

/// Bech32 form of a hex address
pub fn to_bech32_address(s: &str) -> CryptoResult<String> {
    Address::from_hex(s)?.to_bech32()
}

/// Decode a bech32 address to canonical lowercase hex
pub fn from_bech32_address(s: &str) -> CryptoResult<String> {
    Address::from_bech32(s).map(|address| address.to_hex())
}

/// Whether `s` decodes as bech32 with the `zil` prefix
pub fn is_bech32_address(s: &str) -> bool {
    Address::from_bech32(s).is_ok()
}
