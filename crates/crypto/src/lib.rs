//! Account identity primitives for Zilliqa
//!
//! This crate provides:
//! - HMAC_DRBG (SHA-256) for unbiased signing nonces
//! - Schnorr signatures over secp256k1
//! - Address derivation with checksum and bech32 (`zil`) encodings
//! - Password-encrypted keystores (PBKDF2 or scrypt, AES-128-CTR)
//! - Account identity combining an address with optional key material

pub mod account;
pub mod address;
pub mod drbg;
pub mod error;
pub mod hash;
pub mod keys;
pub mod keystore;
pub mod schnorr;
pub mod secure;

// Key exports
pub use keys::{PrivateKey, PublicKey, ZilKey};

// Signature exports
pub use schnorr::{sign, sign_with_k, verify, verify_bytes, Signature};

// Address exports
pub use address::{
    from_bech32_address, is_bech32_address, is_valid_address, is_valid_checksum_address,
    to_bech32_address, to_checksum_address, to_valid_address, Address,
};

pub use account::Account;

// Error exports
pub use drbg::{random_below, random_bytes, DrbgError, HmacDrbg};
pub use error::{CryptoError, CryptoResult};

// Secure memory exports
pub use secure::{IntoSecret, SecretArray, SecretBytes, SecretString};

// Keystore exports
pub use keystore::{KdfConfig, KdfMethod, Keystore, KeystoreBuilder, KeystoreError};
