//! Password-encrypted private key storage
//!
//! Keystores are version 3 JSON files in the Web3 secret-storage shape:
//!
//! - PBKDF2-HMAC-SHA256 or scrypt key derivation
//! - AES-128-CTR encryption of the 32-byte private key
//! - HMAC-SHA256 integrity tag keyed by the full derived key
//!
//! A wrong password and a modified file both fail with the same error.
//!
//! # Example
//!
//! ```rust,ignore
//! use zilkey_crypto::keystore::{KdfMethod, Keystore};
//! use zilkey_crypto::ZilKey;
//!
//! let key = ZilKey::generate();
//! let keystore = Keystore::encrypt(key.private_key().unwrap(), "my-password", KdfMethod::Scrypt)?;
//! keystore.save("./keys/main.json")?;
//!
//! let loaded = Keystore::load("./keys/main.json")?;
//! let decrypted = loaded.decrypt("my-password")?;
//! ```

mod cipher;
mod encrypted;
mod error;
mod kdf;
mod mac;

pub use cipher::{decrypt_secret, encrypt_secret, CipherParams, CIPHER_NAME, IV_LENGTH};
pub use encrypted::{CryptoSection, Keystore, KeystoreBuilder, KEYSTORE_VERSION};
pub use error::{KeystoreError, KeystoreResult};
pub use kdf::{
    pbkdf2_derive_key, scrypt_derive_key, KdfConfig, KdfMethod, KdfParams, PBKDF2_ITERATIONS,
    SCRYPT_N, SCRYPT_P, SCRYPT_R,
};
pub use mac::{compute_mac, verify_mac};
