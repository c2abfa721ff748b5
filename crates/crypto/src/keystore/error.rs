//! Keystore error types

use thiserror::Error;

use crate::drbg::DrbgError;
use crate::error::CryptoError;

/// Errors that can occur during keystore operations
#[derive(Error, Debug)]
pub enum KeystoreError {
    /// MAC mismatch: wrong password or modified file.
    ///
    /// The two cases share one message so callers cannot tell them apart.
    #[error("invalid password or keystore")]
    InvalidPassword,

    /// Key decrypted cleanly but does not match the stored address
    #[error("address mismatch")]
    AddressMismatch,

    /// No password supplied to the builder
    #[error("password is required")]
    MissingPassword,

    /// Unsupported KDF function
    #[error("unsupported KDF function: {0}")]
    UnsupportedKdf(String),

    /// Unsupported cipher function
    #[error("unsupported cipher function: {0}")]
    UnsupportedCipher(String),

    /// Keystore format version other than 3
    #[error("unsupported keystore version: {0}")]
    UnsupportedVersion(u32),

    /// Invalid KDF parameters
    #[error("invalid KDF parameters: {0}")]
    InvalidKdfParams(String),

    /// Invalid cipher parameters
    #[error("invalid cipher parameters: {0}")]
    InvalidCipherParams(String),

    /// Key derivation failed
    #[error("key derivation failed: {0}")]
    KdfError(String),

    /// Encryption/decryption failed
    #[error("cipher operation failed: {0}")]
    CipherError(String),

    /// Invalid hex encoding
    #[error("invalid hex encoding: {0}")]
    HexError(String),

    /// Salt or IV generation failed
    #[error(transparent)]
    Drbg(#[from] DrbgError),

    /// Recovered key material is unusable
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for keystore operations
pub type KeystoreResult<T> = Result<T, KeystoreError>;
