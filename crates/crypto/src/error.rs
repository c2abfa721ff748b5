//! Cryptographic error types

use thiserror::Error;

use crate::drbg::DrbgError;

/// Errors raised by key construction, signing and address handling
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Private key bytes are not a scalar in `[1, q-1]`
    #[error("invalid private key")]
    InvalidSecretKey,

    /// Public key bytes do not decode to a curve point
    #[error("invalid public key")]
    InvalidPublicKey,

    /// Public and private parts of a key pair disagree
    #[error("public/private key mismatch")]
    KeyMismatch,

    /// Neither public nor private key material was supplied
    #[error("public or private key is required")]
    MissingKeyMaterial,

    /// Signing requested on a verification-only key
    #[error("missing private key")]
    MissingPrivateKey,

    /// Signature bytes are malformed or out of range
    #[error("invalid signature encoding")]
    InvalidSignature,

    /// Address string is not 40 hex characters
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Bech32 string failed to decode or carries the wrong prefix
    #[error("invalid bech32 address: {0}")]
    InvalidBech32(String),

    /// Invalid hex encoding
    #[error("invalid hex encoding: {0}")]
    HexError(String),

    /// Raw key file is not two whitespace-separated hex tokens
    #[error("invalid key file: {0}")]
    InvalidKeyFile(String),

    /// Nonce generation failed
    #[error("random generator error: {0}")]
    Drbg(#[from] DrbgError),

    /// Key file I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<hex::FromHexError> for CryptoError {
    fn from(e: hex::FromHexError) -> Self {
        CryptoError::HexError(e.to_string())
    }
}

/// Result type for cryptographic operations
pub type CryptoResult<T> = Result<T, CryptoError>;
