//! AES-128-CTR encryption of the private key
//!
//! The AES key is the first 16 bytes of the derived key; the IV is the
//! initial 128-bit big-endian counter block.

use aes::Aes128;
use cipher::{KeyIvInit, StreamCipher};
use ctr::Ctr128BE;
use serde::{Deserialize, Serialize};

use super::error::{KeystoreError, KeystoreResult};
use crate::drbg;
use crate::secure::SecretBytes;

/// Cipher identifier stored in the keystore and mixed into the MAC
pub const CIPHER_NAME: &str = "aes-128-ctr";

/// IV (initialization vector) length for AES-128-CTR
pub const IV_LENGTH: usize = 16;

/// AES-128 key length
pub const AES_KEY_LENGTH: usize = 16;

type Aes128Ctr = Ctr128BE<Aes128>;

/// `cipherparams` object of a keystore file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CipherParams {
    /// Initialization vector as hex string
    pub iv: String,
}

impl CipherParams {
    pub fn new(iv: &[u8]) -> Self {
        Self { iv: hex::encode(iv) }
    }

    /// Decoded IV, checked to be 16 bytes
    pub fn iv_bytes(&self) -> KeystoreResult<[u8; IV_LENGTH]> {
        let iv = hex::decode(&self.iv)
            .map_err(|e| KeystoreError::InvalidCipherParams(format!("invalid IV hex: {}", e)))?;

        iv.as_slice().try_into().map_err(|_| {
            KeystoreError::InvalidCipherParams(format!(
                "IV must be {} bytes, got {}",
                IV_LENGTH,
                iv.len()
            ))
        })
    }
}

/// Encrypt `secret` under `derived_key[..16]`
pub fn encrypt_secret(secret: &[u8], derived_key: &[u8], iv: &[u8]) -> KeystoreResult<Vec<u8>> {
    let mut ciphertext = secret.to_vec();
    apply_keystream(&mut ciphertext, derived_key, iv)?;
    Ok(ciphertext)
}

/// Decrypt `ciphertext` under `derived_key[..16]`
pub fn decrypt_secret(
    ciphertext: &[u8],
    derived_key: &[u8],
    iv: &[u8],
) -> KeystoreResult<SecretBytes> {
    let mut plaintext = ciphertext.to_vec();
    apply_keystream(&mut plaintext, derived_key, iv)?;
    Ok(secrecy::SecretBox::new(Box::new(plaintext)))
}

fn apply_keystream(buffer: &mut [u8], derived_key: &[u8], iv: &[u8]) -> KeystoreResult<()> {
    let key = derived_key.get(..AES_KEY_LENGTH).ok_or_else(|| {
        KeystoreError::CipherError(format!(
            "derived key must be at least {} bytes, got {}",
            AES_KEY_LENGTH,
            derived_key.len()
        ))
    })?;

    let mut cipher = Aes128Ctr::new_from_slices(key, iv).map_err(|_| {
        KeystoreError::InvalidCipherParams(format!(
            "IV must be {} bytes, got {}",
            IV_LENGTH,
            iv.len()
        ))
    })?;

    cipher.apply_keystream(buffer);
    Ok(())
}

/// Generate a random IV from a fresh DRBG session
pub fn generate_iv() -> KeystoreResult<[u8; IV_LENGTH]> {
    let mut iv = [0u8; IV_LENGTH];
    iv.copy_from_slice(&drbg::random_bytes(IV_LENGTH)?);
    Ok(iv)
}
