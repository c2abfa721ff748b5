//! Zilliqa key pairs over secp256k1
//!
//! A [`ZilKey`] is either verification-only ([`ZilKey::PublicOnly`]) or a
//! full signing pair ([`ZilKey::KeyPair`]). Construction checks that the two
//! halves of a pair agree, so a `KeyPair` value always satisfies
//! `public == private * G`.

use std::fs;
use std::path::Path;

use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{FieldBytes, ProjectivePoint, Scalar, SecretKey};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::address::Address;
use crate::error::{CryptoError, CryptoResult};
use crate::schnorr::{self, Signature};
use crate::secure::SecretArray;

/// Private scalar length in bytes
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Compressed SEC1 public key length (parity byte + x)
pub const COMPRESSED_PUBLIC_KEY_LENGTH: usize = 33;

/// Uncompressed SEC1 public key length (0x04 + x + y)
pub const UNCOMPRESSED_PUBLIC_KEY_LENGTH: usize = 65;

/// Secp256k1 private scalar in `[1, q-1]`
///
/// Not `Clone`: the scalar has exactly one owner and is zeroized on drop.
pub struct PrivateKey(SecretKey);

impl PrivateKey {
    /// Generate a new random private key
    pub fn generate<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        Self(SecretKey::random(rng))
    }

    /// Load from big-endian bytes.
    ///
    /// Inputs shorter than 32 bytes are left-padded with zeros, matching
    /// integers serialized without leading zero bytes.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.is_empty() || bytes.len() > PRIVATE_KEY_LENGTH {
            return Err(CryptoError::InvalidSecretKey);
        }

        let mut padded = Zeroizing::new([0u8; PRIVATE_KEY_LENGTH]);
        padded[PRIVATE_KEY_LENGTH - bytes.len()..].copy_from_slice(bytes);

        SecretKey::from_bytes(FieldBytes::from_slice(padded.as_slice()))
            .map(Self)
            .map_err(|_| CryptoError::InvalidSecretKey)
    }

    /// Load from a hex string, with or without `0x`
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let bytes = Zeroizing::new(hex::decode(strip_hex_prefix(s.trim()))?);
        Self::from_bytes(&bytes)
    }

    /// Serialize to 32 big-endian bytes
    pub fn to_bytes(&self) -> SecretArray<PRIVATE_KEY_LENGTH> {
        SecretArray::new(self.0.to_bytes().into())
    }

    /// Get the corresponding public key
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.public_key())
    }

    pub(crate) fn scalar(&self) -> Scalar {
        *self.0.to_nonzero_scalar()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for PrivateKey {}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Secp256k1 public key
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(k256::PublicKey);

impl PublicKey {
    /// Decode a compressed (33 byte) or uncompressed (65 byte) SEC1 point
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != COMPRESSED_PUBLIC_KEY_LENGTH
            && bytes.len() != UNCOMPRESSED_PUBLIC_KEY_LENGTH
        {
            return Err(CryptoError::InvalidPublicKey);
        }

        k256::PublicKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidPublicKey)
    }

    /// Decode from hex, with or without `0x`, in either case
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let bytes = hex::decode(strip_hex_prefix(s.trim()))?;
        Self::from_bytes(&bytes)
    }

    /// Serialize to compressed bytes (33 bytes)
    pub fn to_compressed_bytes(&self) -> [u8; COMPRESSED_PUBLIC_KEY_LENGTH] {
        let encoded = self.0.to_encoded_point(true);
        let mut result = [0u8; COMPRESSED_PUBLIC_KEY_LENGTH];
        result.copy_from_slice(encoded.as_bytes());
        result
    }

    /// Serialize to uncompressed bytes (65 bytes, with 0x04 prefix)
    pub fn to_uncompressed_bytes(&self) -> [u8; UNCOMPRESSED_PUBLIC_KEY_LENGTH] {
        let encoded = self.0.to_encoded_point(false);
        let mut result = [0u8; UNCOMPRESSED_PUBLIC_KEY_LENGTH];
        result.copy_from_slice(encoded.as_bytes());
        result
    }

    /// Lowercase hex of the compressed encoding
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed_bytes())
    }

    /// Derive the 20-byte account address
    pub fn address(&self) -> Address {
        Address::from_public_key(self)
    }

    /// Verify a Schnorr signature over `message`
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        schnorr::verify(message, signature, self)
    }

    pub(crate) fn to_projective(self) -> ProjectivePoint {
        self.0.to_projective()
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Zilliqa key: verification-only or a full signing pair
#[derive(Debug, PartialEq, Eq)]
pub enum ZilKey {
    /// Public key only; can verify and derive addresses
    PublicOnly(PublicKey),
    /// Matching public and private key
    KeyPair {
        public: PublicKey,
        private: PrivateKey,
    },
}

impl ZilKey {
    /// Generate a new random signing key
    pub fn generate() -> Self {
        Self::from_private_key(PrivateKey::generate(&mut rand::thread_rng()))
    }

    /// Build a signing key, deriving the public half
    pub fn from_private_key(private: PrivateKey) -> Self {
        let public = private.public_key();
        ZilKey::KeyPair { public, private }
    }

    /// Build a verification-only key
    pub fn from_public_key(public: PublicKey) -> Self {
        ZilKey::PublicOnly(public)
    }

    /// Build a signing key from both halves, rejecting a mismatched pair
    pub fn from_parts(public: PublicKey, private: PrivateKey) -> CryptoResult<Self> {
        if private.public_key() != public {
            return Err(CryptoError::KeyMismatch);
        }
        Ok(ZilKey::KeyPair { public, private })
    }

    /// Build from optional hex strings; at least one must be present.
    pub fn from_hex(public: Option<&str>, private: Option<&str>) -> CryptoResult<Self> {
        match (public, private) {
            (Some(public), Some(private)) => {
                Self::from_parts(PublicKey::from_hex(public)?, PrivateKey::from_hex(private)?)
            }
            (Some(public), None) => Ok(Self::from_public_key(PublicKey::from_hex(public)?)),
            (None, Some(private)) => Ok(Self::from_private_key(PrivateKey::from_hex(private)?)),
            (None, None) => Err(CryptoError::MissingKeyMaterial),
        }
    }

    /// The public half
    pub fn public_key(&self) -> &PublicKey {
        match self {
            ZilKey::PublicOnly(public) => public,
            ZilKey::KeyPair { public, .. } => public,
        }
    }

    /// The private half, if this key can sign
    pub fn private_key(&self) -> Option<&PrivateKey> {
        match self {
            ZilKey::PublicOnly(_) => None,
            ZilKey::KeyPair { private, .. } => Some(private),
        }
    }

    /// Whether this key carries a private scalar
    pub fn can_sign(&self) -> bool {
        matches!(self, ZilKey::KeyPair { .. })
    }

    /// Address derived from the public key
    pub fn address(&self) -> Address {
        self.public_key().address()
    }

    /// Sign `message` with a fresh random nonce
    pub fn sign(&self, message: &[u8]) -> CryptoResult<Signature> {
        let private = self.private_key().ok_or(CryptoError::MissingPrivateKey)?;
        schnorr::sign(message, private)
    }

    /// Verify a signature over `message` against this key
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.public_key().verify(message, signature)
    }

    /// Load a raw key file holding `PUBLIC PRIVATE` hex tokens
    pub fn load_key_file<P: AsRef<Path>>(path: P) -> CryptoResult<Self> {
        let path = path.as_ref();
        let contents = Zeroizing::new(fs::read_to_string(path)?);

        let tokens: Vec<&str> = contents.split_whitespace().collect();
        let [public, private] = tokens.as_slice() else {
            return Err(CryptoError::InvalidKeyFile(format!(
                "expected 2 hex tokens, found {}",
                tokens.len()
            )));
        };

        debug!(path = %path.display(), "loaded raw key file");
        Self::from_parts(PublicKey::from_hex(public)?, PrivateKey::from_hex(private)?)
    }

    /// Write `PUBLIC PRIVATE` as uppercase hex.
    ///
    /// Creates the file with restricted permissions (0600).
    pub fn save_key_file<P: AsRef<Path>>(&self, path: P) -> CryptoResult<()> {
        let path = path.as_ref();
        let private = self.private_key().ok_or(CryptoError::MissingPrivateKey)?;

        let line = Zeroizing::new(format!(
            "{} {}",
            hex::encode_upper(self.public_key().to_compressed_bytes()),
            hex::encode_upper(private.to_bytes().expose_secret())
        ));

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, line.as_bytes())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        debug!(path = %path.display(), "saved raw key file");
        Ok(())
    }
}

pub(crate) fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PRIVATE: &str = "05C3CF3387F31202CD0798B7AA882327A1BD365331F90954A58C18F61BD08FFC";
    const PUBLIC: &str = "03949D29723DA4B2628224D3EC8E74C518ACA98C6630B00527F86B8349E982CB57";

    #[test]
    fn test_public_key_from_private() {
        let key = ZilKey::from_hex(None, Some(PRIVATE)).unwrap();
        assert_eq!(key.public_key().to_hex(), PUBLIC.to_lowercase());
        assert_eq!(
            key.address().to_hex(),
            "95b27ec211f86748dd985e1424b4058e94aa5814"
        );
    }

    #[test]
    fn test_public_only_key() {
        let key = ZilKey::from_hex(Some(format!("0x{}", PUBLIC).as_str()), None).unwrap();
        assert!(!key.can_sign());
        assert!(key.private_key().is_none());
        assert_eq!(
            key.address().to_hex(),
            "95b27ec211f86748dd985e1424b4058e94aa5814"
        );
        assert!(matches!(
            key.sign(b"message"),
            Err(CryptoError::MissingPrivateKey)
        ));
    }

    #[test]
    fn test_mismatched_pair_rejected() {
        let result = ZilKey::from_hex(
            Some("02A349FA10F0E6A614A38D6033588A422357F2C60AF2EEBAE15D06498DF8AF0B05"),
            Some("75889EA1AF5D402B69E61C654C74D8B569E363D2E271E1E6E2B63FDB9B635173"),
        );
        assert!(matches!(result, Err(CryptoError::KeyMismatch)));

        let key = ZilKey::from_hex(
            Some("02A349FA10F0E6A614A38D6033588A422357F2C60AF2EEBAE15D06498DF8AF0B05"),
            Some("75889EA1AF5D402B69E61C654C74D8B569E363D2E271E1E6E2B63FDB9B635174"),
        )
        .unwrap();
        assert_eq!(
            key.address().to_hex(),
            "967e40168af66f441b73c0146e26069bfc3accc7"
        );
    }

    #[test]
    fn test_missing_key_material() {
        assert!(matches!(
            ZilKey::from_hex(None, None),
            Err(CryptoError::MissingKeyMaterial)
        ));
    }

    #[test]
    fn test_private_key_range() {
        assert!(PrivateKey::from_bytes(&[0u8; 32]).is_err());
        assert!(PrivateKey::from_bytes(&[]).is_err());
        assert!(PrivateKey::from_bytes(&[1u8; 33]).is_err());
        // curve order q itself is out of range
        let order =
            hex::decode("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141").unwrap();
        assert!(PrivateKey::from_bytes(&order).is_err());
    }

    #[test]
    fn test_short_private_key_is_left_padded() {
        let short = PrivateKey::from_bytes(&[0x01]).unwrap();
        let mut full = [0u8; 32];
        full[31] = 1;
        assert_eq!(short, PrivateKey::from_bytes(&full).unwrap());
    }

    #[test]
    fn test_compressed_and_uncompressed_decode_to_same_point() {
        let key = ZilKey::generate();
        let public = key.public_key();

        let compressed = PublicKey::from_bytes(&public.to_compressed_bytes()).unwrap();
        let uncompressed = PublicKey::from_bytes(&public.to_uncompressed_bytes()).unwrap();

        assert_eq!(&compressed, public);
        assert_eq!(&uncompressed, public);
        assert_eq!(public.to_uncompressed_bytes()[0], 0x04);
    }

    #[test]
    fn test_invalid_public_key() {
        assert!(PublicKey::from_bytes(&[0x02; 32]).is_err());
        assert!(PublicKey::from_bytes(&[0x05; 33]).is_err());
        assert!(PublicKey::from_hex("not hex").is_err());
    }

    #[test]
    fn test_key_equality() {
        let a = ZilKey::from_hex(None, Some(PRIVATE)).unwrap();
        let b = ZilKey::from_hex(Some(PUBLIC), Some(PRIVATE)).unwrap();
        let public_only = ZilKey::from_hex(Some(PUBLIC), None).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, public_only);
        assert_ne!(a, ZilKey::generate());
    }

    #[test]
    fn test_private_key_debug_redacted() {
        let key = PrivateKey::from_hex(PRIVATE).unwrap();
        let debug = format!("{:?}", key);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.to_lowercase().contains("05c3cf"));
    }

    #[test]
    fn test_key_file_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mykey.txt");

        let key = ZilKey::from_hex(None, Some(PRIVATE)).unwrap();
        key.save_key_file(&path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, format!("{} {}", PUBLIC, PRIVATE));

        let loaded = ZilKey::load_key_file(&path).unwrap();
        assert_eq!(loaded, key);
    }

    #[test]
    fn test_key_file_rejects_bad_layout() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mykey.txt");

        fs::write(&path, PUBLIC).unwrap();
        assert!(matches!(
            ZilKey::load_key_file(&path),
            Err(CryptoError::InvalidKeyFile(_))
        ));
    }

    #[test]
    fn test_save_key_file_requires_private_key() {
        let temp_dir = TempDir::new().unwrap();
        let key = ZilKey::from_hex(Some(PUBLIC), None).unwrap();
        let result = key.save_key_file(temp_dir.path().join("mykey.txt"));
        assert!(matches!(result, Err(CryptoError::MissingPrivateKey)));
    }

    #[test]
    #[cfg(unix)]
    fn test_key_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mykey.txt");
        ZilKey::generate().save_key_file(&path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
