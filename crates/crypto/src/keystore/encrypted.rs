//! Encrypted keystore file
//!
//! Combines the KDF, cipher and MAC modules into the version 3 JSON
//! container:
//!
//! ```json
//! {
//!   "address": "0x…",
//!   "crypto": {
//!     "cipher": "aes-128-ctr",
//!     "cipherparams": { "iv": "…" },
//!     "ciphertext": "…",
//!     "kdf": "pbkdf2",
//!     "kdfparams": { "salt": "…", "c": 262144, "dklen": 32, "prf": "hmac-sha256" },
//!     "mac": "…"
//!   },
//!   "id": "…",
//!   "version": 3
//! }
//! ```

use std::fs;
use std::path::Path;

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::cipher::{decrypt_secret, encrypt_secret, generate_iv, CipherParams, CIPHER_NAME};
use super::error::{KeystoreError, KeystoreResult};
use super::kdf::{generate_salt, KdfConfig, KdfMethod, KdfParams};
use super::mac::{compute_mac, constant_time_eq, verify_mac};
use crate::address::Address;
use crate::error::CryptoError;
use crate::keys::{PrivateKey, ZilKey};

/// Version number for keystores
pub const KEYSTORE_VERSION: u32 = 3;

/// Password-encrypted private key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keystore {
    /// Address of the encrypted key, any accepted encoding
    pub address: String,
    /// Crypto parameters (KDF + cipher + MAC)
    pub crypto: CryptoSection,
    /// Unique identifier
    pub id: Uuid,
    /// Schema version
    pub version: u32,
}

/// `crypto` object of a keystore file
///
/// `kdfparams` is parsed according to `kdf`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCryptoSection")]
pub struct CryptoSection {
    pub cipher: String,
    pub cipherparams: CipherParams,
    /// Encrypted private key as hex string
    pub ciphertext: String,
    pub kdf: String,
    pub kdfparams: KdfParams,
    /// Integrity tag as hex string
    pub mac: String,
}

#[derive(Deserialize)]
struct RawCryptoSection {
    cipher: String,
    cipherparams: CipherParams,
    ciphertext: String,
    kdf: String,
    kdfparams: serde_json::Value,
    mac: String,
}

impl TryFrom<RawCryptoSection> for CryptoSection {
    type Error = KeystoreError;

    fn try_from(raw: RawCryptoSection) -> KeystoreResult<Self> {
        let method: KdfMethod = raw.kdf.parse()?;
        let kdfparams = KdfParams::from_value(method, raw.kdfparams)?;

        Ok(Self {
            cipher: raw.cipher,
            cipherparams: raw.cipherparams,
            ciphertext: raw.ciphertext,
            kdf: raw.kdf,
            kdfparams,
            mac: raw.mac,
        })
    }
}

impl Keystore {
    /// Encrypt `private_key` with default cost parameters
    pub fn encrypt(
        private_key: &PrivateKey,
        password: &str,
        kdf: KdfMethod,
    ) -> KeystoreResult<Self> {
        KeystoreBuilder::new()
            .private_key(private_key)
            .password(password)
            .kdf(kdf)
            .build()
    }

    /// Check the container format without touching the password
    pub fn validate(&self) -> KeystoreResult<()> {
        if self.version != KEYSTORE_VERSION {
            return Err(KeystoreError::UnsupportedVersion(self.version));
        }

        if self.crypto.cipher != CIPHER_NAME {
            return Err(KeystoreError::UnsupportedCipher(self.crypto.cipher.clone()));
        }

        let method: KdfMethod = self.crypto.kdf.parse()?;
        if method != self.crypto.kdfparams.method() {
            return Err(KeystoreError::InvalidKdfParams(format!(
                "kdfparams do not match kdf {}",
                method
            )));
        }

        self.crypto.kdfparams.validate()?;
        self.crypto.cipherparams.iv_bytes()?;
        Ok(())
    }

    /// Decrypt the keystore and return the signing key
    ///
    /// A wrong password and a modified file both fail with
    /// [`KeystoreError::InvalidPassword`].
    pub fn decrypt(&self, password: &str) -> KeystoreResult<ZilKey> {
        self.validate()?;

        let iv = self.crypto.cipherparams.iv_bytes()?;
        let ciphertext = decode_hex("ciphertext", &self.crypto.ciphertext)?;
        let expected_mac = decode_hex("mac", &self.crypto.mac)?;

        let derived_key = self.crypto.kdfparams.derive_key(password.as_bytes())?;
        let dk_bytes = derived_key.expose_secret();

        if !verify_mac(dk_bytes, &ciphertext, &iv, &self.crypto.cipher, &expected_mac)? {
            return Err(KeystoreError::InvalidPassword);
        }

        let plaintext = decrypt_secret(&ciphertext, dk_bytes, &iv)?;
        let key = ZilKey::from_private_key(PrivateKey::from_bytes(plaintext.expose_secret())?);

        let stored = Address::parse(&self.address).map_err(|_| KeystoreError::AddressMismatch)?;
        if !constant_time_eq(stored.as_bytes(), key.address().as_bytes()) {
            return Err(KeystoreError::AddressMismatch);
        }

        debug!(id = %self.id, kdf = %self.crypto.kdf, "decrypted keystore");
        Ok(key)
    }

    /// Save keystore to a file
    ///
    /// Creates the file with restricted permissions (0600).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> KeystoreResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.to_json()?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(path, permissions)?;
        }

        debug!(path = %path.display(), id = %self.id, kdf = %self.crypto.kdf, "saved keystore");
        Ok(())
    }

    /// Load keystore from a file
    pub fn load<P: AsRef<Path>>(path: P) -> KeystoreResult<Self> {
        let path = path.as_ref();
        let keystore = Self::from_json(&fs::read_to_string(path)?)?;
        debug!(path = %path.display(), id = %keystore.id, kdf = %keystore.crypto.kdf, "loaded keystore");
        Ok(keystore)
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> KeystoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate JSON
    pub fn from_json(json: &str) -> KeystoreResult<Self> {
        let keystore: Self = serde_json::from_str(json)?;
        keystore.validate()?;
        Ok(keystore)
    }

    /// Stored address, normalized
    pub fn address(&self) -> KeystoreResult<Address> {
        Ok(Address::parse(&self.address)?)
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    /// KDF used by this keystore
    pub fn kdf(&self) -> KdfMethod {
        self.crypto.kdfparams.method()
    }
}

fn decode_hex(field: &str, value: &str) -> KeystoreResult<Vec<u8>> {
    hex::decode(value).map_err(|e| KeystoreError::HexError(format!("invalid {} hex: {}", field, e)))
}

/// Builder for creating Keystore instances
pub struct KeystoreBuilder<'a> {
    private_key: Option<&'a PrivateKey>,
    password: Option<&'a str>,
    kdf: KdfMethod,
    kdf_config: KdfConfig,
    id: Option<Uuid>,
}

impl Default for KeystoreBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> KeystoreBuilder<'a> {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            private_key: None,
            password: None,
            kdf: KdfMethod::default(),
            kdf_config: KdfConfig::default(),
            id: None,
        }
    }

    /// Set the key to encrypt
    pub fn private_key(mut self, private_key: &'a PrivateKey) -> Self {
        self.private_key = Some(private_key);
        self
    }

    /// Set the password for key derivation
    pub fn password(mut self, password: &'a str) -> Self {
        self.password = Some(password);
        self
    }

    /// Select the KDF (default: PBKDF2)
    pub fn kdf(mut self, kdf: KdfMethod) -> Self {
        self.kdf = kdf;
        self
    }

    /// Override the KDF cost parameters
    pub fn kdf_config(mut self, config: KdfConfig) -> Self {
        self.kdf_config = config;
        self
    }

    /// Set a custom id (normally a random UUIDv4)
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Build the keystore
    pub fn build(self) -> KeystoreResult<Keystore> {
        let private_key = self.private_key.ok_or(CryptoError::MissingPrivateKey)?;
        let password = self.password.ok_or(KeystoreError::MissingPassword)?;

        let salt = generate_salt()?;
        let iv = generate_iv()?;

        let kdfparams = KdfParams::new(self.kdf, &salt, &self.kdf_config);
        let derived_key = kdfparams.derive_key(password.as_bytes())?;
        let dk_bytes = derived_key.expose_secret();

        let secret = private_key.to_bytes();
        let ciphertext = encrypt_secret(secret.expose_secret(), dk_bytes, &iv)?;
        let mac = compute_mac(dk_bytes, &ciphertext, &iv, CIPHER_NAME)?;

        let id = self.id.unwrap_or_else(Uuid::new_v4);
        debug!(%id, kdf = %self.kdf, "encrypted keystore");

        Ok(Keystore {
            address: private_key.public_key().address().to_checksum(),
            crypto: CryptoSection {
                cipher: CIPHER_NAME.to_string(),
                cipherparams: CipherParams::new(&iv),
                ciphertext: hex::encode(&ciphertext),
                kdf: self.kdf.to_string(),
                kdfparams,
                mac: hex::encode(mac),
            },
            id,
            version: KEYSTORE_VERSION,
        })
    }
}
