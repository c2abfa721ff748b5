//! Password-based key derivation
//!
//! Two functions are supported, both producing a 32-byte key by default:
//! PBKDF2-HMAC-SHA256 (262144 iterations) and scrypt (n=8192, r=8, p=1).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::error::{KeystoreError, KeystoreResult};
use crate::drbg;
use crate::secure::SecretBytes;

pub const PBKDF2_ITERATIONS: u32 = 262_144;
pub const SCRYPT_N: u32 = 8192;
pub const SCRYPT_R: u32 = 8;
pub const SCRYPT_P: u32 = 1;
pub const DKLEN: u32 = 32;

/// Salt length in bytes
pub const SALT_LENGTH: usize = 32;

/// Longest accepted derived key in bytes
pub const MAX_DKLEN: u32 = 64;

/// Highest accepted PBKDF2 iteration count
pub const MAX_PBKDF2_ITERATIONS: u32 = 10_000_000;

/// Largest accepted scrypt working set (`128 * n * r` bytes)
pub const MAX_SCRYPT_MEMORY: u64 = 1 << 30;

/// Highest accepted scrypt parallelization
pub const MAX_SCRYPT_P: u32 = 16;

/// The only PRF accepted for PBKDF2
pub const PBKDF2_PRF: &str = "hmac-sha256";

/// Key derivation function selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KdfMethod {
    #[default]
    Pbkdf2,
    Scrypt,
}

impl KdfMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            KdfMethod::Pbkdf2 => "pbkdf2",
            KdfMethod::Scrypt => "scrypt",
        }
    }
}

impl fmt::Display for KdfMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KdfMethod {
    type Err = KeystoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pbkdf2" => Ok(KdfMethod::Pbkdf2),
            "scrypt" => Ok(KdfMethod::Scrypt),
            other => Err(KeystoreError::UnsupportedKdf(other.to_string())),
        }
    }
}

/// Cost parameters used when creating new keystores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfConfig {
    pub pbkdf2_iterations: u32,
    pub scrypt_n: u32,
    pub scrypt_r: u32,
    pub scrypt_p: u32,
    pub dklen: u32,
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            pbkdf2_iterations: PBKDF2_ITERATIONS,
            scrypt_n: SCRYPT_N,
            scrypt_r: SCRYPT_R,
            scrypt_p: SCRYPT_P,
            dklen: DKLEN,
        }
    }
}

/// `kdfparams` object of a keystore file
///
/// Serialized untagged; parsing goes through [`KdfParams::from_value`] so the
/// variant follows the keystore's `kdf` field. Fields belonging to the other
/// function are ignored.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum KdfParams {
    Pbkdf2 {
        /// Salt as hex string
        salt: String,
        /// Iteration count
        c: u32,
        /// Derived key length in bytes
        dklen: u32,
        prf: String,
    },
    Scrypt {
        /// Salt as hex string
        salt: String,
        /// CPU/memory cost parameter (must be power of 2)
        n: u32,
        /// Block size parameter
        r: u32,
        /// Parallelization parameter
        p: u32,
        /// Derived key length in bytes
        dklen: u32,
    },
}

#[derive(Deserialize)]
struct Pbkdf2Fields {
    salt: String,
    c: u32,
    dklen: u32,
    #[serde(default = "default_prf")]
    prf: String,
}

#[derive(Deserialize)]
struct ScryptFields {
    salt: String,
    n: u32,
    r: u32,
    p: u32,
    dklen: u32,
}

fn default_prf() -> String {
    PBKDF2_PRF.to_string()
}

impl KdfParams {
    /// Parameters for `method` with the costs from `config`
    pub fn new(method: KdfMethod, salt: &[u8], config: &KdfConfig) -> Self {
        let salt = hex::encode(salt);
        match method {
            KdfMethod::Pbkdf2 => KdfParams::Pbkdf2 {
                salt,
                c: config.pbkdf2_iterations,
                dklen: config.dklen,
                prf: PBKDF2_PRF.to_string(),
            },
            KdfMethod::Scrypt => KdfParams::Scrypt {
                salt,
                n: config.scrypt_n,
                r: config.scrypt_r,
                p: config.scrypt_p,
                dklen: config.dklen,
            },
        }
    }

    /// Parse a `kdfparams` object for `method`
    pub fn from_value(method: KdfMethod, value: serde_json::Value) -> KeystoreResult<Self> {
        let invalid = |e: serde_json::Error| {
            KeystoreError::InvalidKdfParams(format!("{} kdfparams: {}", method, e))
        };

        match method {
            KdfMethod::Pbkdf2 => {
                let fields: Pbkdf2Fields = serde_json::from_value(value).map_err(invalid)?;
                Ok(KdfParams::Pbkdf2 {
                    salt: fields.salt,
                    c: fields.c,
                    dklen: fields.dklen,
                    prf: fields.prf,
                })
            }
            KdfMethod::Scrypt => {
                let fields: ScryptFields = serde_json::from_value(value).map_err(invalid)?;
                Ok(KdfParams::Scrypt {
                    salt: fields.salt,
                    n: fields.n,
                    r: fields.r,
                    p: fields.p,
                    dklen: fields.dklen,
                })
            }
        }
    }

    /// The function these parameters belong to
    pub fn method(&self) -> KdfMethod {
        match self {
            KdfParams::Pbkdf2 { .. } => KdfMethod::Pbkdf2,
            KdfParams::Scrypt { .. } => KdfMethod::Scrypt,
        }
    }

    pub fn dklen(&self) -> u32 {
        match self {
            KdfParams::Pbkdf2 { dklen, .. } | KdfParams::Scrypt { dklen, .. } => *dklen,
        }
    }

    fn salt_bytes(&self) -> KeystoreResult<Vec<u8>> {
        let salt = match self {
            KdfParams::Pbkdf2 { salt, .. } | KdfParams::Scrypt { salt, .. } => salt,
        };
        hex::decode(salt)
            .map_err(|e| KeystoreError::InvalidKdfParams(format!("invalid salt hex: {}", e)))
    }

    /// Validate the parameters
    pub fn validate(&self) -> KeystoreResult<()> {
        if !(DKLEN..=MAX_DKLEN).contains(&self.dklen()) {
            return Err(KeystoreError::InvalidKdfParams(format!(
                "dklen must be between {} and {}",
                DKLEN, MAX_DKLEN
            )));
        }

        match self {
            KdfParams::Pbkdf2 { c, prf, .. } => {
                if prf != PBKDF2_PRF {
                    return Err(KeystoreError::InvalidKdfParams(format!(
                        "unsupported prf: {}",
                        prf
                    )));
                }
                if *c == 0 || *c > MAX_PBKDF2_ITERATIONS {
                    return Err(KeystoreError::InvalidKdfParams(format!(
                        "c must be between 1 and {}",
                        MAX_PBKDF2_ITERATIONS
                    )));
                }
            }
            KdfParams::Scrypt { n, r, p, .. } => {
                if *n < 2 || !n.is_power_of_two() {
                    return Err(KeystoreError::InvalidKdfParams(
                        "n must be a power of 2".to_string(),
                    ));
                }
                if *r == 0 || *p == 0 {
                    return Err(KeystoreError::InvalidKdfParams(
                        "r and p must be positive".to_string(),
                    ));
                }
                if 128 * u64::from(*n) * u64::from(*r) > MAX_SCRYPT_MEMORY || *p > MAX_SCRYPT_P {
                    return Err(KeystoreError::InvalidKdfParams(format!(
                        "scrypt cost n={} r={} p={} exceeds limits",
                        n, r, p
                    )));
                }
            }
        }

        self.salt_bytes().map(|_| ())
    }

    /// Derive a key from the given password
    pub fn derive_key(&self, password: &[u8]) -> KeystoreResult<SecretBytes> {
        self.validate()?;
        let salt = self.salt_bytes()?;

        match self {
            KdfParams::Pbkdf2 { c, dklen, .. } => {
                Ok(pbkdf2_derive_key(password, &salt, *c, *dklen as usize))
            }
            KdfParams::Scrypt { n, r, p, dklen, .. } => {
                scrypt_derive_key(password, &salt, *n, *r, *p, *dklen as usize)
            }
        }
    }
}

/// Derive a key using PBKDF2-HMAC-SHA256
pub fn pbkdf2_derive_key(password: &[u8], salt: &[u8], c: u32, dklen: usize) -> SecretBytes {
    let mut output = vec![0u8; dklen];
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, c, &mut output);
    secrecy::SecretBox::new(Box::new(output))
}

/// Derive a key using scrypt
///
/// `n` must be a power of two.
pub fn scrypt_derive_key(
    password: &[u8],
    salt: &[u8],
    n: u32,
    r: u32,
    p: u32,
    dklen: usize,
) -> KeystoreResult<SecretBytes> {
    if n < 2 || !n.is_power_of_two() {
        return Err(KeystoreError::InvalidKdfParams(
            "n must be a power of 2".to_string(),
        ));
    }
    let log_n = n.trailing_zeros() as u8;

    let params = scrypt::Params::new(log_n, r, p, dklen)
        .map_err(|e| KeystoreError::InvalidKdfParams(e.to_string()))?;

    let mut output = vec![0u8; dklen];
    scrypt::scrypt(password, salt, &params, &mut output)
        .map_err(|e| KeystoreError::KdfError(e.to_string()))?;

    Ok(secrecy::SecretBox::new(Box::new(output)))
}

/// Generate a random salt from a fresh DRBG session
pub fn generate_salt() -> KeystoreResult<Vec<u8>> {
    Ok(drbg::random_bytes(SALT_LENGTH)?)
}
