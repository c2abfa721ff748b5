//! HMAC_DRBG (NIST SP 800-90A) over SHA-256
//!
//! Each [`HmacDrbg`] value is one generation session: it is instantiated from
//! caller-supplied entropy, produces output until its reseed interval runs
//! out, and is dropped. Sessions are never shared; [`random_below`] and
//! [`random_bytes`] open a fresh one per call.

use alloy_primitives::U256;
use rand::RngCore;
use thiserror::Error;
use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::hash::hmac_sha256;

/// Output length of the underlying HMAC in bytes
pub const OUTLEN: usize = 32;

/// Highest supported security strength in bits
pub const MAX_SECURITY_STRENGTH: usize = 256;

/// Longest accepted personalization string in bits
pub const MAX_PERSONALIZATION_BITS: usize = 256;

/// Largest single `generate` request in bits
pub const MAX_BITS_PER_REQUEST: usize = 7500;

/// Number of `generate` calls allowed between reseeds
pub const RESEED_INTERVAL: u64 = 10_000;

/// Fresh entropy drawn from the system per seeding step
pub const ENTROPY_BYTES: usize = 32;

/// Domain-separation string used by [`random_below`]
pub const PERSONALIZATION: &[u8] = b"zilkey_hmac_drbg";

/// DRBG configuration and state errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DrbgError {
    /// Seed material is shorter than the security strength requires
    #[error("entropy must be at least {required} bits, got {actual}")]
    EntropyTooShort { required: usize, actual: usize },

    /// Personalization string exceeds 256 bits
    #[error("personalization string cannot exceed 256 bits")]
    PersonalizationTooLong,

    /// Requested security strength above what the instance (or HMAC-SHA256) offers
    #[error("requested security strength {requested} exceeds {available} bits")]
    SecurityStrengthTooHigh { requested: usize, available: usize },

    /// Single request above 7500 bits
    #[error("cannot generate more than 7500 bits in a single call")]
    RequestTooLarge,

    /// `random_below` called with a zero boundary
    #[error("boundary must be greater than zero")]
    InvalidBoundary,

    /// Reseed interval reached; the caller must reseed before generating
    #[error("reseed required")]
    Exhausted,
}

/// Result type for DRBG operations
pub type DrbgResult<T> = Result<T, DrbgError>;

/// HMAC_DRBG generator state
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct HmacDrbg {
    key: [u8; OUTLEN],
    value: [u8; OUTLEN],
    reseed_counter: u64,
    security_strength: usize,
}

impl HmacDrbg {
    /// Instantiate at the default 256-bit security strength.
    ///
    /// `entropy` is the concatenation of entropy input and nonce and must be
    /// at least 384 bits long.
    pub fn new(entropy: &[u8], personalization: &[u8]) -> DrbgResult<Self> {
        Self::with_security_strength(entropy, personalization, MAX_SECURITY_STRENGTH)
    }

    /// Instantiate at an explicit security strength.
    ///
    /// The strength is rounded up to one of 112, 128, 192 or 256 bits.
    pub fn with_security_strength(
        entropy: &[u8],
        personalization: &[u8],
        requested_strength: usize,
    ) -> DrbgResult<Self> {
        if requested_strength > MAX_SECURITY_STRENGTH {
            return Err(DrbgError::SecurityStrengthTooHigh {
                requested: requested_strength,
                available: MAX_SECURITY_STRENGTH,
            });
        }

        if personalization.len() * 8 > MAX_PERSONALIZATION_BITS {
            return Err(DrbgError::PersonalizationTooLong);
        }

        let security_strength = match requested_strength {
            0..=112 => 112,
            113..=128 => 128,
            129..=192 => 192,
            _ => 256,
        };

        // entropy must carry 1.5x the security strength
        if entropy.len() * 8 * 2 < security_strength * 3 {
            return Err(DrbgError::EntropyTooShort {
                required: security_strength * 3 / 2,
                actual: entropy.len() * 8,
            });
        }

        let mut drbg = Self {
            key: [0x00; OUTLEN],
            value: [0x01; OUTLEN],
            reseed_counter: 1,
            security_strength,
        };

        let mut seed_material = Zeroizing::new(Vec::with_capacity(
            entropy.len() + personalization.len(),
        ));
        seed_material.extend_from_slice(entropy);
        seed_material.extend_from_slice(personalization);
        drbg.update(Some(seed_material.as_slice()));

        Ok(drbg)
    }

    /// Security strength of this instance in bits
    pub fn security_strength(&self) -> usize {
        self.security_strength
    }

    /// Mix fresh entropy into the state and reset the reseed counter.
    pub fn reseed(&mut self, entropy: &[u8]) -> DrbgResult<()> {
        if entropy.len() * 8 < self.security_strength {
            return Err(DrbgError::EntropyTooShort {
                required: self.security_strength,
                actual: entropy.len() * 8,
            });
        }

        self.update(Some(entropy));
        self.reseed_counter = 1;
        Ok(())
    }

    /// Produce `num_bytes` of output at the instance's security strength.
    pub fn generate(&mut self, num_bytes: usize) -> DrbgResult<Vec<u8>> {
        self.generate_with_strength(num_bytes, self.security_strength)
    }

    /// Produce `num_bytes` of output, rejecting strengths the instance cannot meet.
    ///
    /// Returns [`DrbgError::Exhausted`] once the reseed interval is reached.
    pub fn generate_with_strength(
        &mut self,
        num_bytes: usize,
        requested_strength: usize,
    ) -> DrbgResult<Vec<u8>> {
        if num_bytes * 8 > MAX_BITS_PER_REQUEST {
            return Err(DrbgError::RequestTooLarge);
        }

        if requested_strength > self.security_strength {
            return Err(DrbgError::SecurityStrengthTooHigh {
                requested: requested_strength,
                available: self.security_strength,
            });
        }

        if self.reseed_counter >= RESEED_INTERVAL {
            return Err(DrbgError::Exhausted);
        }

        let mut output = Vec::with_capacity(num_bytes + OUTLEN);
        while output.len() < num_bytes {
            self.value = hmac_sha256(&self.key, &[&self.value]);
            output.extend_from_slice(&self.value);
        }
        output.truncate(num_bytes);

        self.update(None);
        self.reseed_counter += 1;

        Ok(output)
    }

    fn update(&mut self, provided_data: Option<&[u8]>) {
        let data = provided_data.unwrap_or_default();

        self.key = hmac_sha256(&self.key, &[&self.value, &[0x00], data]);
        self.value = hmac_sha256(&self.key, &[&self.value]);

        if provided_data.is_some() {
            self.key = hmac_sha256(&self.key, &[&self.value, &[0x01], data]);
            self.value = hmac_sha256(&self.key, &[&self.value]);
        }
    }
}

impl std::fmt::Debug for HmacDrbg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacDrbg")
            .field("state", &"[REDACTED]")
            .field("reseed_counter", &self.reseed_counter)
            .field("security_strength", &self.security_strength)
            .finish()
    }
}

/// Draw a uniform integer in `[0, boundary)` by rejection sampling.
///
/// The session is seeded with `nonce` (or fresh system randomness) followed
/// by fresh system randomness, and reseeded transparently when exhausted.
pub fn random_below(boundary: U256, nonce: Option<&[u8]>) -> DrbgResult<U256> {
    if boundary.is_zero() {
        return Err(DrbgError::InvalidBoundary);
    }

    let mut rng = rand::thread_rng();

    let nonce = Zeroizing::new(match nonce {
        Some(nonce) => nonce.to_vec(),
        None => fresh_entropy(&mut rng),
    });

    let mut entropy = Zeroizing::new(nonce.to_vec());
    entropy.extend_from_slice(&fresh_entropy(&mut rng));

    let mut drbg = HmacDrbg::new(&entropy, PERSONALIZATION)?;
    sample_below(&mut drbg, boundary, &nonce, &mut rng)
}

/// `num_bytes` of output from a fresh session seeded with system randomness.
///
/// Used for keystore salts and IVs.
pub fn random_bytes(num_bytes: usize) -> DrbgResult<Vec<u8>> {
    let mut rng = rand::thread_rng();
    let mut entropy = Zeroizing::new(fresh_entropy(&mut rng));
    entropy.extend_from_slice(&fresh_entropy(&mut rng));

    HmacDrbg::new(&entropy, PERSONALIZATION)?.generate(num_bytes)
}

/// Rejection-sample from `drbg`, reseeding with `reseed_prefix` followed by
/// fresh randomness whenever the session runs out.
fn sample_below<R: RngCore>(
    drbg: &mut HmacDrbg,
    boundary: U256,
    reseed_prefix: &[u8],
    rng: &mut R,
) -> DrbgResult<U256> {
    let num_bytes = boundary.bit_len().div_ceil(8);

    loop {
        let draw = match drbg.generate(num_bytes) {
            Ok(bytes) => Zeroizing::new(bytes),
            Err(DrbgError::Exhausted) => {
                warn!("reseeding HMAC-DRBG session");
                let mut seed = Zeroizing::new(reseed_prefix.to_vec());
                seed.extend_from_slice(&fresh_entropy(rng));
                drbg.reseed(&seed)?;
                continue;
            }
            Err(e) => return Err(e),
        };

        let candidate = U256::from_be_slice(&draw);
        if candidate < boundary {
            return Ok(candidate);
        }
    }
}

fn fresh_entropy<R: RngCore>(rng: &mut R) -> Vec<u8> {
    let mut bytes = vec![0u8; ENTROPY_BYTES];
    rng.fill_bytes(&mut bytes);
    bytes
}
