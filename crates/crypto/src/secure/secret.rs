//! Secret wrapper utilities
//!
//! Type aliases around the `secrecy` crate plus a fixed-size array for
//! private scalars.

use secrecy::{SecretBox, SecretString as SecrecySecretString};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A secret byte vector that is zeroized on drop.
///
/// Holds derived keys and decrypted keystore plaintext. The inner value can
/// only be reached through `expose_secret()`.
///
/// # Example
///
/// ```rust
/// use zilkey_crypto::secure::SecretBytes;
/// use secrecy::ExposeSecret;
///
/// let secret = SecretBytes::new(Box::new(vec![1, 2, 3, 4]));
/// assert_eq!(secret.expose_secret(), &vec![1, 2, 3, 4]);
/// ```
pub type SecretBytes = SecretBox<Vec<u8>>;

/// A secret string that is zeroized on drop, used for passwords.
pub type SecretString = SecrecySecretString;

/// A fixed-size secret byte array.
///
/// Private scalars leave [`crate::PrivateKey`] only inside one of these.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretArray<const N: usize> {
    inner: [u8; N],
}

impl<const N: usize> SecretArray<N> {
    /// Create a new secret array from bytes.
    pub fn new(bytes: [u8; N]) -> Self {
        Self { inner: bytes }
    }

    /// Expose the secret bytes.
    ///
    /// The returned reference should not be stored.
    pub fn expose_secret(&self) -> &[u8; N] {
        &self.inner
    }
}

impl<const N: usize> std::fmt::Debug for SecretArray<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretArray")
            .field("length", &N)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Extension trait for moving owned values into secret containers.
pub trait IntoSecret {
    /// The secret type this converts into.
    type Secret;

    /// Convert into a secret value.
    fn into_secret(self) -> Self::Secret;
}

impl IntoSecret for String {
    type Secret = SecretString;

    fn into_secret(self) -> Self::Secret {
        self.into()
    }
}

impl IntoSecret for Vec<u8> {
    type Secret = SecretBytes;

    fn into_secret(self) -> Self::Secret {
        SecretBox::new(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_array() {
        let arr = [0xABu8; 32];
        let secret = SecretArray::new(arr);
        assert_eq!(secret.expose_secret(), &arr);
    }

    #[test]
    fn test_secret_array_debug() {
        let secret = SecretArray::new([0xABu8; 32]);
        let debug = format!("{:?}", secret);

        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("length"));
        assert!(!debug.contains("171")); // 0xAB = 171
    }

    #[test]
    fn test_secret_array_zeroize() {
        let mut secret = SecretArray::new([0x5Au8; 16]);
        secret.zeroize();
        assert_eq!(secret.expose_secret(), &[0u8; 16]);
    }

    #[test]
    fn test_into_secret_string() {
        let secret = "zxcvbnm,".to_string().into_secret();
        let exposed: &str = secret.expose_secret();
        assert_eq!(exposed, "zxcvbnm,");
    }

    #[test]
    fn test_into_secret_bytes() {
        let secret = vec![1, 2, 3].into_secret();
        assert_eq!(secret.expose_secret(), &vec![1, 2, 3]);
    }
}
