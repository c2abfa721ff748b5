//! Secure memory handling for key material
//!
//! Containers here zeroize on drop and print `[REDACTED]` from `Debug`.
//! None of them implement `Clone`, so a private scalar has one owner.
//!
//! # Example
//!
//! ```rust
//! use zilkey_crypto::secure::SecretArray;
//!
//! let scalar = SecretArray::new([7u8; 32]);
//! assert_eq!(scalar.expose_secret()[0], 7);
//! drop(scalar); // memory is zeroed
//! ```

mod secret;

pub use secret::{IntoSecret, SecretArray, SecretBytes, SecretString};
