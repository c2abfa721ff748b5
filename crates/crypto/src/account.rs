//! Account identity: an address with optional key material

use std::path::Path;

use crate::address::Address;
use crate::error::{CryptoError, CryptoResult};
use crate::keys::{PublicKey, ZilKey};
use crate::keystore::{KdfMethod, Keystore, KeystoreError, KeystoreResult};
use crate::schnorr::Signature;

/// An on-chain account
///
/// Watch-only accounts carry just an address. Keyed accounts always have an
/// address derived from their key.
#[derive(Debug)]
pub struct Account {
    address: Address,
    key: Option<ZilKey>,
}

impl Account {
    /// Build from any combination of address and key hex strings.
    ///
    /// At least one must be given. The address may be in any encoding; when
    /// combined with a key it must match the key's address.
    pub fn new(
        address: Option<&str>,
        public_key: Option<&str>,
        private_key: Option<&str>,
    ) -> CryptoResult<Self> {
        let address = address.map(Address::parse).transpose()?;

        if public_key.is_none() && private_key.is_none() {
            return match address {
                Some(address) => Ok(Self::from_address(address)),
                None => Err(CryptoError::MissingKeyMaterial),
            };
        }

        let key = ZilKey::from_hex(public_key, private_key)?;
        if let Some(address) = address {
            if address != key.address() {
                return Err(CryptoError::KeyMismatch);
            }
        }

        Ok(Self::from_zil_key(key))
    }

    /// Generate an account with a fresh random key
    pub fn generate() -> Self {
        Self::from_zil_key(ZilKey::generate())
    }

    /// Watch-only account
    pub fn from_address(address: Address) -> Self {
        Self { address, key: None }
    }

    pub fn from_zil_key(key: ZilKey) -> Self {
        Self {
            address: key.address(),
            key: Some(key),
        }
    }

    /// Load from a raw `PUBLIC PRIVATE` key file
    pub fn from_key_file<P: AsRef<Path>>(path: P) -> CryptoResult<Self> {
        ZilKey::load_key_file(path).map(Self::from_zil_key)
    }

    /// Load and decrypt a keystore file
    pub fn from_keystore<P: AsRef<Path>>(password: &str, path: P) -> KeystoreResult<Self> {
        let keystore = Keystore::load(path)?;
        keystore.decrypt(password).map(Self::from_zil_key)
    }

    /// Encrypt the private key into a keystore file
    pub fn save_keystore<P: AsRef<Path>>(
        &self,
        password: &str,
        path: P,
        kdf: KdfMethod,
    ) -> KeystoreResult<Keystore> {
        let private_key = self
            .key
            .as_ref()
            .and_then(ZilKey::private_key)
            .ok_or(KeystoreError::Crypto(CryptoError::MissingPrivateKey))?;

        let keystore = Keystore::encrypt(private_key, password, kdf)?;
        keystore.save(path)?;
        Ok(keystore)
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn checksum_address(&self) -> String {
        self.address.to_checksum()
    }

    pub fn bech32_address(&self) -> CryptoResult<String> {
        self.address.to_bech32()
    }

    pub fn public_key(&self) -> Option<&PublicKey> {
        self.key.as_ref().map(ZilKey::public_key)
    }

    pub fn zil_key(&self) -> Option<&ZilKey> {
        self.key.as_ref()
    }

    /// Sign `message` with the account's private key
    pub fn sign(&self, message: &[u8]) -> CryptoResult<Signature> {
        self.key
            .as_ref()
            .ok_or(CryptoError::MissingPrivateKey)?
            .sign(message)
    }

    /// Verify `signature`; watch-only accounts never verify
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.key
            .as_ref()
            .is_some_and(|key| key.verify(message, signature))
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        match (&self.key, &other.key) {
            (None, None) => self.address == other.address,
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Account {}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIVATE: &str = "05C3CF3387F31202CD0798B7AA882327A1BD365331F90954A58C18F61BD08FFC";
    const PUBLIC: &str = "03949D29723DA4B2628224D3EC8E74C518ACA98C6630B00527F86B8349E982CB57";
    const BECH32: &str = "zil1jke8ass3lpn53hvctc2zfdq936225kq5xrdunr";
    const CHECKSUM: &str = "0x95B27eC211f86748DD985E1424b4058E94aa5814";

    #[test]
    fn test_account_from_private_key() {
        let account = Account::new(None, None, Some(PRIVATE)).unwrap();

        assert_eq!(account.checksum_address(), CHECKSUM);
        assert_eq!(account.bech32_address().unwrap(), BECH32);
        assert_eq!(account.public_key().unwrap().to_hex(), PUBLIC.to_lowercase());
        assert!(account.zil_key().unwrap().can_sign());
    }

    #[test]
    fn test_address_only_account() {
        let account = Account::new(Some(BECH32), None, None).unwrap();

        assert_eq!(account.checksum_address(), CHECKSUM);
        assert!(account.public_key().is_none());
        assert!(matches!(
            account.sign(b"m"),
            Err(CryptoError::MissingPrivateKey)
        ));
    }

    #[test]
    fn test_address_must_match_key() {
        assert!(Account::new(Some(CHECKSUM), Some(PUBLIC), None).is_ok());
        assert!(Account::new(Some(BECH32), None, Some(PRIVATE)).is_ok());

        let other = Account::generate();
        let result = Account::new(Some(other.checksum_address().as_str()), None, Some(PRIVATE));
        assert!(matches!(result, Err(CryptoError::KeyMismatch)));
    }

    #[test]
    fn test_nothing_supplied() {
        assert!(matches!(
            Account::new(None, None, None),
            Err(CryptoError::MissingKeyMaterial)
        ));
    }

    #[test]
    fn test_equality() {
        let by_hex =
            Account::new(Some("95b27ec211f86748dd985e1424b4058e94aa5814"), None, None).unwrap();
        let by_bech32 = Account::new(Some(BECH32), None, None).unwrap();
        let keyed = Account::new(None, None, Some(PRIVATE)).unwrap();
        let keyed_again = Account::new(Some(BECH32), Some(PUBLIC), Some(PRIVATE)).unwrap();
        let public_only = Account::new(None, Some(PUBLIC), None).unwrap();

        assert_eq!(by_hex, by_bech32);
        assert_ne!(by_hex, keyed);
        assert_eq!(keyed, keyed_again);
        assert_ne!(keyed, public_only);
    }

    #[test]
    fn test_sign_and_verify() {
        let account = Account::generate();
        let signature = account.sign(b"transfer").unwrap();

        assert!(account.verify(b"transfer", &signature));
        assert!(!Account::from_address(*account.address()).verify(b"transfer", &signature));
    }

    #[test]
    fn test_keystore_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("account.json");

        let account = Account::new(None, None, Some(PRIVATE)).unwrap();
        account
            .save_keystore("password1", &path, KdfMethod::Scrypt)
            .unwrap();

        let loaded = Account::from_keystore("password1", &path).unwrap();
        assert_eq!(loaded, account);

        assert!(matches!(
            Account::from_keystore("password2", &path),
            Err(KeystoreError::InvalidPassword)
        ));
    }

    #[test]
    fn test_key_file_account() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("mykey.txt");
        std::fs::write(&path, format!("{} {}\n", PUBLIC, PRIVATE)).unwrap();

        let account = Account::from_key_file(&path).unwrap();
        assert_eq!(account.checksum_address(), CHECKSUM);
    }
}
