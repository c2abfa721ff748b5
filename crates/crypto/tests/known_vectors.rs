//! Known-answer tests against the JSON vectors in `tests/fixtures/`
//!
//! The keystore fixtures use reduced KDF costs so they decrypt quickly.

use k256::elliptic_curve::PrimeField;
use k256::{FieldBytes, Scalar};
use serde::Deserialize;
use zilkey_crypto::keystore::{KdfMethod, Keystore, KeystoreError};
use zilkey_crypto::{
    from_bech32_address, is_valid_checksum_address, sign_with_k, to_bech32_address,
    to_checksum_address, verify, Address, PrivateKey, ZilKey,
};

const PASSWORD: &str = "zxcvbnm,";
const FIXTURE_PRIVATE_KEY: &str =
    "05C3CF3387F31202CD0798B7AA882327A1BD365331F90954A58C18F61BD08FFC";

#[derive(Deserialize)]
struct Vectors {
    keys: Vec<KeyVector>,
    checksum: Vec<ChecksumVector>,
    bech32: Vec<Bech32Vector>,
    schnorr: Vec<SchnorrVector>,
}

#[derive(Deserialize)]
struct KeyVector {
    private_key: String,
    public_key: String,
    address: String,
    checksum_address: String,
    bech32_address: String,
}

#[derive(Deserialize)]
struct ChecksumVector {
    address: String,
    checksum_address: String,
}

#[derive(Deserialize)]
struct Bech32Vector {
    address: String,
    bech32_address: String,
}

#[derive(Deserialize)]
struct SchnorrVector {
    private_key: String,
    message: String,
    k: String,
    r: String,
    s: String,
}

fn vectors() -> Vectors {
    serde_json::from_str(include_str!("fixtures/vectors.json")).expect("valid vectors.json")
}

fn fixture(name: &str) -> Keystore {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    Keystore::load(path).expect("fixture should load")
}

#[test]
fn test_key_vectors() {
    for v in vectors().keys {
        let key = ZilKey::from_hex(None, Some(v.private_key.as_str())).unwrap();

        assert_eq!(key.public_key().to_hex(), v.public_key.to_lowercase());
        assert_eq!(key.address().to_hex(), v.address);
        assert_eq!(key.address().to_checksum(), v.checksum_address);
        assert_eq!(key.address().to_bech32().unwrap(), v.bech32_address);

        // the pair reconstructs from both halves
        let pair =
            ZilKey::from_hex(Some(v.public_key.as_str()), Some(v.private_key.as_str())).unwrap();
        assert_eq!(pair, key);
    }
}

#[test]
fn test_checksum_vectors() {
    let vectors = vectors();
    let from_keys = vectors
        .keys
        .iter()
        .map(|v| (v.address.as_str(), v.checksum_address.as_str()));
    let explicit = vectors
        .checksum
        .iter()
        .map(|v| (v.address.as_str(), v.checksum_address.as_str()));

    for (address, checksum) in from_keys.chain(explicit) {
        assert_eq!(to_checksum_address(address).unwrap(), checksum);
        assert!(is_valid_checksum_address(checksum));
    }
}

#[test]
fn test_bech32_vectors() {
    for v in vectors().bech32 {
        assert_eq!(to_bech32_address(&v.address).unwrap(), v.bech32_address);
        assert_eq!(from_bech32_address(&v.bech32_address).unwrap(), v.address);
        assert_eq!(
            Address::parse(&v.bech32_address).unwrap(),
            Address::parse(&v.address).unwrap()
        );
    }
}

#[test]
fn test_schnorr_vectors() {
    for v in vectors().schnorr {
        let private_key = PrivateKey::from_hex(&v.private_key).unwrap();
        let message = hex::decode(&v.message).unwrap();
        let k_bytes = hex::decode(&v.k).unwrap();
        let k: Scalar = Option::from(Scalar::from_repr(FieldBytes::clone_from_slice(&k_bytes)))
            .expect("nonce in range");

        let signature = sign_with_k(&message, &private_key, &k).expect("non-degenerate nonce");
        assert_eq!(hex::encode(signature.r()), v.r);
        assert_eq!(hex::encode(signature.s()), v.s);
        assert!(verify(&message, &signature, &private_key.public_key()));
    }
}

#[test]
fn test_pbkdf2_fixture_decrypts() {
    let keystore = fixture("keystore_pbkdf2.json");
    assert_eq!(keystore.kdf(), KdfMethod::Pbkdf2);

    let key = keystore.decrypt(PASSWORD).unwrap();
    let expected = ZilKey::from_hex(None, Some(FIXTURE_PRIVATE_KEY)).unwrap();
    assert_eq!(key, expected);
}

#[test]
fn test_scrypt_fixture_decrypts() {
    let keystore = fixture("keystore_scrypt.json");
    assert_eq!(keystore.kdf(), KdfMethod::Scrypt);

    let key = keystore.decrypt(PASSWORD).unwrap();
    assert_eq!(
        key.address().to_checksum(),
        "0x95B27eC211f86748DD985E1424b4058E94aa5814"
    );
}

#[test]
fn test_full_param_set_fixtures_decrypt() {
    // kdfparams carrying {salt, n, c, r, p, dklen} for either kdf, no prf
    let expected = ZilKey::from_hex(None, Some(FIXTURE_PRIVATE_KEY)).unwrap();

    for (name, kdf) in [
        ("keystore_pbkdf2_full_params.json", KdfMethod::Pbkdf2),
        ("keystore_scrypt_full_params.json", KdfMethod::Scrypt),
    ] {
        let keystore = fixture(name);
        assert_eq!(keystore.kdf(), kdf);
        assert_eq!(keystore.decrypt(PASSWORD).unwrap(), expected);
        assert!(matches!(
            keystore.decrypt("zxcvbnm."),
            Err(KeystoreError::InvalidPassword)
        ));
    }
}

#[test]
fn test_fixture_wrong_password() {
    for name in ["keystore_pbkdf2.json", "keystore_scrypt.json"] {
        let result = fixture(name).decrypt("zxcvbnm.");
        assert!(matches!(result, Err(KeystoreError::InvalidPassword)));
    }
}

#[test]
fn test_fixture_tampered_fields() {
    // iv and ciphertext are both covered by the MAC
    let mut keystore = fixture("keystore_pbkdf2.json");
    keystore.crypto.cipherparams.iv = "00".repeat(16);
    assert!(matches!(
        keystore.decrypt(PASSWORD),
        Err(KeystoreError::InvalidPassword)
    ));

    let mut keystore = fixture("keystore_pbkdf2.json");
    keystore.crypto.mac = "00".repeat(32);
    assert!(matches!(
        keystore.decrypt(PASSWORD),
        Err(KeystoreError::InvalidPassword)
    ));

    let mut keystore = fixture("keystore_scrypt.json");
    keystore.address = "0x967e40168aF66f441b73c0146E26069bfc3acCC7".to_string();
    assert!(matches!(
        keystore.decrypt(PASSWORD),
        Err(KeystoreError::AddressMismatch)
    ));
}
