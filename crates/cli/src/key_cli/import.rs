//! Key import command implementation
//!
//! Imports an existing private key from a raw key file (`PUBLIC PRIVATE`)
//! or from a file holding just the private key hex.

use super::common::{
    ensure_keys_dir, get_new_password, keystore_path, print_key_summary, validate_key_name,
};
use super::{resolve_kdf, write_keystore};
use crate::config::CliConfig;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;
use zilkey_crypto::{PrivateKey, ZilKey};

/// Where the imported key comes from
pub enum ImportSource {
    /// `PUBLIC PRIVATE` hex pair
    KeyFile(PathBuf),
    /// Private key hex only
    PrivateKeyFile(PathBuf),
}

/// Execute the import command
pub fn execute(
    home: &Path,
    name: &str,
    source: ImportSource,
    kdf: Option<String>,
    password_file: Option<PathBuf>,
    force: bool,
) -> Result<()> {
    validate_key_name(name)?;
    let config = CliConfig::load_or_default(home)?;
    let keys_dir = config.keys_dir(home);
    let path = keystore_path(&keys_dir, name);

    if path.exists() && !force {
        bail!(
            "Key '{}' already exists at {}. Use --force to overwrite.",
            name,
            path.display()
        );
    }

    let key = read_key(&source)?;
    let kdf = resolve_kdf(&config, kdf.as_deref())?;
    let password = get_new_password(password_file.as_deref())?;

    ensure_keys_dir(&keys_dir)?;
    write_keystore(&key, &password, kdf, &config, &path)?;
    print_key_summary(name, &key, &path)
}

fn read_key(source: &ImportSource) -> Result<ZilKey> {
    match source {
        ImportSource::KeyFile(file) => ZilKey::load_key_file(file)
            .with_context(|| format!("Failed to read key file: {}", file.display())),
        ImportSource::PrivateKeyFile(file) => {
            let content = Zeroizing::new(
                fs::read_to_string(file)
                    .with_context(|| format!("Failed to read private key file: {}", file.display()))?,
            );
            let private_key =
                PrivateKey::from_hex(&content).context("Private key file is not valid hex")?;
            Ok(ZilKey::from_private_key(private_key))
        }
    }
}
