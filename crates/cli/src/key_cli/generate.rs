//! Key generation command implementation
//!
//! Generates a new random key and stores it as an encrypted keystore.

use super::common::{
    ensure_keys_dir, get_new_password, keystore_path, print_key_summary, validate_key_name,
};
use super::{resolve_kdf, write_keystore};
use crate::config::CliConfig;
use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use zilkey_crypto::ZilKey;

/// Execute the generate command
pub fn execute(
    home: &Path,
    name: &str,
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

    let kdf = resolve_kdf(&config, kdf.as_deref())?;
    let password = get_new_password(password_file.as_deref())?;

    let key = ZilKey::generate();

    ensure_keys_dir(&keys_dir)?;
    write_keystore(&key, &password, kdf, &config, &path)?;
    print_key_summary(name, &key, &path)
}
