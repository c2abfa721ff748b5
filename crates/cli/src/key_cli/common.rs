//! Common utilities for key management CLI commands

use anyhow::{anyhow, bail, Context, Result};
use secrecy::ExposeSecret;
use std::fs;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;
use zilkey_crypto::{IntoSecret, Keystore, SecretString, ZilKey};

/// Name used when `--name` is omitted
pub const DEFAULT_KEY_NAME: &str = "default";

/// Minimum password length for new keystores
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Keystore file for `name` inside `keys_dir`
pub fn keystore_path(keys_dir: &Path, name: &str) -> PathBuf {
    keys_dir.join(format!("{}.json", name))
}

/// Reject names that would escape the keys directory
pub fn validate_key_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        && !name.starts_with('.');

    if !valid {
        bail!(
            "Invalid key name '{}': use letters, digits, '-', '_' or '.'",
            name
        );
    }
    Ok(())
}

/// Ensure a directory exists with proper permissions
pub fn ensure_keys_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).context("Failed to create keys directory")?;

        // Set directory permissions to 0700 (owner only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o700);
            fs::set_permissions(dir, perms).context("Failed to set directory permissions")?;
        }
    }
    Ok(())
}

/// Read password from file or prompt interactively
pub fn get_password(
    password_file: Option<&Path>,
    prompt: &str,
    confirm: bool,
) -> Result<SecretString> {
    if let Some(file) = password_file {
        read_password_from_file(file)
    } else {
        prompt_password(prompt, confirm)
    }
}

/// Read password for a new keystore and check its length
pub fn get_new_password(password_file: Option<&Path>) -> Result<SecretString> {
    let password = get_password(
        password_file,
        "Enter password for keystore encryption: ",
        password_file.is_none(),
    )?;
    validate_password_length(password.expose_secret())?;
    Ok(password)
}

/// Read password from a file
///
/// Only the trailing newline is stripped.
pub fn read_password_from_file(path: &Path) -> Result<SecretString> {
    let content = Zeroizing::new(
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read password file: {}", path.display()))?,
    );

    let password = content.trim_end_matches(['\r', '\n']);

    if password.is_empty() {
        return Err(anyhow!("Password file is empty"));
    }

    Ok(password.to_string().into_secret())
}

/// Prompt for password with optional confirmation
pub fn prompt_password(prompt: &str, confirm: bool) -> Result<SecretString> {
    let password = rpassword::prompt_password(prompt)
        .context("Failed to read password")?
        .into_secret();

    if confirm {
        let confirmation = rpassword::prompt_password("Confirm password: ")
            .context("Failed to read password confirmation")?
            .into_secret();

        if password.expose_secret() != confirmation.expose_secret() {
            return Err(anyhow!("Passwords do not match"));
        }
    }

    Ok(password)
}

pub fn validate_password_length(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(anyhow!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }
    Ok(())
}

/// Load the keystore stored under `name`
pub fn load_named_keystore(keys_dir: &Path, name: &str) -> Result<Keystore> {
    validate_key_name(name)?;
    let path = keystore_path(keys_dir, name);
    if !path.is_file() {
        bail!(
            "Key '{}' not found in {}\nRun 'zilkey keys generate' or 'zilkey keys import' first.",
            name,
            keys_dir.display()
        );
    }
    Keystore::load(&path).with_context(|| format!("Failed to load keystore {}", path.display()))
}

/// Print the three address forms of a key
pub fn print_key_summary(name: &str, key: &ZilKey, path: &Path) -> Result<()> {
    let address = key.address();
    println!("Key '{}' saved to {}", name, path.display());
    println!("  Address:    {}", address.to_hex());
    println!("  Checksum:   {}", address.to_checksum());
    println!("  Bech32:     {}", address.to_bech32()?);
    println!("  Public key: {}", key.public_key().to_hex());
    Ok(())
}
