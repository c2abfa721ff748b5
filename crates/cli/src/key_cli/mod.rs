//! Key management CLI
//!
//! - `generate`: Create a new random key
//! - `import`: Import an existing private key
//! - `export`: Export public key information (never exports private keys)
//! - `list`: List all keystores in the keys directory
//!
//! Keys are stored as password-encrypted keystores at
//! `{keys_dir}/{name}.json`. Passwords are read from terminal without echo
//! or from `--password-file`.

pub mod common;
pub mod export;
pub mod generate;
pub mod import;
pub mod list;

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};
use secrecy::ExposeSecret;
use tracing::info;
use zilkey_crypto::{KdfMethod, KeystoreBuilder, SecretString, ZilKey};

use crate::config::CliConfig;
use common::DEFAULT_KEY_NAME;
use import::ImportSource;

/// Key management subcommands
#[derive(Subcommand)]
pub enum KeysCommand {
    /// Generate a new random key
    Generate {
        /// Key name (keystore file stem)
        #[arg(long, default_value = DEFAULT_KEY_NAME)]
        name: String,

        /// Key derivation function (pbkdf2|scrypt); defaults to the config value
        #[arg(long)]
        kdf: Option<String>,

        /// Read password from file instead of prompting
        #[arg(long)]
        password_file: Option<PathBuf>,

        /// Overwrite an existing keystore
        #[arg(long)]
        force: bool,
    },

    /// Import an existing private key
    Import {
        /// Key name (keystore file stem)
        #[arg(long, default_value = DEFAULT_KEY_NAME)]
        name: String,

        /// Raw key file holding "PUBLIC PRIVATE" hex
        #[arg(
            long,
            conflicts_with = "private_key_file",
            required_unless_present = "private_key_file"
        )]
        key_file: Option<PathBuf>,

        /// File holding the private key hex
        #[arg(long)]
        private_key_file: Option<PathBuf>,

        /// Key derivation function (pbkdf2|scrypt); defaults to the config value
        #[arg(long)]
        kdf: Option<String>,

        /// Read password from file instead of prompting
        #[arg(long)]
        password_file: Option<PathBuf>,

        /// Overwrite an existing keystore
        #[arg(long)]
        force: bool,
    },

    /// Export public key information
    ///
    /// Outputs addresses and keystore id. Never exports private keys.
    Export {
        /// Key name
        #[arg(long, default_value = DEFAULT_KEY_NAME)]
        name: String,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List all keystores
    ///
    /// Does not require passwords (only reads public information).
    List {
        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// Execute a keys command
pub fn execute_keys_command(home: &Path, command: KeysCommand) -> Result<()> {
    match command {
        KeysCommand::Generate {
            name,
            kdf,
            password_file,
            force,
        } => generate::execute(home, &name, kdf, password_file, force),

        KeysCommand::Import {
            name,
            key_file,
            private_key_file,
            kdf,
            password_file,
            force,
        } => {
            let source = match (key_file, private_key_file) {
                (Some(file), _) => ImportSource::KeyFile(file),
                (None, Some(file)) => ImportSource::PrivateKeyFile(file),
                (None, None) => {
                    anyhow::bail!("Either --key-file or --private-key-file is required")
                }
            };
            import::execute(home, &name, source, kdf, password_file, force)
        }

        KeysCommand::Export {
            name,
            format,
            output,
        } => export::execute(home, &name, &format, output),

        KeysCommand::List { format } => list::execute(home, &format),
    }
}

/// `--kdf` if given, else the configured default
fn resolve_kdf(config: &CliConfig, kdf: Option<&str>) -> Result<KdfMethod> {
    match kdf {
        Some(kdf) => kdf.parse::<KdfMethod>().context("Invalid --kdf"),
        None => Ok(config.default_kdf),
    }
}

/// Encrypt `key` with the configured cost parameters and write it to `path`
fn write_keystore(
    key: &ZilKey,
    password: &SecretString,
    kdf: KdfMethod,
    config: &CliConfig,
    path: &Path,
) -> Result<()> {
    let private_key = key
        .private_key()
        .context("Key has no private part to store")?;

    let keystore = KeystoreBuilder::new()
        .private_key(private_key)
        .password(password.expose_secret())
        .kdf(kdf)
        .kdf_config(config.kdf)
        .build()
        .context("Failed to encrypt keystore")?;

    keystore
        .save(path)
        .with_context(|| format!("Failed to write keystore {}", path.display()))?;

    info!(path = %path.display(), id = %keystore.id(), %kdf, "stored keystore");
    Ok(())
}
