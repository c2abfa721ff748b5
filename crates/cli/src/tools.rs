//! Address, signing and verification commands

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use tracing::debug;
use zilkey_crypto::{verify_bytes, Address};

use crate::config::CliConfig;
use crate::key_cli::common::{get_password, load_named_keystore};

/// Raw, checksum and bech32 forms of any accepted address
pub fn address_forms(input: &str) -> Result<serde_json::Value> {
    let address = Address::parse(input).with_context(|| format!("Invalid address: {}", input))?;
    Ok(serde_json::json!({
        "address": address.to_hex(),
        "checksum_address": address.to_checksum(),
        "bech32_address": address.to_bech32()?,
    }))
}

/// Execute the address command
pub fn cmd_address(input: &str, format: &str) -> Result<()> {
    let forms = address_forms(input)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&forms)?),
        _ => {
            println!("Address:  {}", forms["address"].as_str().unwrap_or_default());
            println!(
                "Checksum: {}",
                forms["checksum_address"].as_str().unwrap_or_default()
            );
            println!(
                "Bech32:   {}",
                forms["bech32_address"].as_str().unwrap_or_default()
            );
        }
    }
    Ok(())
}

/// Message bytes: `0x`-prefixed input is hex, anything else is UTF-8 text
pub fn message_bytes(message: &str) -> Result<Vec<u8>> {
    match message.strip_prefix("0x") {
        Some(body) => hex::decode(body).context("Message has 0x prefix but is not valid hex"),
        None => Ok(message.as_bytes().to_vec()),
    }
}

/// Execute the sign command
pub fn cmd_sign(
    home: &Path,
    name: &str,
    message: &str,
    password_file: Option<PathBuf>,
) -> Result<()> {
    let config = CliConfig::load_or_default(home)?;
    let keystore = load_named_keystore(&config.keys_dir(home), name)?;
    let message = message_bytes(message)?;

    let password = get_password(
        password_file.as_deref(),
        &format!("Enter password for key '{}': ", name),
        false,
    )?;

    let key = keystore
        .decrypt(password.expose_secret())
        .context("Failed to unlock key")?;
    let signature = key.sign(&message)?;

    debug!(key_name = name, address = %key.address(), "signed message");
    println!("{}", signature.to_hex());
    Ok(())
}

/// Execute the verify command; returns whether the signature is valid
pub fn cmd_verify(public_key: &str, message: &str, signature: &str) -> Result<bool> {
    let public_key =
        hex::decode(strip_0x(public_key.trim())).context("Public key is not valid hex")?;
    let signature =
        hex::decode(strip_0x(signature.trim())).context("Signature is not valid hex")?;
    let message = message_bytes(message)?;

    Ok(verify_bytes(&message, &signature, &public_key))
}

fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x").unwrap_or(s)
}
