//! Key export command implementation
//!
//! Exports public information only; the private key is never decrypted.

use super::common::load_named_keystore;
use crate::config::CliConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use zilkey_crypto::Keystore;

/// Public fields of a stored keystore
pub fn public_info(name: &str, keystore: &Keystore) -> Result<serde_json::Value> {
    let address = keystore.address()?;
    Ok(serde_json::json!({
        "name": name,
        "address": address.to_hex(),
        "checksum_address": address.to_checksum(),
        "bech32_address": address.to_bech32()?,
        "id": keystore.id().to_string(),
        "kdf": keystore.kdf().to_string(),
    }))
}

/// Execute the export command
pub fn execute(home: &Path, name: &str, format: &str, output: Option<PathBuf>) -> Result<()> {
    let config = CliConfig::load_or_default(home)?;
    let keystore = load_named_keystore(&config.keys_dir(home), name)?;
    let info = public_info(name, &keystore)?;

    let output_content = match format {
        "json" => format!("{}\n", serde_json::to_string_pretty(&info)?),
        _ => format_text(&info),
    };

    if let Some(output_path) = output {
        fs::write(&output_path, &output_content)
            .with_context(|| format!("Failed to write to {}", output_path.display()))?;
        println!("Exported key '{}' to {}", name, output_path.display());
    } else {
        print!("{}", output_content);
    }

    Ok(())
}

fn format_text(info: &serde_json::Value) -> String {
    let field = |key: &str| info[key].as_str().unwrap_or_default().to_string();
    format!(
        "Name:       {}\nAddress:    {}\nChecksum:   {}\nBech32:     {}\nId:         {}\nKDF:        {}\n",
        field("name"),
        field("address"),
        field("checksum_address"),
        field("bech32_address"),
        field("id"),
        field("kdf"),
    )
}
