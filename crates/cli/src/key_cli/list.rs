//! Key list command implementation
//!
//! Lists all keystores in the keys directory with their public information.

use super::export::public_info;
use crate::config::CliConfig;
use anyhow::Result;
use std::fs;
use std::path::Path;
use tracing::warn;
use zilkey_crypto::Keystore;

/// Execute the list command
pub fn execute(home: &Path, format: &str) -> Result<()> {
    let config = CliConfig::load_or_default(home)?;
    let keys_dir = config.keys_dir(home);

    let mut keystores = Vec::new();
    if keys_dir.exists() {
        for entry in fs::read_dir(&keys_dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }

            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            match Keystore::load(&path) {
                Ok(keystore) => keystores.push(public_info(name, &keystore)?),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable keystore"),
            }
        }
    }

    keystores.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&keystores)?),
        _ => print_text(&keystores, &keys_dir),
    }

    Ok(())
}

fn print_text(keystores: &[serde_json::Value], keys_dir: &Path) {
    if keystores.is_empty() {
        println!("No keystores found in {}", keys_dir.display());
        println!();
        println!("Run 'zilkey keys generate' to create a new key.");
        return;
    }

    println!("Keystores in {}", keys_dir.display());
    println!();
    for ks in keystores {
        println!(
            "  {:<16} {}  {}",
            ks["name"].as_str().unwrap_or_default(),
            ks["checksum_address"].as_str().unwrap_or_default(),
            ks["bech32_address"].as_str().unwrap_or_default(),
        );
    }
    println!();
    println!("Total: {} keystore(s)", keystores.len());
}
