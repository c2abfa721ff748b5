//! CLI configuration stored at `{home}/config.json`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use zilkey_crypto::{KdfConfig, KdfMethod};

/// Environment variable for home directory override.
///
/// Takes precedence over the default home directory (`~/.zilkey`) but not
/// over `--home`.
///
/// ```bash
/// export ZILKEY_HOME=/custom/path/zilkey
/// zilkey keys list
/// ```
pub const ZILKEY_HOME_ENV: &str = "ZILKEY_HOME";

/// Default home directory name (relative to user's home directory).
pub const DEFAULT_HOME_DIR: &str = ".zilkey";

/// Default keys directory relative to the home directory.
pub const DEFAULT_KEYS_DIR: &str = "keys";

/// Config filename within the home directory.
pub const CONFIG_FILENAME: &str = "config.json";

/// Resolve the home directory when `--home` is not given.
///
/// Resolution order:
/// 1. `ZILKEY_HOME` environment variable (if set)
/// 2. `~/.zilkey` (default)
pub fn default_home_dir() -> PathBuf {
    if let Ok(home) = std::env::var(ZILKEY_HOME_ENV) {
        return PathBuf::from(home);
    }

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_HOME_DIR)
}

/// Path of the config file for `home`
pub fn config_path(home: &Path) -> PathBuf {
    home.join(CONFIG_FILENAME)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Keystore directory; relative paths are resolved against home
    pub keys_dir: PathBuf,
    /// KDF used for new keystores
    pub default_kdf: KdfMethod,
    /// Cost parameters for new keystores
    pub kdf: KdfConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            keys_dir: PathBuf::from(DEFAULT_KEYS_DIR),
            default_kdf: KdfMethod::default(),
            kdf: KdfConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load `{home}/config.json`, or defaults when it does not exist
    pub fn load_or_default(home: &Path) -> Result<Self> {
        let path = config_path(home);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&json)
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Absolute keystore directory for `home`
    pub fn keys_dir(&self, home: &Path) -> PathBuf {
        if self.keys_dir.is_absolute() {
            self.keys_dir.clone()
        } else {
            home.join(&self.keys_dir)
        }
    }
}
