//! Key management CLI for Zilliqa accounts
//!
//! The binary (`zilkey`) is a thin clap layer over these modules.

pub mod config;
pub mod key_cli;
pub mod tools;

pub use config::{
    config_path, default_home_dir, CliConfig, CONFIG_FILENAME, DEFAULT_HOME_DIR, DEFAULT_KEYS_DIR,
    ZILKEY_HOME_ENV,
};
pub use key_cli::{execute_keys_command, KeysCommand};
