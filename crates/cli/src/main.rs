//! zilkey CLI
//!
//! Key management and signing tools for Zilliqa accounts.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use zilkey_cli::{
    config_path, default_home_dir, execute_keys_command, tools, CliConfig, KeysCommand,
};

/// Zilliqa account key manager
#[derive(Parser)]
#[command(name = "zilkey")]
#[command(version)]
#[command(about = "Zilliqa account key manager", long_about = None)]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Directory for config and keys
    #[arg(long, global = true, default_value_os_t = default_home_dir())]
    home: PathBuf,

    /// The logging level (trace|debug|info|warn|error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// The logging format (json|plain)
    #[arg(long, global = true, default_value = "plain")]
    log_format: String,

    /// Disable colored logs
    #[arg(long, global = true, default_value = "false")]
    log_no_color: bool,

    /// Print out the full error chain on errors
    #[arg(long, global = true, default_value = "false")]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage encrypted keystores
    Keys {
        #[command(subcommand)]
        command: KeysCommand,
    },

    /// Print the raw, checksum and bech32 forms of an address
    Address {
        /// Address in any encoding
        address: String,

        /// Output format (text|json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Sign a message with a stored key
    Sign {
        /// Key name
        #[arg(long)]
        name: String,

        /// Message: 0x-prefixed hex, otherwise UTF-8 text
        #[arg(long)]
        message: String,

        /// Read password from file instead of prompting
        #[arg(long)]
        password_file: Option<PathBuf>,
    },

    /// Verify a signature; exits with status 1 when invalid
    Verify {
        /// Public key hex (compressed or uncompressed)
        #[arg(long)]
        public_key: String,

        /// Message: 0x-prefixed hex, otherwise UTF-8 text
        #[arg(long)]
        message: String,

        /// Signature hex (r || s)
        #[arg(long)]
        signature: String,
    },

    /// Utilities for managing CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing configuration
        #[arg(long, default_value = "false")]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, &cli.log_format, cli.log_no_color);

    let result = match cli.command {
        Commands::Keys { command } => execute_keys_command(&cli.home, command),

        Commands::Address { address, format } => tools::cmd_address(&address, &format),

        Commands::Sign {
            name,
            message,
            password_file,
        } => tools::cmd_sign(&cli.home, &name, &message, password_file),

        Commands::Verify {
            public_key,
            message,
            signature,
        } => tools::cmd_verify(&public_key, &message, &signature).map(|valid| {
            if valid {
                println!("valid");
            } else {
                println!("invalid");
                std::process::exit(1);
            }
        }),

        Commands::Config { command } => cmd_config(&cli.home, command),
    };

    if let Err(e) = &result {
        if cli.trace {
            eprintln!("Error: {:?}", e);
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(log_level: &str, log_format: &str, no_color: bool) {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    // stdout carries command output; logs go to stderr
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .with_ansi(!no_color);

    match log_format {
        "json" => subscriber.json().init(),
        _ => subscriber.init(),
    }
}

fn cmd_config(home: &std::path::Path, command: ConfigCommands) -> Result<()> {
    let path = config_path(home);

    match command {
        ConfigCommands::Show => {
            let config = CliConfig::load_or_default(home)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }

        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration already exists at {}. Use --force to replace.",
                    path.display()
                );
            }

            CliConfig::default().save(&path)?;
            println!("Wrote default configuration to {}", path.display());
        }
    }

    Ok(())
}
