//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{LockitError, Result};

/// Environment variable consulted before prompting for a message password.
pub const PASSWORD_ENV: &str = "LOCKIT_PASSWORD";

/// Lockit CLI: ephemeral encrypted message vault.
#[derive(Parser)]
#[command(
    name = "lockit",
    about = "Ephemeral encrypted message vault with burn-after-reading links",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the config file
    #[arg(long, global = true, env = "LOCKIT_CONFIG", default_value = Settings::FILE_NAME)]
    pub config: PathBuf,

    /// Server address for client commands (overrides the config file)
    #[arg(long, global = true, env = "LOCKIT_SERVER")]
    pub server: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run the message server
    Serve {
        /// Address to bind to (overrides the config file)
        #[arg(short, long)]
        bind: Option<String>,

        /// Log level (trace, debug, info, warn, error)
        #[arg(long)]
        log_level: Option<String>,
    },

    /// Encrypt a message and upload it, printing a share link
    Send {
        /// Read the message from a file (default: stdin or prompt)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Expire the message after this long (e.g. 30s, 10m, 24h, 7d)
        #[arg(short, long)]
        ttl: Option<String>,

        /// Destroy the message after it is read once
        #[arg(long)]
        burn: bool,

        /// Protect the message with a password (prompted)
        #[arg(short, long)]
        password: bool,

        /// Upload the bytes as-is, without client-side encryption
        #[arg(long)]
        raw: bool,
    },

    /// Retrieve and decrypt a message from a share link
    Open {
        /// Share link: <reference>#<key>, or a URL ending in one
        link: String,

        /// Write the message to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check whether a message exists without reading it
    Peek {
        /// Share link or bare reference
        link: String,
    },

    /// Show the effective configuration
    Config,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load settings from the path given by `--config`.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    Settings::load(&cli.config)
}

/// Server address for client commands: `--server` wins over the config.
pub fn server_address(cli: &Cli, settings: &Settings) -> String {
    cli.server
        .clone()
        .unwrap_or_else(|| settings.server_address.clone())
}

/// Install the tracing subscriber on stderr.
///
/// `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // A subscriber may already be installed (e.g. in tests).
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

/// Prompt for the password of a protected message.
///
/// Always interactive: `open` tries `LOCKIT_PASSWORD` once on its own and
/// only prompts when that is missing or wrong.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    let pw = dialoguer::Password::new()
        .with_prompt("Enter message password")
        .interact()
        .map_err(|e| LockitError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new message password with confirmation.
///
/// Also respects `LOCKIT_PASSWORD` for scripted usage.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }
    let pw = dialoguer::Password::new()
        .with_prompt("Choose message password")
        .with_confirmation("Confirm message password", "Passwords do not match, try again")
        .interact()
        .map_err(|e| LockitError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// `LOCKIT_PASSWORD`, if set and non-empty.
pub fn password_from_env() -> Option<Zeroizing<String>> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

/// Parse a human-friendly TTL like "30s", "10m", "24h" or "7d" into seconds.
pub fn parse_ttl(input: &str) -> Result<u64> {
    let input = input.trim();

    let (num_str, multiplier) = if let Some(s) = input.strip_suffix('d') {
        (s, 86_400)
    } else if let Some(s) = input.strip_suffix('h') {
        (s, 3_600)
    } else if let Some(s) = input.strip_suffix('m') {
        (s, 60)
    } else if let Some(s) = input.strip_suffix('s') {
        (s, 1)
    } else {
        return Err(LockitError::CommandFailed(format!(
            "invalid ttl '{input}' — use format like 30s, 10m, 24h, or 7d"
        )));
    };

    let num: u64 = num_str.parse().map_err(|_| {
        LockitError::CommandFailed(format!("invalid ttl '{input}' — number part is not valid"))
    })?;

    if num == 0 {
        return Err(LockitError::CommandFailed("ttl must be positive".into()));
    }

    num.checked_mul(multiplier)
        .ok_or_else(|| LockitError::CommandFailed(format!("ttl '{input}' is too large")))
}
