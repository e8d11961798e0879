use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::crypto::verifier::Argon2Params;
use crate::errors::{LockitError, Result};

/// Server and client configuration, loaded from `lockit.toml`.
///
/// Every field has a sensible default so Lockit works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Address `lockit serve` listens on.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Address the client commands (`send`, `open`, `peek`) connect to.
    #[serde(default = "default_server_address")]
    pub server_address: String,

    /// Largest accepted payload in bytes (default: 4 MiB).
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,

    /// Longest accepted TTL in seconds (default: 7 days).
    #[serde(default = "default_max_ttl_seconds")]
    pub max_ttl_seconds: u64,

    /// TTL applied when a create request carries none.  `None` keeps
    /// such messages until they are read.
    #[serde(default)]
    pub default_ttl_seconds: Option<u64>,

    /// Seconds between reclamation sweeps; 0 disables the sweep.
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,

    /// Concurrent connections the server accepts.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Argon2 memory cost in KiB for password gates (default: 19 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 2).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 1).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_bind_address() -> String {
    "127.0.0.1:7878".to_string()
}

fn default_server_address() -> String {
    "127.0.0.1:7878".to_string()
}

fn default_max_payload_bytes() -> usize {
    4 * 1024 * 1024
}

fn default_max_ttl_seconds() -> u64 {
    7 * 24 * 60 * 60
}

fn default_sweep_interval_seconds() -> u64 {
    60
}

fn default_max_connections() -> usize {
    1024
}

fn default_argon2_memory_kib() -> u32 {
    19_456 // 19 MB
}

fn default_argon2_iterations() -> u32 {
    2
}

fn default_argon2_parallelism() -> u32 {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            server_address: default_server_address(),
            max_payload_bytes: default_max_payload_bytes(),
            max_ttl_seconds: default_max_ttl_seconds(),
            default_ttl_seconds: None,
            sweep_interval_seconds: default_sweep_interval_seconds(),
            max_connections: default_max_connections(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Name of the config file looked up when no path is given.
    pub const FILE_NAME: &'static str = "lockit.toml";

    /// Largest accepted `max_ttl_seconds`: 100 years.
    pub const MAX_TTL_CEILING_SECONDS: u64 = 100 * 365 * 86_400;

    /// Load settings from `path`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed or holds unusable values,
    /// an error is returned.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            LockitError::ConfigError(format!("Failed to parse {}: {e}", path.display()))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check that limits and KDF parameters are usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_payload_bytes == 0 {
            return Err(LockitError::ConfigError(
                "max_payload_bytes must be greater than 0".into(),
            ));
        }
        if self.max_ttl_seconds == 0 || self.max_ttl_seconds > Self::MAX_TTL_CEILING_SECONDS {
            return Err(LockitError::ConfigError(format!(
                "max_ttl_seconds must be between 1 and {} (got {})",
                Self::MAX_TTL_CEILING_SECONDS,
                self.max_ttl_seconds
            )));
        }
        if let Some(default_ttl) = self.default_ttl_seconds {
            if default_ttl == 0 || default_ttl > self.max_ttl_seconds {
                return Err(LockitError::ConfigError(format!(
                    "default_ttl_seconds must be between 1 and {} (got {default_ttl})",
                    self.max_ttl_seconds
                )));
            }
        }
        if self.max_connections == 0 {
            return Err(LockitError::ConfigError(
                "max_connections must be greater than 0".into(),
            ));
        }
        self.argon2_params()
            .validate()
            .map_err(|e| LockitError::ConfigError(e.to_string()))
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    /// Sweep period, or `None` when sweeping is disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_seconds > 0)
            .then(|| Duration::from_secs(self.sweep_interval_seconds))
    }
}

// ── Tests ────────────────────────────────────────────────────────────
