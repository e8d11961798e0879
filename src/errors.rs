use thiserror::Error;

/// All errors that can occur in Lockit.
#[derive(Debug, Error)]
pub enum LockitError {
    // --- Redemption errors ---
    /// Covers "never existed", "already consumed" and "expired" alike.
    #[error("Message not found or expired")]
    NotFound,

    #[error("This message is password protected")]
    PasswordRequired,

    #[error("Incorrect password")]
    PasswordIncorrect,

    // --- Request validation ---
    #[error("Invalid request: {0}")]
    Validation(String),

    // --- Crypto errors ---
    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — wrong key or corrupted message")]
    DecryptionFailed,

    #[error("Invalid share link: {0}")]
    InvalidLink(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization / transport errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Server error: {0}")]
    Server(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl From<serde_json::Error> for LockitError {
    fn from(e: serde_json::Error) -> Self {
        Self::SerializationError(e.to_string())
    }
}

/// Convenience type alias for Lockit results.
pub type Result<T> = std::result::Result<T, LockitError>;
