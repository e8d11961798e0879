//! Wire protocol: newline-delimited JSON requests and responses.
//!
//! ```text
//! -> {"op":"create","payload":"<base64>","ttl_seconds":600,"burn_after_reading":true,"password":"..."}
//! <- {"status":"created","reference":"...","expires_at":"2026-01-01T00:00:00Z"}
//! -> {"op":"retrieve","reference":"...","password":"..."}
//! <- {"status":"payload","payload":"<base64>","view_count":1}
//! -> {"op":"peek","reference":"..."}
//! <- {"status":"peeked","password_required":true,"burn_after_reading":false,"expires_at":null}
//! <- {"status":"error","code":"not_found","message":"Message not found or expired"}
//! ```
//!
//! Payloads travel as standard base64 strings.  One JSON document per
//! line; the newline is the frame delimiter.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::errors::LockitError;

/// A client request.
#[derive(Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Create {
        #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
        payload: Vec<u8>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ttl_seconds: Option<u64>,
        #[serde(default)]
        burn_after_reading: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<Zeroizing<String>>,
    },
    Retrieve {
        reference: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<Zeroizing<String>>,
    },
    Peek {
        reference: String,
    },
}

impl Request {
    /// Operation name, for logs.
    pub fn op(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Retrieve { .. } => "retrieve",
            Self::Peek { .. } => "peek",
        }
    }
}

// Payloads and passwords stay out of debug output.
impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create {
                payload,
                ttl_seconds,
                burn_after_reading,
                password,
            } => f
                .debug_struct("Create")
                .field("payload_len", &payload.len())
                .field("ttl_seconds", ttl_seconds)
                .field("burn_after_reading", burn_after_reading)
                .field("password", &password.is_some())
                .finish(),
            Self::Retrieve {
                reference,
                password,
            } => f
                .debug_struct("Retrieve")
                .field("reference", reference)
                .field("password", &password.is_some())
                .finish(),
            Self::Peek { reference } => f
                .debug_struct("Peek")
                .field("reference", reference)
                .finish(),
        }
    }
}

/// A server response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Created {
        reference: String,
        expires_at: Option<DateTime<Utc>>,
    },
    Payload {
        #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
        payload: Vec<u8>,
        view_count: u64,
    },
    Peeked {
        password_required: bool,
        burn_after_reading: bool,
        expires_at: Option<DateTime<Utc>>,
    },
    Error {
        code: ErrorCode,
        message: String,
    },
}

impl Response {
    /// Build the error response for `error`.
    ///
    /// Only the four caller-facing failures keep their message; anything
    /// else is reported as `internal` with a generic text.
    pub fn error(error: &LockitError) -> Self {
        let code = ErrorCode::from(error);
        let message = match code {
            ErrorCode::Internal => "internal server error".to_string(),
            _ => error.to_string(),
        };
        Self::Error { code, message }
    }

    /// Convert an error response back into the matching `LockitError`.
    pub fn into_result(self) -> crate::errors::Result<Self> {
        match self {
            Self::Error { code, message } => Err(code.into_error(message)),
            other => Ok(other),
        }
    }
}

/// Externally visible failure codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    PasswordRequired,
    PasswordIncorrect,
    Validation,
    Internal,
}

impl ErrorCode {
    fn into_error(self, message: String) -> LockitError {
        match self {
            Self::NotFound => LockitError::NotFound,
            Self::PasswordRequired => LockitError::PasswordRequired,
            Self::PasswordIncorrect => LockitError::PasswordIncorrect,
            Self::Validation => LockitError::Validation(message),
            Self::Internal => LockitError::Server(message),
        }
    }
}

impl From<&LockitError> for ErrorCode {
    fn from(error: &LockitError) -> Self {
        match error {
            LockitError::NotFound => Self::NotFound,
            LockitError::PasswordRequired => Self::PasswordRequired,
            LockitError::PasswordIncorrect => Self::PasswordIncorrect,
            LockitError::Validation(_) => Self::Validation,
            _ => Self::Internal,
        }
    }
}

// ── Serde helpers ────────────────────────────────────────────────────

fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
