//! Service façade — the boundary between transports and the vault.
//!
//! `MessageService` validates client-supplied limits (payload ceiling,
//! TTL range, password length), forwards to `VaultStore`, and turns
//! results into wire `Response`s.  It never looks inside a payload.

pub mod wire;

use std::sync::Arc;

use chrono::Duration;

use crate::config::Settings;
use crate::errors::{LockitError, Result};
use crate::vault::reference;
use crate::vault::{CreateOptions, Delivery, PeekStatus, Receipt, VaultStore};

pub use wire::{ErrorCode, Request, Response};

/// Longest accepted gate password in bytes.
pub const MAX_PASSWORD_BYTES: usize = 1024;

/// Limits enforced on create requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_payload_bytes: usize,
    pub max_ttl_seconds: u64,
    pub default_ttl_seconds: Option<u64>,
}

impl Limits {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_payload_bytes: settings.max_payload_bytes,
            max_ttl_seconds: settings.max_ttl_seconds,
            default_ttl_seconds: settings.default_ttl_seconds,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// A create call as seen by the façade.
#[derive(Debug, Clone, Default)]
pub struct CreateRequest<'a> {
    pub payload: Vec<u8>,
    pub ttl_seconds: Option<u64>,
    pub burn_after_reading: bool,
    pub password: Option<&'a str>,
}

/// Validating front door to a shared `VaultStore`.
#[derive(Debug, Clone)]
pub struct MessageService {
    store: Arc<VaultStore>,
    limits: Limits,
}

impl MessageService {
    pub fn new(store: Arc<VaultStore>, limits: Limits) -> Self {
        Self { store, limits }
    }

    /// Build a store and façade from configuration.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let store = VaultStore::new(settings.argon2_params())?;
        Ok(Self::new(Arc::new(store), Limits::from_settings(settings)))
    }

    pub fn store(&self) -> &Arc<VaultStore> {
        &self.store
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Validate and store a new message.
    pub fn create(&self, request: CreateRequest<'_>) -> Result<Receipt> {
        if request.payload.is_empty() {
            return Err(LockitError::Validation("payload cannot be empty".into()));
        }
        if request.payload.len() > self.limits.max_payload_bytes {
            return Err(LockitError::Validation(format!(
                "payload exceeds {} bytes",
                self.limits.max_payload_bytes
            )));
        }

        let ttl = self.resolve_ttl(request.ttl_seconds)?;

        // A blank password field means "no password".
        let password = request.password.filter(|p| !p.trim().is_empty());
        if let Some(p) = password {
            Self::check_password_len(p)?;
        }

        self.store.create(
            request.payload,
            CreateOptions {
                ttl,
                burn_after_reading: request.burn_after_reading,
                password: password.map(str::as_bytes),
            },
        )
    }

    /// Redeem a reference.
    pub fn retrieve(&self, reference: &str, password: Option<&str>) -> Result<Delivery> {
        let password = password.filter(|p| !p.is_empty());
        if let Some(p) = password {
            Self::check_password_len(p)?;
        }
        if !reference::is_well_formed(reference) {
            return Err(LockitError::NotFound);
        }
        self.store.retrieve(reference, password.map(str::as_bytes))
    }

    /// Non-consuming status check.
    pub fn peek(&self, reference: &str) -> Result<PeekStatus> {
        if !reference::is_well_formed(reference) {
            return Err(LockitError::NotFound);
        }
        self.store.peek(reference)
    }

    /// Dispatch a wire request and map the outcome to a wire response.
    pub fn handle(&self, request: Request) -> Response {
        let op = request.op();
        let result = match request {
            Request::Create {
                payload,
                ttl_seconds,
                burn_after_reading,
                password,
            } => self
                .create(CreateRequest {
                    payload,
                    ttl_seconds,
                    burn_after_reading,
                    password: password.as_deref().map(String::as_str),
                })
                .map(|receipt| Response::Created {
                    reference: receipt.reference,
                    expires_at: receipt.expires_at,
                }),
            Request::Retrieve {
                reference,
                password,
            } => self
                .retrieve(&reference, password.as_deref().map(String::as_str))
                .map(|delivery| Response::Payload {
                    payload: delivery.payload,
                    view_count: delivery.view_count,
                }),
            Request::Peek { reference } => self.peek(&reference).map(|status| Response::Peeked {
                password_required: status.password_required,
                burn_after_reading: status.burn_after_reading,
                expires_at: status.expires_at,
            }),
        };

        result.unwrap_or_else(|e| {
            if ErrorCode::from(&e) == ErrorCode::Internal {
                tracing::warn!(op, error = %e, "request failed");
            }
            Response::error(&e)
        })
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Apply the default TTL and enforce `1 ..= max_ttl_seconds`.
    fn resolve_ttl(&self, ttl_seconds: Option<u64>) -> Result<Option<Duration>> {
        let Some(seconds) = ttl_seconds.or(self.limits.default_ttl_seconds) else {
            return Ok(None);
        };
        if seconds == 0 || seconds > self.limits.max_ttl_seconds {
            return Err(LockitError::Validation(format!(
                "ttl must be between 1 and {} seconds",
                self.limits.max_ttl_seconds
            )));
        }
        let ttl = i64::try_from(seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| LockitError::Validation("ttl is out of range".into()))?;
        Ok(Some(ttl))
    }

    fn check_password_len(password: &str) -> Result<()> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(LockitError::Validation(format!(
                "password cannot exceed {MAX_PASSWORD_BYTES} bytes"
            )));
        }
        Ok(())
    }
}
