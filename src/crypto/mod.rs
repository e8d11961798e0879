//! Cryptographic primitives for Lockit.
//!
//! This module provides:
//! - Argon2id password-gate verifiers used by the store (`verifier`)
//! - AES-256-GCM message encryption used by the client (`encryption`)

pub mod encryption;
pub mod verifier;

pub use encryption::{decrypt, encrypt, generate_key};
pub use verifier::{Argon2Params, PasswordVerifier};
