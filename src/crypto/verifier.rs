//! Password-gate verifiers using Argon2id.
//!
//! The store never keeps a gate secret.  At creation time the secret is
//! hashed with a fresh random salt and only the salt, the hash and the
//! Argon2 parameters are kept.  At retrieval time the supplied secret is
//! hashed with the same salt and parameters and compared in constant time.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{LockitError, Result};

/// Length of the salt in bytes (128 bits).
const SALT_LEN: usize = 16;

/// Length of the stored hash in bytes (256 bits).
const HASH_LEN: usize = 32;

/// Minimum safe memory cost in KiB (8 MB).
pub const MIN_MEMORY_KIB: u32 = 8_192;

/// Configurable Argon2id parameters.
///
/// These map 1:1 to the `argon2_*` fields in `Settings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 19 456 = 19 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 2).
    pub iterations: u32,
    /// Parallelism lanes (default: 1).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl Argon2Params {
    /// Reject parameters below the safe minimum.
    pub fn validate(&self) -> Result<()> {
        if self.memory_kib < MIN_MEMORY_KIB {
            return Err(LockitError::KeyDerivationFailed(format!(
                "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
                self.memory_kib
            )));
        }
        if self.iterations < 1 {
            return Err(LockitError::KeyDerivationFailed(
                "Argon2 iterations must be at least 1".into(),
            ));
        }
        if self.parallelism < 1 {
            return Err(LockitError::KeyDerivationFailed(
                "Argon2 parallelism must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// A salted one-way verifier for a password gate.
///
/// Immutable once built; the hash and salt are wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PasswordVerifier {
    salt: [u8; SALT_LEN],
    hash: [u8; HASH_LEN],
    #[zeroize(skip)]
    params: Argon2Params,
}

impl PasswordVerifier {
    /// Hash `secret` under a fresh random salt.
    pub fn new(secret: &[u8], params: &Argon2Params) -> Result<Self> {
        let salt = generate_salt();
        let hash = hash_secret(secret, &salt, params)?;
        Ok(Self {
            salt,
            hash,
            params: *params,
        })
    }

    /// Returns `true` if `secret` hashes to the stored value.
    pub fn verify(&self, secret: &[u8]) -> Result<bool> {
        let mut candidate = hash_secret(secret, &self.salt, &self.params)?;
        let matches: bool = candidate.ct_eq(&self.hash).into();
        candidate.zeroize();
        Ok(matches)
    }
}

impl std::fmt::Debug for PasswordVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordVerifier")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Run Argon2id over `secret` with an explicit salt and parameters.
fn hash_secret(secret: &[u8], salt: &[u8], argon2_params: &Argon2Params) -> Result<[u8; HASH_LEN]> {
    argon2_params.validate()?;

    let params = Params::new(
        argon2_params.memory_kib,
        argon2_params.iterations,
        argon2_params.parallelism,
        Some(HASH_LEN),
    )
    .map_err(|e| LockitError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut hash = [0u8; HASH_LEN];
    argon2
        .hash_password_into(secret, salt, &mut hash)
        .map_err(|e| LockitError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    Ok(hash)
}

/// Generate a cryptographically random salt.
fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Argon2Params {
        Argon2Params {
            memory_kib: MIN_MEMORY_KIB,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn verifies_correct_secret() {
        let v = PasswordVerifier::new(b"hunter2", &cheap()).unwrap();
        assert!(v.verify(b"hunter2").unwrap());
    }

    #[test]
    fn rejects_wrong_secret() {
        let v = PasswordVerifier::new(b"hunter2", &cheap()).unwrap();
        assert!(!v.verify(b"hunter3").unwrap());
        assert!(!v.verify(b"").unwrap());
    }

    #[test]
    fn same_secret_gets_distinct_salts() {
        let a = PasswordVerifier::new(b"same", &cheap()).unwrap();
        let b = PasswordVerifier::new(b"same", &cheap()).unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn rejects_weak_params() {
        let weak = Argon2Params {
            memory_kib: 1024,
            ..cheap()
        };
        assert!(PasswordVerifier::new(b"pw", &weak).is_err());
        assert!(Argon2Params {
            iterations: 0,
            ..cheap()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn debug_output_hides_hash() {
        let v = PasswordVerifier::new(b"pw", &cheap()).unwrap();
        let dbg = format!("{v:?}");
        assert!(dbg.contains("PasswordVerifier"));
        assert!(!dbg.contains("hash"));
    }
}
