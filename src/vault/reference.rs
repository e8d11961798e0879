//! Reference generation.
//!
//! A reference is 128 random bits rendered as unpadded URL-safe base64
//! (22 characters), so it can sit in a URL path without escaping.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

/// Random bytes per reference.
const REFERENCE_BYTES: usize = 16;

/// Characters of a reference kept in logs.
const REDACTED_CHARS: usize = 6;

/// Length of an encoded reference.
pub const REFERENCE_LEN: usize = 22;

/// Generate a fresh random reference.
///
/// Uniqueness against live records is checked by the store.  References of
/// reclaimed records are not remembered; with 128 random bits a repeat is
/// not expected within any store's lifetime.
pub fn generate() -> String {
    let mut bytes = [0u8; REFERENCE_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Returns `true` if `candidate` has the shape of a generated reference.
pub fn is_well_formed(candidate: &str) -> bool {
    candidate.len() == REFERENCE_LEN
        && candidate
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Short prefix of a reference, safe to put in logs.
pub fn redacted(reference: &str) -> &str {
    match reference.char_indices().nth(REDACTED_CHARS) {
        Some((end, _)) => &reference[..end],
        None => reference,
    }
}
