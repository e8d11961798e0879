//! Integration tests for the Lockit crypto module.

use lockit::crypto::verifier::MIN_MEMORY_KIB;
use lockit::crypto::{decrypt, encrypt, generate_key, Argon2Params, PasswordVerifier};

fn cheap_params() -> Argon2Params {
    Argon2Params {
        memory_kib: MIN_MEMORY_KIB,
        iterations: 1,
        parallelism: 1,
    }
}

// ---------------------------------------------------------------------------
// Message encryption
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = generate_key();
    let plaintext = b"meet me at the usual place";

    let ciphertext = encrypt(&key[..], plaintext).expect("encrypt should succeed");

    // 12-byte nonce + 16-byte tag.
    assert_eq!(ciphertext.len(), plaintext.len() + 28);

    let recovered = decrypt(&key[..], &ciphertext).expect("decrypt should succeed");
    assert_eq!(recovered.as_slice(), plaintext);
}

#[test]
fn encrypt_produces_different_ciphertext_each_time() {
    let key = [0xCDu8; 32];
    let plaintext = b"same message";

    let ct1 = encrypt(&key, plaintext).expect("encrypt 1");
    let ct2 = encrypt(&key, plaintext).expect("encrypt 2");

    assert_ne!(ct1, ct2, "random nonces must differ");
}

#[test]
fn generated_keys_are_distinct() {
    let a = generate_key();
    let b = generate_key();
    assert_ne!(a[..], b[..]);
}

#[test]
fn decrypt_with_wrong_key_fails() {
    let ciphertext = encrypt(&[0x11u8; 32], b"secret").expect("encrypt");
    assert!(decrypt(&[0x22u8; 32], &ciphertext).is_err());
}

#[test]
fn decrypt_with_corrupted_ciphertext_fails() {
    let key = [0xBBu8; 32];
    let mut ciphertext = encrypt(&key, b"payload").expect("encrypt");
    // Flip a byte after the 12-byte nonce.
    if let Some(byte) = ciphertext.get_mut(15) {
        *byte ^= 0xFF;
    }
    assert!(decrypt(&key, &ciphertext).is_err());
}

#[test]
fn decrypt_truncated_input_fails() {
    let key = [0x01u8; 32];
    assert!(decrypt(&key, &[0u8; 5]).is_err());
    assert!(decrypt(&key, &[]).is_err());
}

#[test]
fn wrong_key_length_is_rejected() {
    assert!(encrypt(&[0u8; 16], b"x").is_err());
    assert!(decrypt(&[0u8; 16], &[0u8; 40]).is_err());
}

// ---------------------------------------------------------------------------
// Password verifier (Argon2id)
// ---------------------------------------------------------------------------

#[test]
fn verifier_accepts_only_the_original_secret() {
    let verifier = PasswordVerifier::new(b"hunter2", &cheap_params()).expect("verifier");

    assert!(verifier.verify(b"hunter2").expect("verify"));
    assert!(!verifier.verify(b"hunter3").expect("verify"));
    assert!(!verifier.verify(b"").expect("verify"));
}

#[test]
fn verifier_debug_hides_hash_material() {
    let verifier = PasswordVerifier::new(b"topsecret", &cheap_params()).expect("verifier");
    let debug = format!("{verifier:?}");
    assert!(!debug.contains("hash"));
    assert!(!debug.contains("salt"));
}

#[test]
fn params_below_floor_are_rejected() {
    let weak = Argon2Params {
        memory_kib: MIN_MEMORY_KIB - 1,
        ..cheap_params()
    };
    assert!(weak.validate().is_err());
    assert!(PasswordVerifier::new(b"pw", &weak).is_err());
    assert!(Argon2Params::default().validate().is_ok());
}
