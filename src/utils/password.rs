//! Password hashing and verification.
//!
//! Passwords are hashed with PBKDF2-HMAC-SHA256 and a random 16-byte salt.
//! The stored format is `pbkdf2:sha256:<iterations>$<salt>$<hash>` with both
//! binary parts encoded as URL-safe base64 without padding.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const ITERATIONS: u32 = 120_000;
const SALT_LENGTH: usize = 16;
const KEY_LENGTH: usize = 32;

/// Hashes a plaintext password with a fresh random salt.
///
/// # Panics
///
/// Panics if the system random number generator fails (extremely rare).
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LENGTH];
    getrandom::fill(&mut salt).expect("Failed to generate random bytes");

    let mut key = [0u8; KEY_LENGTH];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, ITERATIONS, &mut key)
        .expect("HMAC accepts any key length");

    format!(
        "pbkdf2:sha256:{}${}${}",
        ITERATIONS,
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(key)
    )
}

/// Verifies a candidate password against a stored hash.
///
/// Returns `false` for a mismatch or a malformed stored hash. Comparison of
/// the derived keys is constant-time.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((iterations, salt, expected)) = parse_stored_hash(stored) else {
        return false;
    };

    let mut computed = vec![0u8; expected.len()];
    if pbkdf2::<HmacSha256>(password.as_bytes(), &salt, iterations, &mut computed).is_err() {
        return false;
    }

    constant_time_eq(&computed, &expected)
}

/// Parses `pbkdf2:sha256:<iterations>$<salt>$<hash>` into its parts.
fn parse_stored_hash(stored: &str) -> Option<(u32, Vec<u8>, Vec<u8>)> {
    let mut parts = stored.split('$');
    let header = parts.next()?;
    let salt = parts.next()?;
    let hash = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let mut header_parts = header.split(':');
    if header_parts.next()? != "pbkdf2" || header_parts.next()? != "sha256" {
        return None;
    }
    let iterations = header_parts.next()?.parse::<u32>().ok()?;

    let salt = URL_SAFE_NO_PAD.decode(salt).ok()?;
    let hash = URL_SAFE_NO_PAD.decode(hash).ok()?;

    Some((iterations, salt, hash))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
