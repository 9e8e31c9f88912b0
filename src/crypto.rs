//! Credential hashing
//!
//! Passwords are stored as salted PBKDF2-HMAC-SHA256 digests in the form
//!
//! ```text
//! pbkdf2-sha256$<iterations>$<base64 salt>$<base64 digest>
//! ```
//!
//! Verification recomputes the digest with the stored salt and iteration
//! count and compares in constant time.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;

pub const DEFAULT_ITERATIONS: u32 = 100_000;

fn derive(password: &[u8], salt: &[u8], iterations: u32) -> [u8; DIGEST_LEN] {
    let mut digest = [0u8; DIGEST_LEN];
    pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut digest);
    digest
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str, iterations: u32) -> String {
    let salt: [u8; SALT_LEN] = rand::random();
    let digest = derive(password.as_bytes(), &salt, iterations.max(1));
    format!(
        "{}${}${}${}",
        SCHEME,
        iterations.max(1),
        BASE64.encode(salt),
        BASE64.encode(digest)
    )
}

/// Check `password` against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(digest), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    if scheme != SCHEME {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (BASE64.decode(salt), BASE64.decode(digest)) else {
        return false;
    };
    if iterations == 0 {
        return false;
    }

    let actual = derive(password.as_bytes(), &salt, iterations);
    actual[..].ct_eq(&expected[..]).into()
}

/// Stand-in hash for unknown accounts. Built with the same work factor as
/// real hashes so a missing user costs the same as a wrong password. The
/// empty password it is derived from is rejected before any lookup.
pub fn dummy_hash(iterations: u32) -> String {
    hash_password("", iterations)
}
