use rand::distr::Alphanumeric;
use rand::rngs::OsRng;
use rand::{Rng, TryRngCore};
use subtle::ConstantTimeEq;
use tracing::warn;

/// Length of the public short id placed in shareable URLs.
pub const SHORT_ID_LENGTH: usize = 8;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a secret key with 128 bits of OS randomness, formatted as a UUID.
///
/// If the OS source is unavailable, falls back to two thread-RNG words
/// encoded in base 36. Never fails.
pub fn generate_secret_id() -> String {
    let mut bytes = [0u8; 16];
    match OsRng.try_fill_bytes(&mut bytes) {
        Ok(()) => uuid::Builder::from_random_bytes(bytes)
            .into_uuid()
            .to_string(),
        Err(e) => {
            warn!("OS randomness unavailable, using fallback secret generator: {}", e);
            fallback_secret_id()
        }
    }
}

fn fallback_secret_id() -> String {
    let mut rng = rand::rng();
    let mut out = to_base36(rng.random::<u64>());
    out.push_str(&to_base36(rng.random::<u64>()));
    out
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::with_capacity(13);
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// Generate `len` characters drawn uniformly from `[A-Za-z0-9]`.
///
/// Not unique on its own; the link store retries on collision.
pub fn generate_short_id(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Compare two secret keys without leaking the position of the first mismatch.
pub fn secrets_match(expected: &str, supplied: &str) -> bool {
    expected.as_bytes().ct_eq(supplied.as_bytes()).into()
}
