//! Sign-in nonces.

use crate::error::{IdentityError, IdentityResult};
use rand::Rng;
use sha2::{Digest, Sha256};

/// Characters a nonce is drawn from.
pub const NONCE_CHARSET: &[u8; 64] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVXYZabcdefghijklmnopqrstuvwxyz-._";

pub const DEFAULT_NONCE_LENGTH: usize = 32;

/// Generates a random nonce of `length` characters from [`NONCE_CHARSET`].
///
/// The raw nonce goes to the identity service at sign-in; its
/// [`sha256_hex`] digest goes into the provider's authorization request.
pub fn generate_nonce(length: usize) -> IdentityResult<String> {
    if length == 0 {
        return Err(IdentityError::InvalidNonceLength);
    }
    let mut rng = rand::thread_rng();
    Ok((0..length)
        .map(|_| char::from(NONCE_CHARSET[rng.gen_range(0..NONCE_CHARSET.len())]))
        .collect())
}

/// Lowercase hex SHA-256 of `input`.
#[must_use]
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}
