//! Short token derivation.
//!
//! Tokens are the first six hex characters of a SHA-256 digest of the long
//! URL, so the same URL always maps to the same token. When a token is
//! already held by a different URL, callers ask for the next attempt, which
//! hashes a salted input instead.

use sha2::{Digest, Sha256};

/// Length of every short token.
pub const TOKEN_LENGTH: usize = 6;

/// Number of salted attempts tried before giving up on a long URL.
pub const MAX_TOKEN_ATTEMPTS: u32 = 5;

/// Derives the short token for `long_url`.
///
/// Attempt `0` hashes the URL itself; attempt `n > 0` hashes `"{long_url}#{n}"`.
/// Both are deterministic.
///
/// # Examples
///
/// ```
/// use tinylink::utils::token_generator::{generate_token, TOKEN_LENGTH};
///
/// let token = generate_token("https://example.com", 0);
/// assert_eq!(token.len(), TOKEN_LENGTH);
/// assert_eq!(token, generate_token("https://example.com", 0));
/// ```
pub fn generate_token(long_url: &str, attempt: u32) -> String {
    let digest = if attempt == 0 {
        Sha256::digest(long_url.as_bytes())
    } else {
        Sha256::digest(format!("{long_url}#{attempt}").as_bytes())
    };

    let mut token = hex::encode(digest);
    token.truncate(TOKEN_LENGTH);
    token
}

/// Returns true if `token` has the shape of a generated token.
///
/// Lets lookups skip storage for input that can never match.
pub fn is_well_formed_token(token: &str) -> bool {
    token.len() == TOKEN_LENGTH
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
