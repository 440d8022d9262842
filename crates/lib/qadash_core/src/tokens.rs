//! Opaque random tokens for password resets, invites and invite codes.
//!
//! Plaintext tokens only ever leave the server inside an email link; the
//! database stores their SHA-256 hex digest.

use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use sha2::{Digest, Sha256};

/// Length of reset and invite tokens.
pub const TOKEN_LEN: usize = 64;

/// Length of project invite codes.
pub const INVITE_CODE_LEN: usize = 10;

/// Generate a random alphanumeric string of `len` characters.
pub fn random_alphanumeric(len: usize) -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generate a random token (64 alphanumeric chars).
pub fn generate_token() -> String {
    random_alphanumeric(TOKEN_LEN)
}

/// Generate a short, human-shareable project invite code.
pub fn generate_invite_code() -> String {
    random_alphanumeric(INVITE_CODE_LEN).to_uppercase()
}

/// SHA-256 hash a token for storage.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_alphanumeric_and_sized() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn invite_code_is_upper_case() {
        let code = generate_invite_code();
        assert_eq!(code.len(), INVITE_CODE_LEN);
        assert_eq!(code, code.to_uppercase());
    }

    #[test]
    fn hash_is_stable_hex_digest() {
        let a = hash_token("abc");
        assert_eq!(a, hash_token("abc"));
        assert_eq!(a.len(), 64);
        assert_eq!(
            a,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_ne!(a, hash_token("abd"));
    }
}
