//! One-time password-reset tokens.
//!
//! The raw token travels exactly once, in the emailed reset link. Only its
//! SHA-256 hash is persisted, so a leaked database row cannot be replayed
//! as a live link. Consumption (lookup by hash, expiry check, password
//! update, delete) is a single atomic store operation; see
//! `storage::Store::consume_reset_token`.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Generate a raw reset token: 32 random bytes as lowercase hex.
pub fn generate_reset_token() -> String {
    let mut rng = rand::rng();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);
    hex::encode(bytes)
}

/// Hash a raw reset token for storage or lookup.
pub fn hash_reset_token(raw: &str) -> String {
    let digest = Sha256::digest(raw.as_bytes());
    hex::encode(digest)
}
