use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{RngCore, rng};
use sha2::{Digest, Sha256};

/// A freshly generated invitation secret and its storable digest.
pub struct InviteTokenParts {
    /// The bearer secret. Leaves the engine exactly once, in the create
    /// response; never persisted.
    pub raw_token: String,
    /// Lowercase hex SHA-256 of the secret; the only form that is stored.
    pub token_hash: String,
}

/// Generates a 256-bit invitation secret and its lookup hash.
#[must_use]
pub fn generate_invite_token() -> InviteTokenParts {
    let mut raw_bytes = [0u8; 32];
    rng().fill_bytes(&mut raw_bytes);

    let raw_token = URL_SAFE_NO_PAD.encode(raw_bytes);
    let token_hash = hash_invite_token(&raw_token);

    InviteTokenParts {
        raw_token,
        token_hash,
    }
}

/// Digests a presented token for lookup against the stored hash.
#[must_use]
pub fn hash_invite_token(raw_token: &str) -> String {
    format!("{:x}", Sha256::digest(raw_token.as_bytes()))
}
