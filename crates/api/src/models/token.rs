//! API token keys.
//!
//! A key is 20 random bytes rendered as 40 lowercase hex characters. Only
//! its SHA-256 digest is persisted.

use core::fmt;

use sha2::{Digest, Sha256};

/// Number of random bytes in a freshly generated key.
const KEY_BYTES: usize = 20;

/// A plaintext API token as presented by a client.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenKey(String);

impl TokenKey {
    /// Generate a new random key.
    #[must_use]
    pub fn generate() -> Self {
        let bytes: [u8; KEY_BYTES] = rand::random();
        Self(hex::encode(bytes))
    }

    /// Wrap a key received from a client.
    #[must_use]
    pub fn from_client(raw: &str) -> Self {
        Self(raw.trim().to_owned())
    }

    /// The key as shown to its owner.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hex-encoded SHA-256 digest used for storage and lookup.
    #[must_use]
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }
}

impl fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenKey([REDACTED])")
    }
}
