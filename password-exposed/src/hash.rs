use std::fmt;
use std::str::FromStr;

use sha1::{Digest, Sha1};

use crate::error::Error;

/// Length of a hex encoded SHA-1 digest.
pub const HASH_LEN: usize = 40;

/// The length of the hash prefix sent to the range endpoint (5 hex characters).
pub const PREFIX_LEN: usize = 5;

/// The length of the hash suffix compared against range records.
pub const SUFFIX_LEN: usize = HASH_LEN - PREFIX_LEN;

/// Hex lookup table, uppercase to match the range endpoint's records.
pub const HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";

/// A SHA-1 password digest as 40 uppercase hex characters.
///
/// The plaintext password never outlives [`hash_password`]; everything past
/// that point only sees this type. `Debug` prints the prefix alone.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PasswordHash([u8; HASH_LEN]);

impl PasswordHash {
    /// Hex encodes a raw 20-byte SHA-1 digest.
    pub fn from_digest(digest: &[u8; 20]) -> Self {
        let mut hex = [0u8; HASH_LEN];
        for (i, byte) in digest.iter().enumerate() {
            hex[i * 2] = HEX_CHARS[(byte >> 4) as usize];
            hex[i * 2 + 1] = HEX_CHARS[(byte & 0x0f) as usize];
        }
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        // SAFETY: every constructor fills the buffer with ASCII hex digits.
        unsafe { std::str::from_utf8_unchecked(&self.0) }
    }

    /// The first 5 hex characters, as sent to the range endpoint.
    pub fn prefix(&self) -> &str {
        &self.as_str()[..PREFIX_LEN]
    }

    /// The remaining 35 hex characters, matched against range records.
    pub fn suffix(&self) -> &str {
        &self.as_str()[PREFIX_LEN..]
    }

    /// Cache key for the range this hash falls in: `XX_YYY` over the prefix.
    ///
    /// Every hash sharing a prefix maps to the same key, since the cached
    /// value is the whole range body.
    pub fn range_key(&self) -> String {
        let prefix = self.prefix();
        format!("{}_{}", &prefix[..2], &prefix[2..])
    }
}

impl FromStr for PasswordHash {
    type Err = Error;

    /// Parses a hex SHA-1 digest in either case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != HASH_LEN || !bytes.iter().all(u8::is_ascii_hexdigit) {
            return Err(Error::InvalidHash { len: s.len() });
        }

        let mut hex = [0u8; HASH_LEN];
        for (out, byte) in hex.iter_mut().zip(bytes) {
            *out = byte.to_ascii_uppercase();
        }
        Ok(Self(hex))
    }
}

impl fmt::Display for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PasswordHash({}..)", self.prefix())
    }
}

/// Computes the SHA-1 digest of `password`.
pub fn hash_password(password: &str) -> PasswordHash {
    let mut hasher = Sha1::new();
    hasher.update(password.as_bytes());
    let digest: [u8; 20] = hasher.finalize().into();

    PasswordHash::from_digest(&digest)
}
