//! Cache Entry Module
//!
//! Defines cache entries with their write timestamp, and validated cache keys.

use std::fmt;
use std::fmt::Write as _;

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

use crate::cache::MAX_KEY_LENGTH;
use crate::error::{CacheError, Result};

/// Longest escaped stem kept verbatim; longer ones are cut and suffixed with
/// a digest so the file name stays under common filesystem limits.
const MAX_FILE_STEM: usize = 200;

/// Hex characters of the SHA-256 digest kept in a shortened file name
const DIGEST_CHARS: usize = 32;

// == Cache Entry ==
/// A serialized payload plus the time it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Serialized content, opaque to the tiers
    pub payload: Vec<u8>,
    /// Write time; staleness is measured from here, never from last access
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry stamped with the given write time.
    pub fn new(payload: Vec<u8>, stored_at: DateTime<Utc>) -> Self {
        Self { payload, stored_at }
    }

    // == Age ==
    /// Time elapsed since the entry was written, clamped at zero.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        let age = now - self.stored_at;
        if age < Duration::zero() {
            Duration::zero()
        } else {
            age
        }
    }

    // == Is Expired ==
    /// Checks if the entry is stale.
    ///
    /// Boundary condition: an entry whose age equals the TTL exactly is still
    /// fresh; it becomes stale once the age strictly exceeds the TTL.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) > ttl
    }

    /// Payload size, used as the memory tier cost.
    pub fn cost(&self) -> usize {
        self.payload.len()
    }
}

// == Cache Key ==
/// Validated cache key: non-empty and at most `MAX_KEY_LENGTH` bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Validates and wraps a key.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(CacheError::InvalidKey("key cannot be empty".to_string()));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidKey(format!(
                "key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // == File Name ==
    /// Deterministic file name for the disk tier.
    ///
    /// ASCII alphanumerics, `-` and `_` are kept; every other byte is written
    /// as `%XX`, so distinct keys never share a file and no key can leave the
    /// cache directory.
    pub fn file_name(&self) -> String {
        let mut name = String::with_capacity(self.0.len() + 5);
        for byte in self.0.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
                name.push(byte as char);
            } else {
                let _ = write!(name, "%{:02X}", byte);
            }
        }

        if name.len() > MAX_FILE_STEM {
            let digest = hex::encode(Sha256::digest(self.0.as_bytes()));
            // Escaped output is ASCII, any byte index is a char boundary.
            // '~' is always escaped, so shortened names never collide with
            // plain ones.
            name.truncate(MAX_FILE_STEM - DIGEST_CHARS - 1);
            name.push('~');
            name.push_str(&digest[..DIGEST_CHARS]);
        }

        name.push_str(".json");
        name
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
