//! Cache fingerprints derived from generation inputs.
//!
//! A fingerprint is the normalized key used for cache addressing: text
//! prompts are case-folded and trimmed so equivalent prompts collide, and
//! files are keyed by a content hash so identical uploads collide regardless
//! of filename.

use core::fmt;

use sha2::{Digest, Sha256};

/// Normalized key for a generation input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fingerprint {
    /// Lowercased, whitespace-trimmed prompt text.
    Text(String),
    /// SHA-256 hex digest of file contents.
    File(String),
}

impl Fingerprint {
    /// Creates a fingerprint from prompt text.
    ///
    /// Prompts that differ only in case or surrounding whitespace produce
    /// the same fingerprint.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::Text(text.trim().to_lowercase())
    }

    /// Creates a fingerprint from raw file contents.
    ///
    /// The key is the content hash, not the filename or size, so renamed
    /// copies of the same file still hit the cache.
    #[must_use]
    pub fn from_file_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self::File(format!("{:x}", hasher.finalize()))
    }

    /// Returns the key string backing this fingerprint.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Text(key) | Self::File(key) => key,
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(key) => write!(f, "text:{key}"),
            Self::File(key) => write!(f, "file:{key}"),
        }
    }
}
