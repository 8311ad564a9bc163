//! Shared types for ingestion

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// The atomic retrieval unit: a contextualised passage of a skill document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Stable 128-bit content fingerprint, hex-encoded
    pub id: String,
    /// The raw passage body (what is returned to callers)
    pub text: String,
    /// The body prefixed with its provenance line (what is embedded)
    pub contextual_text: String,
    /// Owning skill name
    pub skill: String,
    /// Source file name
    pub file: String,
    /// Full source file path
    pub file_path: String,
    /// Section title within the file
    pub section: String,
    /// Domain tags inherited from the containing skill
    pub domains: Vec<String>,
}

impl Chunk {
    /// Derive the stable chunk id from its identifying content
    ///
    /// The id is a SHA-256 digest of `skill/file/section/<first 50 chars of
    /// body>`, truncated to 128 bits and hex-encoded. Identical content
    /// always produces the identical id.
    #[must_use]
    pub fn derive_id(skill: &str, file: &str, section: &str, body: &str) -> String {
        let prefix: String = body.chars().take(50).collect();
        let raw = format!("{skill}/{file}/{section}/{prefix}");
        let digest = Sha256::digest(raw.as_bytes());
        digest[..16].iter().fold(String::new(), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_stable() {
        let a = Chunk::derive_id("swift", "concurrency.md", "Actors", "Actors serialize access");
        let b = Chunk::derive_id("swift", "concurrency.md", "Actors", "Actors serialize access");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32); // 128 bits, hex
    }

    #[test]
    fn test_id_differs_by_component() {
        let base = Chunk::derive_id("swift", "a.md", "S", "body");
        assert_ne!(base, Chunk::derive_id("swiftui", "a.md", "S", "body"));
        assert_ne!(base, Chunk::derive_id("swift", "b.md", "S", "body"));
        assert_ne!(base, Chunk::derive_id("swift", "a.md", "T", "body"));
        assert_ne!(base, Chunk::derive_id("swift", "a.md", "S", "other"));
    }

    #[test]
    fn test_id_uses_body_prefix_only() {
        let long_a = format!("{}{}", "x".repeat(50), "tail one");
        let long_b = format!("{}{}", "x".repeat(50), "tail two");
        assert_eq!(
            Chunk::derive_id("s", "f", "sec", &long_a),
            Chunk::derive_id("s", "f", "sec", &long_b)
        );
    }
}
