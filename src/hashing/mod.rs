//! Stable synthetic identifiers for claims and citances.
//!
//! Keys are BLAKE3 over `(corpus_id, kind, text)` truncated to 64 bits. They are assigned once
//! at ingestion and never depend on oracle output, so the same corpus always produces the
//! same keys across runs and machines.

use std::fmt;

use blake3::Hasher;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Which side of the bipartite match set an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// An extracted claim.
    Claim,
    /// A citation sentence.
    Citance,
}

impl ItemKind {
    fn tag(self) -> &'static [u8] {
        match self {
            ItemKind::Claim => b"claim",
            ItemKind::Citance => b"citance",
        }
    }
}

/// 64-bit identity of a claim or citance within a corpus.
///
/// Serialized as 16 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey(u64);

impl ItemKey {
    /// Derives the key for `text` of `kind` inside `corpus_id`.
    pub fn derive(corpus_id: &str, kind: ItemKind, text: &str) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(corpus_id.as_bytes());
        hasher.update(b"|");
        hasher.update(kind.tag());
        hasher.update(b"|");
        hasher.update(text.as_bytes());

        let hash = hasher.finalize();
        Self(truncate_to_u64(hash.as_bytes()))
    }
}

impl From<u64> for ItemKey {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl Serialize for ItemKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ItemKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        u64::from_str_radix(&raw, 16)
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

/// Truncates a BLAKE3 digest to its first 8 bytes (little endian).
///
/// 64 bits is plenty for keys scoped to a single corpus: a paper has at most a few hundred
/// claims and citances, so collisions are not a practical concern.
#[inline]
pub fn truncate_to_u64(digest: &[u8; 32]) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[0..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_deterministic() {
        let a = ItemKey::derive("42", ItemKind::Claim, "X improves Y");
        let b = ItemKey::derive("42", ItemKind::Claim, "X improves Y");
        assert_eq!(a, b);
    }

    #[test]
    fn test_derive_separates_kind_and_corpus() {
        let claim = ItemKey::derive("42", ItemKind::Claim, "same text");
        let citance = ItemKey::derive("42", ItemKind::Citance, "same text");
        let other_corpus = ItemKey::derive("43", ItemKind::Claim, "same text");
        assert_ne!(claim, citance);
        assert_ne!(claim, other_corpus);
    }

    #[test]
    fn test_display_is_zero_padded_hex() {
        assert_eq!(ItemKey::from(0xab).to_string(), "00000000000000ab");
    }

    #[test]
    fn test_serde_uses_hex_string() {
        let key = ItemKey::derive("1", ItemKind::Citance, "text");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, format!("\"{key}\""));
        let back: ItemKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn test_deserialize_rejects_non_hex() {
        assert!(serde_json::from_str::<ItemKey>("\"not-hex\"").is_err());
    }
}
