//! Query identity and cache key derivation
//!
//! A `QueryKey` names a logical query as an ordered list of parts, starting
//! with a human-readable tag. Two keys with the same parts always derive the
//! same cache key; keys differing in any part derive different ones.

use sha2::{Digest, Sha256};

/// Ordered identifier for a logical query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryKey {
    parts: Vec<String>,
}

impl QueryKey {
    /// Creates a query key from its leading tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            parts: vec![tag.into()],
        }
    }

    /// Appends a part to the key
    pub fn with_part(mut self, part: impl ToString) -> Self {
        self.parts.push(part.to_string());
        self
    }

    /// Returns the parts in order
    #[allow(dead_code)]
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Derives the cache key for this query.
    ///
    /// Parts are hashed with a separator byte between them, so part
    /// boundaries cannot collide the way a plain concatenation would.
    pub fn cache_key(&self) -> String {
        let mut hasher = Sha256::new();
        for part in &self.parts {
            hasher.update(part.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}
