//! Evidence — a single web-sourced artifact (§3).

use crate::entity::SourceType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Evidence content snippets are bounded to this many bytes before being
/// stored or injected into an LLM prompt (§5 backpressure).
pub const MAX_CONTENT_BYTES: usize = 8_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub evidence_id: String,
    pub hypothesis_id: String,
    pub source_url: String,
    pub source_type: SourceType,
    pub content: String,
    pub content_hash: String,
    pub fetched_at: DateTime<Utc>,
}

impl Evidence {
    pub fn new(
        hypothesis_id: impl Into<String>,
        source_url: impl Into<String>,
        source_type: SourceType,
        content: impl Into<String>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let mut content = content.into();
        if content.len() > MAX_CONTENT_BYTES {
            let mut boundary = MAX_CONTENT_BYTES;
            while !content.is_char_boundary(boundary) {
                boundary -= 1;
            }
            content.truncate(boundary);
        }
        let content_hash = Self::hash(&content);
        Self {
            evidence_id: Uuid::new_v4().to_string(),
            hypothesis_id: hypothesis_id.into(),
            source_url: source_url.into(),
            source_type,
            content,
            content_hash,
            fetched_at,
        }
    }

    pub fn hash(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_is_truncated_to_bound() {
        let huge = "x".repeat(MAX_CONTENT_BYTES + 500);
        let ev = Evidence::new("h", "https://example.com", SourceType::TechNews, huge, Utc::now());
        assert_eq!(ev.content.len(), MAX_CONTENT_BYTES);
    }

    #[test]
    fn truncation_never_splits_a_multibyte_char() {
        // Pad so the boundary at MAX_CONTENT_BYTES lands mid-character.
        let padding = "x".repeat(MAX_CONTENT_BYTES - 1);
        let huge = format!("{padding}\u{e9}\u{e9}\u{e9}\u{e9}\u{e9}\u{e9}\u{e9}\u{e9}");
        let ev = Evidence::new("h", "https://example.com", SourceType::TechNews, huge, Utc::now());
        assert!(ev.content.len() <= MAX_CONTENT_BYTES);
        assert!(ev.content.is_char_boundary(ev.content.len()));
    }

    #[test]
    fn identical_content_hashes_identically() {
        let a = Evidence::new("h", "u", SourceType::TechNews, "same", Utc::now());
        let b = Evidence::new("h", "u2", SourceType::TechNews, "same", Utc::now());
        assert_eq!(a.content_hash, b.content_hash);
    }
}
