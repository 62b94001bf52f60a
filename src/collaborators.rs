//! Scraping and LLM collaborator interfaces (§6.1, §6.2).
//!
//! The engine depends on behaviour, not implementation: these traits are
//! the only contact points with the open web and with language models.
//! Both ship an in-memory reference implementation for tests.

use crate::entity::ModelTier;
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    Google,
    Bing,
    Yandex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    pub markdown: String,
    pub fetched_at: DateTime<Utc>,
    /// Stable content hash for the novelty check; computed by the
    /// collaborator if available, otherwise left for the caller to derive.
    pub content_hash: Option<String>,
}

/// Scraping collaborator (§6.1). Must honour polite timeouts; not required
/// to deduplicate — the validator's pass-1 filter owns novelty checking.
#[async_trait]
pub trait Scraper: Send + Sync {
    async fn search(&self, query: &str, engine: SearchEngine) -> Result<Vec<SearchHit>>;
    async fn fetch(&self, url: &str) -> Result<FetchResult>;
}

/// Fixture scraper backed by a static table keyed by query/url, for tests
/// and the exerciser binary.
#[derive(Default)]
pub struct InMemoryScraper {
    search_results: HashMap<String, Vec<SearchHit>>,
    fetch_results: HashMap<String, FetchResult>,
}

impl InMemoryScraper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, query: impl Into<String>, hits: Vec<SearchHit>) -> Self {
        self.search_results.insert(query.into(), hits);
        self
    }

    pub fn with_fetch(mut self, url: impl Into<String>, result: FetchResult) -> Self {
        self.fetch_results.insert(url.into(), result);
        self
    }
}

#[async_trait]
impl Scraper for InMemoryScraper {
    async fn search(&self, query: &str, _engine: SearchEngine) -> Result<Vec<SearchHit>> {
        Ok(self.search_results.get(query).cloned().unwrap_or_default())
    }

    async fn fetch(&self, url: &str) -> Result<FetchResult> {
        self.fetch_results
            .get(url)
            .cloned()
            .ok_or_else(|| crate::Error::invalid_evidence(url, "no fixture registered"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub text: String,
    pub stop_reason: String,
}

/// LLM collaborator (§6.2). Idempotent retries are the engine's
/// responsibility; implementations only forward the call.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(
        &self,
        tier: ModelTier,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<CompletionResponse>;
}

/// Deterministic test double returning canned responses keyed by a
/// substring match against the last user message, falling back to a
/// configurable default. Mirrors the validator's `MockValidator` pattern.
#[derive(Default)]
pub struct StaticLanguageModel {
    canned: Mutex<Vec<(String, CompletionResponse)>>,
    default_response: CompletionResponse,
}

impl StaticLanguageModel {
    pub fn new(default_text: impl Into<String>) -> Self {
        Self {
            canned: Mutex::new(Vec::new()),
            default_response: CompletionResponse {
                text: default_text.into(),
                stop_reason: "end_turn".to_string(),
            },
        }
    }

    pub fn with_response(self, contains: impl Into<String>, text: impl Into<String>) -> Self {
        self.canned.lock().unwrap().push((
            contains.into(),
            CompletionResponse {
                text: text.into(),
                stop_reason: "end_turn".to_string(),
            },
        ));
        self
    }
}

#[async_trait]
impl LanguageModel for StaticLanguageModel {
    async fn complete(
        &self,
        _tier: ModelTier,
        messages: &[ChatMessage],
        _max_tokens: u32,
    ) -> Result<CompletionResponse> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .unwrap_or("");
        let canned = self.canned.lock().unwrap();
        for (needle, response) in canned.iter() {
            if last_user.contains(needle.as_str()) {
                return Ok(response.clone());
            }
        }
        Ok(self.default_response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_scraper_returns_fixtures() {
        let scraper = InMemoryScraper::new().with_search(
            "arsenal crm",
            vec![SearchHit {
                title: "t".into(),
                url: "https://example.com".into(),
                snippet: "s".into(),
            }],
        );
        let hits = scraper.search("arsenal crm", SearchEngine::Google).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn fetch_missing_fixture_is_invalid_evidence() {
        let scraper = InMemoryScraper::new();
        let err = scraper.fetch("https://missing.example.com").await.unwrap_err();
        assert!(matches!(err, crate::Error::InvalidEvidence { .. }));
    }

    #[tokio::test]
    async fn static_llm_matches_canned_response() {
        let llm = StaticLanguageModel::new("default").with_response("Salesforce", "matched");
        let resp = llm
            .complete(
                ModelTier::Small,
                &[ChatMessage::user("hiring a Salesforce administrator")],
                100,
            )
            .await
            .unwrap();
        assert_eq!(resp.text, "matched");
    }
}
