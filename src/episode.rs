//! TemporalEpisode record and the episode/graph collaborator interface.

use crate::entity::EpisodeType;
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalEpisode {
    pub episode_id: String,
    pub entity_id: String,
    pub signal_category: String,
    pub episode_type: EpisodeType,
    pub occurred_at: DateTime<Utc>,
    pub description: String,
    pub confidence_score: f64,
}

impl TemporalEpisode {
    pub fn new(
        entity_id: impl Into<String>,
        signal_category: impl Into<String>,
        episode_type: EpisodeType,
        description: impl Into<String>,
        confidence_score: f64,
    ) -> Self {
        Self {
            episode_id: Uuid::new_v4().to_string(),
            entity_id: entity_id.into(),
            signal_category: signal_category.into(),
            episode_type,
            occurred_at: Utc::now(),
            description: description.into(),
            confidence_score,
        }
    }
}

/// Graph/episode collaborator (§6.3): persists episodes and answers
/// network-context queries used by the EIG `network_boost` term and pass-2
/// context assembly.
#[async_trait]
pub trait EpisodeStore: Send + Sync {
    async fn record(&self, episode: TemporalEpisode) -> Result<()>;

    /// Episodes for an entity, optionally since a timestamp, newest first.
    async fn episodes(
        &self,
        entity_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<TemporalEpisode>>;

    /// Partner/competitor entity ids known to the graph collaborator.
    async fn peers(&self, entity_id: &str) -> Result<Vec<String>>;
}

/// In-memory reference implementation used by tests and the exerciser
/// binary. Peers are a static adjacency list supplied at construction.
#[derive(Default)]
pub struct InMemoryEpisodeStore {
    episodes: Mutex<Vec<TemporalEpisode>>,
    peers: HashMap<String, Vec<String>>,
}

impl InMemoryEpisodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_peers(mut self, entity_id: impl Into<String>, peers: Vec<String>) -> Self {
        self.peers.insert(entity_id.into(), peers);
        self
    }
}

#[async_trait]
impl EpisodeStore for InMemoryEpisodeStore {
    async fn record(&self, episode: TemporalEpisode) -> Result<()> {
        self.episodes
            .lock()
            .map_err(|_| crate::Error::storage("episode store mutex poisoned"))?
            .push(episode);
        Ok(())
    }

    async fn episodes(
        &self,
        entity_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<TemporalEpisode>> {
        let guard = self
            .episodes
            .lock()
            .map_err(|_| crate::Error::storage("episode store mutex poisoned"))?;
        let mut matched: Vec<TemporalEpisode> = guard
            .iter()
            .filter(|e| e.entity_id == entity_id)
            .filter(|e| since.map(|s| e.occurred_at >= s).unwrap_or(true))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Ok(matched)
    }

    async fn peers(&self, entity_id: &str) -> Result<Vec<String>> {
        Ok(self.peers.get(entity_id).cloned().unwrap_or_default())
    }
}
