//! Temporal Prior Service (§4.3): nightly prior computation plus an O(1)
//! runtime multiplier lookup. The lookup never touches disk or a database.

use super::types::{BackoffLevel, PriorConfidence, PriorLookup, Recurrence, Seasonality, TemporalPrior};
use crate::entity::SignalCategory;
use crate::episode::TemporalEpisode;
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;

const GLOBAL_ENTITY: &str = "*";
const GLOBAL_CATEGORY: &str = "*";

fn key(entity_id: &str, category: &str) -> String {
    format!("{entity_id}:{category}")
}

/// Collaborator boundary for the nightly recompute / persist cycle (§6.5).
/// The hot-path lookup never goes through this trait.
#[async_trait]
pub trait PriorStore: Send + Sync {
    async fn load_all(&self) -> Result<HashMap<String, TemporalPrior>>;
    async fn save_all(&self, priors: &HashMap<String, TemporalPrior>) -> Result<()>;

    /// Nightly recompute entry point: folds `episodes` into fresh priors
    /// via `compute_priors` and persists them. Callers own fetching the
    /// episode set; this only owns the compute-then-persist half.
    async fn rebuild(&self, episodes: &[TemporalEpisode], now: DateTime<Utc>) -> Result<()> {
        let priors = compute_priors(episodes, now);
        self.save_all(&priors).await
    }
}

/// JSON-file-backed `PriorStore`, matching the wire format in §6.5.
pub struct JsonFilePriorStore {
    path: PathBuf,
}

impl JsonFilePriorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PriorStore for JsonFilePriorStore {
    async fn load_all(&self) -> Result<HashMap<String, TemporalPrior>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "temporal prior file missing, using global default");
                Ok(HashMap::new())
            }
        }
    }

    async fn save_all(&self, priors: &HashMap<String, TemporalPrior>) -> Result<()> {
        let contents = serde_json::to_string_pretty(priors)?;
        std::fs::write(&self.path, contents)
            .map_err(|e| crate::Error::fatal(format!("failed writing priors to {}: {e}", self.path.display())))
    }
}

/// In-memory `PriorStore` for tests and the exerciser binary.
#[derive(Default)]
pub struct InMemoryPriorStore {
    inner: Mutex<HashMap<String, TemporalPrior>>,
}

impl InMemoryPriorStore {
    pub fn new(priors: HashMap<String, TemporalPrior>) -> Self {
        Self {
            inner: Mutex::new(priors),
        }
    }
}

#[async_trait]
impl PriorStore for InMemoryPriorStore {
    async fn load_all(&self) -> Result<HashMap<String, TemporalPrior>> {
        Ok(self.inner.lock().unwrap().clone())
    }

    async fn save_all(&self, priors: &HashMap<String, TemporalPrior>) -> Result<()> {
        *self.inner.lock().unwrap() = priors.clone();
        Ok(())
    }
}

/// The runtime, read-only lookup service. Constructed once at engine start
/// from a loaded prior map; `get_multiplier` never triggers I/O.
pub struct TemporalPriorService {
    priors: HashMap<String, TemporalPrior>,
}

impl TemporalPriorService {
    pub async fn load(store: &dyn PriorStore) -> Result<Self> {
        Ok(Self {
            priors: store.load_all().await?,
        })
    }

    pub fn from_map(priors: HashMap<String, TemporalPrior>) -> Self {
        Self { priors }
    }

    /// O(1) three-level backoff lookup: exact → entity-wide → global
    /// category → global default (never fails the caller).
    pub fn get_multiplier(&self, entity_id: &str, category: SignalCategory) -> PriorLookup {
        let category = category.to_string();

        if let Some(prior) = self.priors.get(&key(entity_id, &category)) {
            return PriorLookup {
                multiplier: prior.multiplier,
                confidence: prior.confidence,
                backoff_level_used: BackoffLevel::ExactEntityCategory,
            };
        }
        if let Some(prior) = self.priors.get(&key(entity_id, GLOBAL_CATEGORY)) {
            return PriorLookup {
                multiplier: prior.multiplier,
                confidence: prior.confidence,
                backoff_level_used: BackoffLevel::EntityWide,
            };
        }
        if let Some(prior) = self.priors.get(&key(GLOBAL_ENTITY, &category)) {
            return PriorLookup {
                multiplier: prior.multiplier,
                confidence: prior.confidence,
                backoff_level_used: BackoffLevel::GlobalCategory,
            };
        }
        PriorLookup::global_default()
    }
}

/// Nightly computation: for each `(entity_id, signal_category)` grouping
/// with ≥ 2 episodes in the last 3 years, compute seasonality, recurrence,
/// momentum and the bounded multiplier (§4.3).
pub fn compute_priors(episodes: &[TemporalEpisode], now: DateTime<Utc>) -> HashMap<String, TemporalPrior> {
    let cutoff = now - chrono::Duration::days(365 * 3);
    let mut grouped: HashMap<(String, String), Vec<&TemporalEpisode>> = HashMap::new();
    for ep in episodes {
        if ep.occurred_at >= cutoff {
            grouped
                .entry((ep.entity_id.clone(), ep.signal_category.clone()))
                .or_default()
                .push(ep);
        }
    }

    let mut out = HashMap::new();
    for ((entity_id, category), mut eps) in grouped {
        if eps.len() < 2 {
            continue;
        }
        eps.sort_by_key(|e| e.occurred_at);

        let mut quarter_counts = [0u32; 4];
        for ep in &eps {
            quarter_counts[(ep.occurred_at.month0() / 3) as usize] += 1;
        }
        let total = eps.len() as f64;
        let seasonality = Seasonality {
            q1: quarter_counts[0] as f64 / total,
            q2: quarter_counts[1] as f64 / total,
            q3: quarter_counts[2] as f64 / total,
            q4: quarter_counts[3] as f64 / total,
        };

        let intervals: Vec<f64> = eps
            .windows(2)
            .map(|w| (w[1].occurred_at - w[0].occurred_at).num_days() as f64)
            .collect();
        let recurrence = if intervals.is_empty() {
            Recurrence {
                mean_interval_days: 0.0,
                stdev_days: 0.0,
            }
        } else {
            let mean = intervals.iter().sum::<f64>() / intervals.len() as f64;
            let variance = intervals.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / intervals.len() as f64;
            Recurrence {
                mean_interval_days: mean,
                stdev_days: variance.sqrt(),
            }
        };

        let momentum_30d = eps
            .iter()
            .filter(|e| (now - e.occurred_at).num_days() <= 30)
            .count() as u32;

        let this_quarter = (now.month0() / 3) as u8 + 1;
        let this_quarter_share = seasonality.share_for_quarter(this_quarter);
        let season_factor = 1.0 + 0.10 * (this_quarter_share - 0.25);
        let momentum_factor = 1.0 + 0.10 * (momentum_30d.min(2) as f64);
        let multiplier = (1.0 * season_factor * momentum_factor).clamp(0.75, 1.40);

        let sample_size = eps.len() as u32;
        out.insert(
            key(&entity_id, &category),
            TemporalPrior {
                seasonality,
                recurrence,
                momentum_30d,
                multiplier,
                confidence: PriorConfidence::from_sample_size(sample_size),
                sample_size,
            },
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EpisodeType;

    fn prior(multiplier: f64, confidence: PriorConfidence) -> TemporalPrior {
        TemporalPrior {
            seasonality: Seasonality { q1: 0.25, q2: 0.25, q3: 0.25, q4: 0.25 },
            recurrence: Recurrence { mean_interval_days: 90.0, stdev_days: 10.0 },
            momentum_30d: 0,
            multiplier,
            confidence,
            sample_size: 5,
        }
    }

    #[test]
    fn scenario_s3_exact_match_wins() {
        let mut map = HashMap::new();
        map.insert("arsenal-fc:CRM".to_string(), prior(1.30, PriorConfidence::High));
        let service = TemporalPriorService::from_map(map);
        let lookup = service.get_multiplier("arsenal-fc", SignalCategory::Crm);
        assert_eq!(lookup.multiplier, 1.30);
        assert_eq!(lookup.backoff_level_used, BackoffLevel::ExactEntityCategory);
    }

    #[test]
    fn scenario_s4_backoff_to_global_category() {
        let mut map = HashMap::new();
        map.insert("*:CRM".to_string(), prior(1.10, PriorConfidence::Medium));
        let service = TemporalPriorService::from_map(map);
        let lookup = service.get_multiplier("arsenal-fc", SignalCategory::Crm);
        assert_eq!(lookup.multiplier, 1.10);
        assert_eq!(lookup.backoff_level_used, BackoffLevel::GlobalCategory);
    }

    #[test]
    fn missing_prior_returns_global_default() {
        let service = TemporalPriorService::from_map(HashMap::new());
        let lookup = service.get_multiplier("unknown", SignalCategory::Crm);
        assert_eq!(lookup, PriorLookup::global_default());
    }

    #[tokio::test]
    async fn json_file_store_roundtrips_through_scratch_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("priors.json");
        let store = JsonFilePriorStore::new(&path);

        let mut priors = HashMap::new();
        priors.insert("arsenal-fc:CRM".to_string(), prior(1.15, PriorConfidence::Medium));
        store.save_all(&priors).await.unwrap();

        let reopened = JsonFilePriorStore::new(&path);
        let loaded = reopened.load_all().await.unwrap();
        assert_eq!(loaded.get("arsenal-fc:CRM").unwrap().multiplier, 1.15);
    }

    #[tokio::test]
    async fn missing_prior_file_falls_back_to_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePriorStore::new(dir.path().join("missing.json"));
        let loaded = store.load_all().await.unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn rebuild_computes_and_persists_priors() {
        use crate::entity::EpisodeType;

        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePriorStore::new(dir.path().join("priors.json"));
        let now = Utc::now();
        let episodes: Vec<TemporalEpisode> = (0..3)
            .map(|i| {
                let mut ep = TemporalEpisode::new("arsenal-fc", "CRM", EpisodeType::TechnologyAdopted, "adopted", 0.9);
                ep.occurred_at = now - chrono::Duration::days(i * 30);
                ep
            })
            .collect();

        store.rebuild(&episodes, now).await.unwrap();

        let loaded = store.load_all().await.unwrap();
        assert!(loaded.contains_key("arsenal-fc:CRM"));
    }

    #[test]
    fn multiplier_always_within_bounds() {
        let now = Utc::now();
        let episodes: Vec<TemporalEpisode> = (0..6)
            .map(|i| {
                let mut ep = TemporalEpisode::new(
                    "arsenal-fc",
                    "CRM",
                    EpisodeType::TechnologyAdopted,
                    "adopted",
                    0.9,
                );
                ep.occurred_at = now - chrono::Duration::days(i * 20);
                ep
            })
            .collect();
        let priors = compute_priors(&episodes, now);
        let prior = priors.get("arsenal-fc:CRM").unwrap();
        assert!(prior.multiplier >= 0.75 && prior.multiplier <= 1.40);
    }
}
