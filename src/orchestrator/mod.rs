//! Multi-Pass Orchestrator (§4.5): pass sequencing, hypothesis evolution,
//! context assembly. Drives the Hypothesis Store across passes, invoking
//! the Ralph Validator per piece of evidence.

pub mod evolution;
pub mod report;

use crate::collaborators::{LanguageModel, Scraper, SearchEngine};
use crate::config::EngineConfig;
use crate::entity::{Decision, Entity, EpisodeType, ModelTier, SignalCategory};
use crate::episode::{EpisodeStore, TemporalEpisode};
use crate::evidence::Evidence;
use crate::hop::AdaptiveHopSelector;
use crate::hypothesis::{Hypothesis, HypothesisStore};
use crate::seeder::HypothesisSeeder;
use crate::signal_log::SignalLog;
use crate::state::DiscoveryState;
use crate::temporal::TemporalPriorService;
use crate::validator::types::{PassContext, SaturationFlags, Signal, SignalAction};
use crate::validator::RalphValidator;
use crate::{Error, Result};
use report::{Diagnostics, OpportunityLine, OpportunityReport, RecommendedAction, SkippedHypothesis};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct MultiPassOrchestrator {
    config: EngineConfig,
    scraper: Arc<dyn Scraper>,
    episode_store: Arc<dyn EpisodeStore>,
    signal_log: Arc<dyn SignalLog>,
    temporal: Arc<TemporalPriorService>,
    seeder: Arc<dyn HypothesisSeeder>,
    validator: RalphValidator,
    hop_selector: AdaptiveHopSelector,
}

pub struct OrchestratorBuilder {
    config: EngineConfig,
    scraper: Option<Arc<dyn Scraper>>,
    llm: Option<Arc<dyn LanguageModel>>,
    episode_store: Option<Arc<dyn EpisodeStore>>,
    signal_log: Option<Arc<dyn SignalLog>>,
    temporal: Option<Arc<TemporalPriorService>>,
    seeder: Option<Arc<dyn HypothesisSeeder>>,
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            scraper: None,
            llm: None,
            episode_store: None,
            signal_log: None,
            temporal: None,
            seeder: None,
        }
    }
}

impl OrchestratorBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn scraper(mut self, scraper: Arc<dyn Scraper>) -> Self {
        self.scraper = Some(scraper);
        self
    }

    pub fn llm(mut self, llm: Arc<dyn LanguageModel>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn episode_store(mut self, store: Arc<dyn EpisodeStore>) -> Self {
        self.episode_store = Some(store);
        self
    }

    pub fn signal_log(mut self, log: Arc<dyn SignalLog>) -> Self {
        self.signal_log = Some(log);
        self
    }

    pub fn temporal(mut self, temporal: Arc<TemporalPriorService>) -> Self {
        self.temporal = Some(temporal);
        self
    }

    pub fn seeder(mut self, seeder: Arc<dyn HypothesisSeeder>) -> Self {
        self.seeder = Some(seeder);
        self
    }

    pub fn build(self) -> Result<MultiPassOrchestrator> {
        let llm = self.llm.ok_or_else(|| Error::fatal("orchestrator requires a LanguageModel collaborator"))?;
        let validator = RalphValidator::new(llm, self.config.clone());
        Ok(MultiPassOrchestrator {
            scraper: self.scraper.ok_or_else(|| Error::fatal("orchestrator requires a Scraper collaborator"))?,
            episode_store: self.episode_store.ok_or_else(|| Error::fatal("orchestrator requires an EpisodeStore collaborator"))?,
            signal_log: self.signal_log.ok_or_else(|| Error::fatal("orchestrator requires a SignalLog collaborator"))?,
            temporal: self.temporal.ok_or_else(|| Error::fatal("orchestrator requires a TemporalPriorService"))?,
            seeder: self.seeder.ok_or_else(|| Error::fatal("orchestrator requires a HypothesisSeeder"))?,
            validator,
            hop_selector: AdaptiveHopSelector::new(),
            config: self.config,
        })
    }
}

impl MultiPassOrchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    #[instrument(skip(self, entity, cancel), fields(entity_id = %entity.entity_id))]
    pub async fn run(&self, entity: &Entity, cancel: &AtomicBool) -> Result<OpportunityReport> {
        let mut store = HypothesisStore::new();
        let mut diagnostics = Diagnostics::default();

        let seeds = self.seeder.seed(entity, self.config.tier);
        for h in seeds {
            store.add(h);
        }

        let mut pass_number: u8 = 1;
        let mut cancelled = false;

        while pass_number <= self.config.max_passes {
            let peers = self.peer_context(&entity.entity_id).await?;
            let outcome = self
                .run_pass(entity, pass_number, &mut store, &peers, cancel)
                .await?;

            diagnostics.skipped.extend(outcome.skipped);
            diagnostics.passes_completed = pass_number;

            if outcome.cancelled {
                cancelled = true;
                break;
            }
            if outcome.spawned_count == 0 {
                info!(pass_number, "no new hypotheses spawned, ending run");
                break;
            }
            pass_number += 1;
        }

        diagnostics.cancelled = cancelled;
        Ok(self.build_report(entity, &store, diagnostics))
    }

    /// Gathers peer technology adoptions for network-context scoring and
    /// for the pass-2+ validator prompt (§4.5 pass-sequence table, row 2):
    /// counts feed `network_boost`, named notes feed `PassContext`.
    async fn peer_context(&self, entity_id: &str) -> Result<PeerContext> {
        let mut ctx = PeerContext::default();
        let peers = self.episode_store.peers(entity_id).await?;
        for peer in peers {
            let episodes = self.episode_store.episodes(&peer, None).await?;
            for ep in episodes {
                if ep.episode_type == EpisodeType::TechnologyAdopted {
                    let category = SignalCategory::coerce(&ep.signal_category);
                    *ctx.counts.entry(category).or_insert(0) += 1;
                    ctx.notes.entry(category).or_default().push(format!("{peer} adopted {category}"));
                }
            }
        }
        Ok(ctx)
    }

    /// Assembles the textual prompt context for `hypothesis` per the
    /// pass-sequence table: network context from pass 2, prior-pass top
    /// hypotheses plus temporal narrative from pass 3 on.
    fn assemble_context(
        &self,
        entity_id: &str,
        pass_number: u8,
        hypothesis: &Hypothesis,
        peers: &PeerContext,
        temporal_lookup: &crate::temporal::types::PriorLookup,
        store: &HypothesisStore,
    ) -> PassContext {
        let mut ctx = PassContext::empty();
        if pass_number >= 2 {
            ctx.peer_notes = peers.notes.get(&hypothesis.category).cloned().unwrap_or_default();
        }
        if pass_number >= 3 {
            let mut prior_hypotheses = store.hypotheses_for_pass(entity_id, pass_number - 1);
            prior_hypotheses.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));
            ctx.prior_pass_top_hypotheses = prior_hypotheses.into_iter().take(3).map(|h| h.statement.clone()).collect();
            ctx.temporal_narrative = format!(
                "{:?} backoff, multiplier={:.2}, confidence={:?}",
                temporal_lookup.backoff_level_used, temporal_lookup.multiplier, temporal_lookup.confidence
            );
        }
        ctx
    }

    async fn run_pass(
        &self,
        entity: &Entity,
        pass_number: u8,
        store: &mut HypothesisStore,
        peers: &PeerContext,
        cancel: &AtomicBool,
    ) -> Result<PassOutcome> {
        let replayed_signals = self.signal_log.replay(&entity.entity_id, pass_number).await?;
        let mut state = DiscoveryState::replay(&entity.entity_id, pass_number, &replayed_signals, |hypothesis_id| {
            store.get(hypothesis_id).map(|h| h.category)
        });
        let mut skipped = Vec::new();
        let mut spawned_count = 0u32;
        let max_iterations = self.config.per_category_budget * SignalCategory::ALL.len() as u32;

        loop {
            if cancel.load(Ordering::SeqCst) {
                return Ok(PassOutcome { skipped, spawned_count, cancelled: true });
            }
            if state.iterations_this_pass >= max_iterations {
                info!(pass_number, "per-pass iteration budget exhausted");
                break;
            }

            let boost_fn = |h: &Hypothesis| {
                let temporal = self.temporal.get_multiplier(&entity.entity_id, h.category).multiplier;
                let network = crate::hypothesis::network_boost(peers.counts.get(&h.category).copied().unwrap_or(0));
                (temporal, network)
            };
            let Some(hypothesis) = store.pick_next(&entity.entity_id, pass_number, boost_fn) else {
                break;
            };

            let temporal_lookup = self.temporal.get_multiplier(&entity.entity_id, hypothesis.category);
            let network = crate::hypothesis::network_boost(
                peers.counts.get(&hypothesis.category).copied().unwrap_or(0),
            );
            let eig_value = crate::hypothesis::compute_eig(&hypothesis, temporal_lookup.multiplier, network);
            let context = self.assemble_context(&entity.entity_id, pass_number, &hypothesis, peers, &temporal_lookup, store);

            match self.fetch_evidence(entity, &hypothesis, eig_value, &mut state).await {
                Some(evidence) => {
                    let accepted_before = state.accepted_in_category(hypothesis.category);
                    let rejects_before = state.consecutive_rejects.get(&hypothesis.category).copied().unwrap_or(0);
                    let signal = self
                        .validator
                        .evaluate(
                            &hypothesis,
                            &evidence,
                            &entity.display_name,
                            accepted_before,
                            rejects_before,
                            temporal_lookup.multiplier,
                            &context,
                        )
                        .await?;

                    self.signal_log.append(&entity.entity_id, &signal).await?;
                    store.update_after_signal(&signal)?;
                    state.apply_signal(&signal, hypothesis.category);

                    self.handle_signal_effects(
                        entity,
                        &hypothesis,
                        &signal,
                        &evidence,
                        pass_number,
                        store,
                        &mut spawned_count,
                    )
                    .await?;
                }
                None => {
                    let signal = self.no_progress_signal(&hypothesis, pass_number);
                    self.signal_log.append(&entity.entity_id, &signal).await?;
                    store.update_after_signal(&signal)?;
                    state.apply_signal(&signal, hypothesis.category);
                    skipped.push(SkippedHypothesis {
                        hypothesis_id: hypothesis.hypothesis_id.clone(),
                        reason: "hops exhausted this iteration".to_string(),
                    });
                }
            }
        }

        Ok(PassOutcome { skipped, spawned_count, cancelled: false })
    }

    #[allow(clippy::too_many_arguments)]
    async fn handle_signal_effects(
        &self,
        entity: &Entity,
        hypothesis: &Hypothesis,
        signal: &Signal,
        evidence: &Evidence,
        pass_number: u8,
        store: &mut HypothesisStore,
        spawned_count: &mut u32,
    ) -> Result<()> {
        match signal.action() {
            SignalAction::LockIn => {
                let episode = TemporalEpisode::new(
                    entity.entity_id.clone(),
                    hypothesis.category.to_string(),
                    EpisodeType::TechnologyAdopted,
                    signal.reasoning.clone(),
                    signal.post_confidence,
                );
                self.episode_store.record(episode).await?;
            }
            SignalAction::StopCategory => {
                store.freeze_category(&entity.entity_id, pass_number, hypothesis.category);
            }
            SignalAction::Continue => {}
        }

        if signal.saturation_flags.confidence_saturated {
            store.freeze_confidence_saturated(&hypothesis.hypothesis_id);
        }

        if signal.decision == Decision::Accept {
            if let Some(child) = evolution::evolve(hypothesis, signal, evidence, pass_number + 1) {
                store.add(child);
                *spawned_count += 1;
            }
        }

        Ok(())
    }

    /// Resolves evidence for `hypothesis` by trying hops in the selector's
    /// preference order until one yields a scraping result, recording
    /// success/failure on `state` as it goes.
    async fn fetch_evidence(
        &self,
        _entity: &Entity,
        hypothesis: &Hypothesis,
        eig_value: f64,
        state: &mut DiscoveryState,
    ) -> Option<Evidence> {
        let mut tried = Vec::new();
        loop {
            let choice = self.hop_selector.pick(hypothesis, eig_value, state, &tried, |_| 0)?;
            tried.push(choice.hop);
            let hop_name = choice.hop.to_string();

            let query = choice.resolver_keywords.join(" ");
            let search_result = self.scraper.search(&query, SearchEngine::Google).await;
            let hits = match search_result {
                Ok(hits) if !hits.is_empty() => hits,
                Ok(_) => {
                    state.record_hop_failure(&hop_name);
                    continue;
                }
                Err(err) => {
                    warn!(hop = %hop_name, error = %err, "scraper search failed");
                    state.record_hop_failure(&hop_name);
                    continue;
                }
            };

            match self.scraper.fetch(&hits[0].url).await {
                Ok(fetched) => {
                    state.record_hop_success(&hop_name);
                    return Some(Evidence::new(
                        hypothesis.hypothesis_id.clone(),
                        hits[0].url.clone(),
                        choice.hop,
                        fetched.markdown,
                        fetched.fetched_at,
                    ));
                }
                Err(err) => {
                    warn!(hop = %hop_name, error = %err, "scraper fetch failed");
                    state.record_hop_failure(&hop_name);
                }
            }
        }
    }

    fn no_progress_signal(&self, hypothesis: &Hypothesis, pass_number: u8) -> Signal {
        Signal::new(
            String::new(),
            hypothesis.hypothesis_id.clone(),
            Decision::NoProgress,
            "hops exhausted this iteration".to_string(),
            self.config.no_progress_delta,
            1.0,
            0.0,
            hypothesis.confidence,
            hypothesis.confidence,
            SaturationFlags::default(),
            ModelTier::Small,
            pass_number,
            String::new(),
            String::new(),
        )
    }

    fn build_report(&self, entity: &Entity, store: &HypothesisStore, diagnostics: Diagnostics) -> OpportunityReport {
        let mut best: HashMap<SignalCategory, &Hypothesis> = HashMap::new();
        for h in store.all() {
            best.entry(h.category)
                .and_modify(|current| {
                    if h.confidence > current.confidence {
                        *current = h;
                    }
                })
                .or_insert(h);
        }

        let mut opportunities: Vec<OpportunityLine> = best
            .into_values()
            .map(|h| OpportunityLine {
                category: h.category,
                top_hypothesis_id: h.hypothesis_id.clone(),
                top_hypothesis_statement: h.statement.clone(),
                confidence: h.confidence,
                supporting_evidence_urls: h.evidence_urls.clone(),
                recommended_action: RecommendedAction::from_confidence(h.confidence),
            })
            .collect();
        opportunities.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));

        OpportunityReport {
            entity_id: entity.entity_id.clone(),
            opportunities,
            diagnostics,
        }
    }
}

struct PassOutcome {
    skipped: Vec<SkippedHypothesis>,
    spawned_count: u32,
    cancelled: bool,
}

/// Peer technology adoptions, gathered once per pass: `counts` feeds the
/// EIG `network_boost` scalar, `notes` feeds `PassContext`'s prompt text.
#[derive(Default)]
struct PeerContext {
    counts: HashMap<SignalCategory, u32>,
    notes: HashMap<SignalCategory, Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{FetchResult, InMemoryScraper, SearchHit, StaticLanguageModel};
    use crate::entity::SourceType;
    use crate::episode::InMemoryEpisodeStore;
    use crate::seeder::TemplateHypothesisSeeder;
    use crate::signal_log::InMemorySignalLog;
    use crate::temporal::TemporalPriorService;
    use chrono::Utc;
    use std::collections::HashMap as Map;

    fn accept_json() -> String {
        serde_json::json!({
            "is_new": true, "entity_specific": true,
            "implies_future_procurement": true, "credible_source": true,
            "reasoning": "ok"
        })
        .to_string()
    }

    #[test]
    fn pass_one_context_carries_no_network_or_temporal_narrative() {
        let orchestrator = MultiPassOrchestrator::builder()
            .config(EngineConfig::default())
            .scraper(Arc::new(InMemoryScraper::new()))
            .llm(Arc::new(StaticLanguageModel::new(accept_json())))
            .episode_store(Arc::new(InMemoryEpisodeStore::new()))
            .signal_log(Arc::new(InMemorySignalLog::new()))
            .temporal(Arc::new(TemporalPriorService::from_map(Map::new())))
            .seeder(Arc::new(TemplateHypothesisSeeder))
            .build()
            .unwrap();

        let mut peers = PeerContext::default();
        peers.notes.insert(SignalCategory::Crm, vec!["chelsea-fc adopted CRM".to_string()]);
        let store = HypothesisStore::new();
        let h = Hypothesis::seed("arsenal-fc", SignalCategory::Crm, "modernize CRM", 1);
        let lookup = crate::temporal::types::PriorLookup::global_default();

        let ctx = orchestrator.assemble_context("arsenal-fc", 1, &h, &peers, &lookup, &store);
        assert!(ctx.as_prompt_block().is_empty());
    }

    #[test]
    fn pass_two_context_carries_peer_notes_but_no_temporal_narrative() {
        let orchestrator = MultiPassOrchestrator::builder()
            .config(EngineConfig::default())
            .scraper(Arc::new(InMemoryScraper::new()))
            .llm(Arc::new(StaticLanguageModel::new(accept_json())))
            .episode_store(Arc::new(InMemoryEpisodeStore::new()))
            .signal_log(Arc::new(InMemorySignalLog::new()))
            .temporal(Arc::new(TemporalPriorService::from_map(Map::new())))
            .seeder(Arc::new(TemplateHypothesisSeeder))
            .build()
            .unwrap();

        let mut peers = PeerContext::default();
        peers.notes.insert(SignalCategory::Crm, vec!["chelsea-fc adopted CRM".to_string()]);
        let store = HypothesisStore::new();
        let h = Hypothesis::seed("arsenal-fc", SignalCategory::Crm, "modernize CRM", 2);
        let lookup = crate::temporal::types::PriorLookup::global_default();

        let ctx = orchestrator.assemble_context("arsenal-fc", 2, &h, &peers, &lookup, &store);
        assert_eq!(ctx.peer_notes, vec!["chelsea-fc adopted CRM".to_string()]);
        assert!(ctx.temporal_narrative.is_empty());
    }

    #[test]
    fn pass_three_context_adds_prior_pass_top_hypotheses_and_temporal_narrative() {
        let orchestrator = MultiPassOrchestrator::builder()
            .config(EngineConfig::default())
            .scraper(Arc::new(InMemoryScraper::new()))
            .llm(Arc::new(StaticLanguageModel::new(accept_json())))
            .episode_store(Arc::new(InMemoryEpisodeStore::new()))
            .signal_log(Arc::new(InMemorySignalLog::new()))
            .temporal(Arc::new(TemporalPriorService::from_map(Map::new())))
            .seeder(Arc::new(TemplateHypothesisSeeder))
            .build()
            .unwrap();

        let peers = PeerContext::default();
        let mut store = HypothesisStore::new();
        let mut prior = Hypothesis::seed("arsenal-fc", SignalCategory::Crm, "arsenal-fc will modernize CRM", 2);
        prior.confidence = 0.31;
        store.add(prior);
        let h = Hypothesis::seed("arsenal-fc", SignalCategory::Crm, "modernize CRM further", 3);
        let lookup = crate::temporal::types::PriorLookup::global_default();

        let ctx = orchestrator.assemble_context("arsenal-fc", 3, &h, &peers, &lookup, &store);
        assert_eq!(ctx.prior_pass_top_hypotheses, vec!["arsenal-fc will modernize CRM".to_string()]);
        assert!(!ctx.temporal_narrative.is_empty());
    }

    #[tokio::test]
    async fn single_pass_run_produces_report_with_no_opportunities_when_no_evidence() {
        let orchestrator = MultiPassOrchestrator::builder()
            .config(EngineConfig::builder().max_passes(1).build().unwrap())
            .scraper(Arc::new(InMemoryScraper::new()))
            .llm(Arc::new(StaticLanguageModel::new(accept_json())))
            .episode_store(Arc::new(InMemoryEpisodeStore::new()))
            .signal_log(Arc::new(InMemorySignalLog::new()))
            .temporal(Arc::new(TemporalPriorService::from_map(Map::new())))
            .seeder(Arc::new(TemplateHypothesisSeeder))
            .build()
            .unwrap();

        let entity = Entity::new("arsenal-fc", "Arsenal");
        let cancel = AtomicBool::new(false);
        let report = orchestrator.run(&entity, &cancel).await.unwrap();
        assert_eq!(report.entity_id, "arsenal-fc");
        assert!(!report.opportunities.is_empty());
        assert_eq!(report.diagnostics.passes_completed, 1);
    }

    #[tokio::test]
    async fn run_respects_cancellation_flag() {
        let orchestrator = MultiPassOrchestrator::builder()
            .config(EngineConfig::default())
            .scraper(Arc::new(
                InMemoryScraper::new().with_search(
                    "modernize crm platform",
                    vec![SearchHit { title: "t".into(), url: "https://example.com".into(), snippet: "s".into() }],
                ).with_fetch(
                    "https://example.com",
                    FetchResult { markdown: "Arsenal hiring salesforce administrator".into(), fetched_at: Utc::now(), content_hash: None },
                ),
            ))
            .llm(Arc::new(StaticLanguageModel::new(accept_json())))
            .episode_store(Arc::new(InMemoryEpisodeStore::new()))
            .signal_log(Arc::new(InMemorySignalLog::new()))
            .temporal(Arc::new(TemporalPriorService::from_map(Map::new())))
            .seeder(Arc::new(TemplateHypothesisSeeder))
            .build()
            .unwrap();

        let entity = Entity::new("arsenal-fc", "Arsenal");
        let cancel = AtomicBool::new(true);
        let report = orchestrator.run(&entity, &cancel).await.unwrap();
        assert!(report.diagnostics.cancelled);
    }

    #[tokio::test]
    async fn accepted_signal_evidence_url_flows_into_report() {
        let orchestrator = MultiPassOrchestrator::builder()
            .config(EngineConfig::builder().max_passes(1).build().unwrap())
            .scraper(Arc::new(
                InMemoryScraper::new().with_search(
                    "modernize crm platform",
                    vec![SearchHit { title: "t".into(), url: "https://example.com/arsenal-crm".into(), snippet: "s".into() }],
                ).with_fetch(
                    "https://example.com/arsenal-crm",
                    FetchResult { markdown: "Arsenal hiring salesforce administrator".into(), fetched_at: Utc::now(), content_hash: None },
                ),
            ))
            .llm(Arc::new(StaticLanguageModel::new(accept_json())))
            .episode_store(Arc::new(InMemoryEpisodeStore::new()))
            .signal_log(Arc::new(InMemorySignalLog::new()))
            .temporal(Arc::new(TemporalPriorService::from_map(Map::new())))
            .seeder(Arc::new(TemplateHypothesisSeeder))
            .build()
            .unwrap();

        let entity = Entity::new("arsenal-fc", "Arsenal");
        let cancel = AtomicBool::new(false);
        let report = orchestrator.run(&entity, &cancel).await.unwrap();

        let crm_line = report
            .opportunities
            .iter()
            .find(|o| o.category == SignalCategory::Crm)
            .expect("crm opportunity present");
        assert!(crm_line.supporting_evidence_urls.contains(&"https://example.com/arsenal-crm".to_string()));
    }

    #[tokio::test]
    async fn replayed_signals_carry_over_iteration_budget() {
        let signal_log = Arc::new(InMemorySignalLog::new());
        let config = EngineConfig::builder().max_passes(1).per_category_budget(5).build().unwrap();
        let orchestrator = MultiPassOrchestrator::builder()
            .config(config.clone())
            .scraper(Arc::new(
                InMemoryScraper::new().with_search(
                    "modernize crm platform",
                    vec![SearchHit { title: "t".into(), url: "https://example.com".into(), snippet: "s".into() }],
                ).with_fetch(
                    "https://example.com",
                    FetchResult { markdown: "Arsenal hiring salesforce administrator".into(), fetched_at: Utc::now(), content_hash: None },
                ),
            ))
            .llm(Arc::new(StaticLanguageModel::new(accept_json())))
            .episode_store(Arc::new(InMemoryEpisodeStore::new()))
            .signal_log(signal_log.clone())
            .temporal(Arc::new(TemporalPriorService::from_map(Map::new())))
            .seeder(Arc::new(TemplateHypothesisSeeder))
            .build()
            .unwrap();

        let entity = Entity::new("arsenal-fc", "Arsenal");
        let mut store = HypothesisStore::new();
        for h in TemplateHypothesisSeeder.seed(&entity, config.tier) {
            store.add(h);
        }
        let hypothesis_id = store.hypotheses_for_pass("arsenal-fc", 1)[0].hypothesis_id.clone();

        // Pre-exhaust the per-pass iteration budget as if this were a
        // resume after a crash mid-pass: the prior run's signals are
        // already durable in the log.
        let max_iterations = config.per_category_budget * SignalCategory::ALL.len() as u32;
        for i in 0..max_iterations {
            let signal = Signal::new(
                format!("e{i}"), hypothesis_id.clone(), Decision::NoProgress, "prior run",
                0.0, 1.0, 0.0, 0.20, 0.20, SaturationFlags::default(), ModelTier::Small, 1,
                format!("hash{i}"), "https://example.com",
            );
            signal_log.append("arsenal-fc", &signal).await.unwrap();
        }

        let cancel = AtomicBool::new(false);
        let peers = PeerContext::default();
        let outcome = orchestrator
            .run_pass(&entity, 1, &mut store, &peers, &cancel)
            .await
            .unwrap();

        assert_eq!(outcome.spawned_count, 0);
        assert!(outcome.skipped.is_empty(), "budget should already be exhausted on entry, no iterations run");
    }

    #[test]
    fn source_type_unused_import_guard() {
        let _ = SourceType::TechNews;
    }
}
