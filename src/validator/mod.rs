//! Ralph Validator — the 3-pass deterministic/LLM/confirmation cascade
//! that produces a Signal for one (hypothesis, evidence) pair (§4.2).
//! This is the only place confidence is computed.

pub mod confidence;
pub mod rubric;
pub mod types;

use crate::collaborators::{ChatMessage, LanguageModel};
use crate::config::EngineConfig;
use crate::entity::{Decision, ModelTier, SourceType};
use crate::evidence::Evidence;
use crate::hypothesis::Hypothesis;
use crate::{Error, Result};
use rubric::{pass1_filter, AcceptCriteria, Pass1Outcome};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use types::{PassContext, SaturationFlags, Signal};

pub struct RalphValidator {
    llm: Arc<dyn LanguageModel>,
    config: EngineConfig,
    entity_domain_blacklist: Vec<String>,
    blacklisted_phrases: Vec<(SourceType, String)>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Pass2Response {
    is_new: bool,
    entity_specific: bool,
    implies_future_procurement: bool,
    credible_source: bool,
    reasoning: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Pass3Response {
    confirmed: bool,
    reasoning: String,
}

impl RalphValidator {
    pub fn new(llm: Arc<dyn LanguageModel>, config: EngineConfig) -> Self {
        Self {
            llm,
            config,
            entity_domain_blacklist: Vec::new(),
            blacklisted_phrases: default_blacklisted_phrases(),
        }
    }

    pub fn with_entity_domain_blacklist(mut self, domains: Vec<String>) -> Self {
        self.entity_domain_blacklist = domains;
        self
    }

    #[instrument(skip(self, hypothesis, evidence), fields(hypothesis_id = %hypothesis.hypothesis_id))]
    #[allow(clippy::too_many_arguments)]
    pub async fn evaluate(
        &self,
        hypothesis: &Hypothesis,
        evidence: &Evidence,
        entity_display_name: &str,
        accepted_in_category_before: u32,
        consecutive_rejects_before: u32,
        temporal_multiplier: f64,
        context: &PassContext,
    ) -> Result<Signal> {
        let category_multiplier = confidence::category_multiplier(accepted_in_category_before);

        match pass1_filter(
            hypothesis,
            evidence,
            &self.entity_domain_blacklist,
            &self.blacklisted_phrases,
            entity_display_name,
        ) {
            Pass1Outcome::Reject(reason) => {
                return Ok(self.finalize(
                    hypothesis,
                    evidence,
                    Decision::Reject,
                    reason,
                    self.config.reject_delta,
                    category_multiplier,
                    temporal_multiplier,
                    consecutive_rejects_before + 1,
                ));
            }
            Pass1Outcome::NoProgress(reason) => {
                return Ok(self.finalize(
                    hypothesis,
                    evidence,
                    Decision::NoProgress,
                    reason,
                    self.config.no_progress_delta,
                    category_multiplier,
                    temporal_multiplier,
                    consecutive_rejects_before,
                ));
            }
            Pass1Outcome::Pass => {}
        }

        let criteria = match self.run_pass2(hypothesis, evidence, context).await {
            Ok(c) => c,
            Err(err) => {
                warn!(error = %err, "pass-2 LLM call exhausted retries, emitting NO_PROGRESS");
                return Ok(self.finalize(
                    hypothesis,
                    evidence,
                    Decision::NoProgress,
                    format!("llm transient failure: {err}"),
                    self.config.no_progress_delta,
                    category_multiplier,
                    temporal_multiplier,
                    consecutive_rejects_before,
                ));
            }
        };

        let mut decision = criteria.derive_decision();
        let mut reasoning = format!("pass2 criteria met: {}/4", criteria.met_count());

        if decision == Decision::Accept {
            match self.run_pass3(hypothesis, evidence, context).await {
                Ok(confirmed) if !confirmed => {
                    decision = Decision::WeakAccept;
                    reasoning.push_str("; pass3 downgraded to WEAK_ACCEPT");
                }
                Ok(_) => {
                    reasoning.push_str("; pass3 confirmed");
                }
                Err(err) => {
                    warn!(error = %err, "pass-3 confirmation failed, keeping pass-2 ACCEPT unconfirmed");
                }
            }
        }

        let raw_delta = match decision {
            Decision::Accept => self.config.accept_delta,
            Decision::WeakAccept => self.config.weak_accept_delta,
            Decision::Reject => self.config.reject_delta,
            Decision::NoProgress | Decision::Saturated => self.config.no_progress_delta,
        };

        let consecutive_rejects_after = if decision == Decision::Reject {
            consecutive_rejects_before + 1
        } else {
            0
        };

        Ok(self.finalize(
            hypothesis,
            evidence,
            decision,
            reasoning,
            raw_delta,
            category_multiplier,
            temporal_multiplier,
            consecutive_rejects_after,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn finalize(
        &self,
        hypothesis: &Hypothesis,
        evidence: &Evidence,
        decision: Decision,
        reasoning: impl Into<String>,
        raw_delta: f64,
        category_multiplier: f64,
        temporal_multiplier: f64,
        consecutive_rejects_after: u32,
    ) -> Signal {
        let applied = confidence::applied_delta(raw_delta, category_multiplier, temporal_multiplier);
        let pre = hypothesis.confidence;
        let post = confidence::post_confidence(pre, applied);

        let mut recent_deltas = hypothesis.recent_deltas.clone();
        recent_deltas.push(applied);
        let confidence_saturated = confidence::is_confidence_saturated(
            &recent_deltas,
            self.config.confidence_saturation_window as usize,
            self.config.confidence_saturation_epsilon,
        );
        let category_saturated = consecutive_rejects_after >= self.config.saturation_threshold;

        if category_saturated {
            info!(category = %hypothesis.category, "category saturated");
        }

        Signal::new(
            evidence.evidence_id.clone(),
            hypothesis.hypothesis_id.clone(),
            decision,
            reasoning,
            raw_delta,
            category_multiplier,
            applied,
            pre,
            post,
            SaturationFlags {
                category_saturated,
                confidence_saturated,
            },
            ModelTier::Small,
            hypothesis.pass_number,
            evidence.content_hash.clone(),
            evidence.source_url.clone(),
        )
    }

    async fn run_pass2(&self, hypothesis: &Hypothesis, evidence: &Evidence, context: &PassContext) -> Result<AcceptCriteria> {
        let prompt = format!(
            "Hypothesis: {}\nCategory: {}\nEvidence source: {:?}\nEvidence:\n{}\n\n\
             {}\
             Evaluate against the four ACCEPT criteria (new, entity-specific, \
             implies future procurement, credible source). Respond as JSON with \
             fields is_new, entity_specific, implies_future_procurement, \
             credible_source, reasoning.",
            hypothesis.statement, hypothesis.category, evidence.source_type, evidence.content,
            context.as_prompt_block(),
        );
        let response = self
            .call_with_retry(ModelTier::Small, &[ChatMessage::user(prompt)], "pass2")
            .await?;
        let parsed: Pass2Response = serde_json::from_str(&response.text)
            .map_err(|e| Error::transient("llm", format!("pass2 response not parseable: {e}")))?;
        Ok(AcceptCriteria {
            is_new: parsed.is_new,
            entity_specific: parsed.entity_specific,
            implies_future_procurement: parsed.implies_future_procurement,
            credible_source: parsed.credible_source,
        })
    }

    async fn run_pass3(&self, hypothesis: &Hypothesis, evidence: &Evidence, context: &PassContext) -> Result<bool> {
        let prompt = format!(
            "Confirm or refute this ACCEPT decision for hypothesis '{}' given evidence:\n{}\n\n{}\
             Respond as JSON with fields confirmed (bool), reasoning.",
            hypothesis.statement, evidence.content, context.as_prompt_block(),
        );
        let response = self
            .call_with_retry(ModelTier::Large, &[ChatMessage::user(prompt)], "pass3")
            .await?;
        let parsed: Pass3Response = serde_json::from_str(&response.text)
            .map_err(|e| Error::transient("llm", format!("pass3 response not parseable: {e}")))?;
        Ok(parsed.confirmed)
    }

    async fn call_with_retry(
        &self,
        tier: ModelTier,
        messages: &[ChatMessage],
        stage: &str,
    ) -> Result<crate::collaborators::CompletionResponse> {
        let mut last_err = None;
        for (attempt, backoff_secs) in self.config.retry_backoff_secs.iter().enumerate() {
            match self
                .llm
                .complete(tier, messages, self.config.max_token_budget_per_iteration)
                .await
            {
                Ok(resp) => return Ok(resp),
                Err(err) => {
                    debug!(attempt, stage, error = %err, "llm call failed, retrying");
                    last_err = Some(err);
                    if attempt + 1 < self.config.retry_backoff_secs.len() {
                        tokio::time::sleep(std::time::Duration::from_secs(*backoff_secs)).await;
                    }
                }
            }
        }
        Err(last_err.unwrap_or_else(|| Error::transient("llm", "exhausted retries")))
    }
}

fn default_blacklisted_phrases() -> Vec<(SourceType, String)> {
    vec![(SourceType::LinkedinOperationalJob, "Kit Assistant".to_string())]
}
