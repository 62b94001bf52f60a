use crate::entity::{Decision, SignalCategory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub hypothesis_id: String,
    pub entity_id: String,
    pub category: SignalCategory,
    pub statement: String,
    pub prior_probability: f64,
    pub confidence: f64,
    pub iterations_attempted: u32,
    pub last_decision: Option<Decision>,
    pub derived_from: Option<String>,
    pub pass_number: u8,
    pub evidence_ids: Vec<String>,
    /// Source URLs of the accepted evidence behind this hypothesis, in
    /// acceptance order. Feeds `OpportunityLine.supporting_evidence_urls`
    /// directly so report-building stays a pure fold over the store (§6.6).
    pub evidence_urls: Vec<String>,
    pub frozen: bool,
    pub freeze_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Rolling window of the last `CONFIDENCE_SATURATION_WINDOW` applied
    /// deltas, used to detect confidence saturation (property 6 / S6).
    pub recent_deltas: Vec<f64>,
    /// Content hashes of evidence already evaluated against this
    /// hypothesis, for the pass-1 novelty check.
    pub seen_content_hashes: Vec<String>,
}

impl Hypothesis {
    pub const START_CONFIDENCE: f64 = 0.20;

    pub fn seed(
        entity_id: impl Into<String>,
        category: SignalCategory,
        statement: impl Into<String>,
        pass_number: u8,
    ) -> Self {
        Self::new(
            entity_id,
            category,
            statement,
            Self::START_CONFIDENCE,
            Self::START_CONFIDENCE,
            pass_number,
            None,
        )
    }

    pub fn child(
        entity_id: impl Into<String>,
        category: SignalCategory,
        statement: impl Into<String>,
        parent_confidence: f64,
        parent_id: impl Into<String>,
        pass_number: u8,
    ) -> Self {
        let prior = parent_confidence * 0.9;
        Self::new(
            entity_id,
            category,
            statement,
            prior,
            prior,
            pass_number,
            Some(parent_id.into()),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn new(
        entity_id: impl Into<String>,
        category: SignalCategory,
        statement: impl Into<String>,
        prior_probability: f64,
        confidence: f64,
        pass_number: u8,
        derived_from: Option<String>,
    ) -> Self {
        Self {
            hypothesis_id: Uuid::new_v4().to_string(),
            entity_id: entity_id.into(),
            category,
            statement: statement.into(),
            prior_probability,
            confidence,
            iterations_attempted: 0,
            last_decision: None,
            derived_from,
            pass_number,
            evidence_ids: Vec::new(),
            evidence_urls: Vec::new(),
            frozen: false,
            freeze_reason: None,
            created_at: Utc::now(),
            recent_deltas: Vec::new(),
            seen_content_hashes: Vec::new(),
        }
    }

    /// Dedup key used by `HypothesisStore::add` for the idempotent-add
    /// invariant (`(entity_id, category, statement_hash)`).
    pub fn dedup_key(entity_id: &str, category: SignalCategory, statement: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(entity_id.as_bytes());
        hasher.update([0u8]);
        hasher.update(category.to_string().as_bytes());
        hasher.update([0u8]);
        hasher.update(statement.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn statement_hash(&self) -> String {
        Self::dedup_key(&self.entity_id, self.category, &self.statement)
    }

    pub fn is_selectable(&self) -> bool {
        !self.frozen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_prior_is_parent_times_point_nine() {
        let h = Hypothesis::child("arsenal-fc", SignalCategory::Crm, "stmt", 0.06, "parent", 2);
        assert!((h.prior_probability - 0.054).abs() < 1e-9);
    }

    #[test]
    fn dedup_key_is_stable_for_identical_inputs() {
        let a = Hypothesis::dedup_key("arsenal-fc", SignalCategory::Crm, "will modernize CRM");
        let b = Hypothesis::dedup_key("arsenal-fc", SignalCategory::Crm, "will modernize CRM");
        assert_eq!(a, b);
    }

    #[test]
    fn dedup_key_differs_on_statement() {
        let a = Hypothesis::dedup_key("arsenal-fc", SignalCategory::Crm, "will modernize CRM");
        let b = Hypothesis::dedup_key("arsenal-fc", SignalCategory::Crm, "will modernize ERP");
        assert_ne!(a, b);
    }
}
