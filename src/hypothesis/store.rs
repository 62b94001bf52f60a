//! Hypothesis Store & EIG Scheduler (§4.1).

use super::eig;
use super::types::Hypothesis;
use crate::entity::SignalCategory;
use crate::validator::types::Signal;
use crate::Result;
use std::collections::HashMap;
use tracing::{debug, info};

/// Keyed lookup and priority selection over hypotheses for a pass. Not a
/// collaborator — internal engine state, one instance per entity run.
#[derive(Default)]
pub struct HypothesisStore {
    by_id: HashMap<String, Hypothesis>,
    /// `(entity_id, pass_number, statement_hash)` → hypothesis_id, enforces
    /// the idempotent-add invariant (property 9).
    dedup_index: HashMap<(String, u8, String), String>,
}

impl HypothesisStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `hypothesis`. If `(entity_id, category, statement_hash)`
    /// already exists for this pass, merges idempotently and returns the
    /// existing hypothesis_id instead of inserting a duplicate.
    pub fn add(&mut self, hypothesis: Hypothesis) -> String {
        let key = (
            hypothesis.entity_id.clone(),
            hypothesis.pass_number,
            hypothesis.statement_hash(),
        );
        if let Some(existing_id) = self.dedup_index.get(&key) {
            debug!(hypothesis_id = %existing_id, "duplicate hypothesis merged idempotently");
            return existing_id.clone();
        }
        let id = hypothesis.hypothesis_id.clone();
        self.dedup_index.insert(key, id.clone());
        self.by_id.insert(id.clone(), hypothesis);
        id
    }

    pub fn get(&self, hypothesis_id: &str) -> Option<&Hypothesis> {
        self.by_id.get(hypothesis_id)
    }

    /// Rewrites confidence/iteration bookkeeping from a validator Signal.
    pub fn update_after_signal(&mut self, signal: &Signal) -> Result<()> {
        let h = self
            .by_id
            .get_mut(&signal.hypothesis_id)
            .ok_or_else(|| crate::Error::fatal(format!("unknown hypothesis {}", signal.hypothesis_id)))?;
        h.confidence = signal.post_confidence;
        h.iterations_attempted += 1;
        h.last_decision = Some(signal.decision);
        h.evidence_ids.push(signal.evidence_id.clone());
        if !signal.evidence_url.is_empty() {
            h.evidence_urls.push(signal.evidence_url.clone());
        }
        h.seen_content_hashes.push(signal.content_hash.clone());
        h.recent_deltas.push(signal.applied_delta);
        if h.recent_deltas.len() > 10 {
            h.recent_deltas.remove(0);
        }
        Ok(())
    }

    pub fn freeze(&mut self, hypothesis_id: &str, reason: &str) {
        if let Some(h) = self.by_id.get_mut(hypothesis_id) {
            h.frozen = true;
            h.freeze_reason = Some(reason.to_string());
            info!(hypothesis_id, reason, "hypothesis frozen");
        }
    }

    /// Freezes `hypothesis_id` with `last_decision = SATURATED` (S6):
    /// confidence saturation is detected per-signal but, unlike category
    /// saturation, overrides the triggering signal's own decision on the
    /// hypothesis record.
    pub fn freeze_confidence_saturated(&mut self, hypothesis_id: &str) {
        if let Some(h) = self.by_id.get_mut(hypothesis_id) {
            h.frozen = true;
            h.freeze_reason = Some("CONFIDENCE_SATURATED".to_string());
            h.last_decision = Some(crate::entity::Decision::Saturated);
            info!(hypothesis_id, "hypothesis frozen on confidence saturation");
        }
    }

    pub fn freeze_category(&mut self, entity_id: &str, pass_number: u8, category: SignalCategory) {
        let ids: Vec<String> = self
            .by_id
            .values()
            .filter(|h| h.entity_id == entity_id && h.pass_number == pass_number && h.category == category && !h.frozen)
            .map(|h| h.hypothesis_id.clone())
            .collect();
        for id in ids {
            self.freeze(&id, "SATURATED");
        }
    }

    /// Returns the unfrozen hypothesis with highest EIG for `(entity_id,
    /// pass_number)`, ties broken by lowest `iterations_attempted` then
    /// lexicographic `hypothesis_id`. `boost` supplies
    /// `(temporal_boost, network_boost)` for a given hypothesis.
    pub fn pick_next(
        &self,
        entity_id: &str,
        pass_number: u8,
        boost: impl Fn(&Hypothesis) -> (f64, f64),
    ) -> Option<Hypothesis> {
        let mut candidates: Vec<(&Hypothesis, f64)> = self
            .by_id
            .values()
            .filter(|h| h.entity_id == entity_id && h.pass_number == pass_number && h.is_selectable())
            .map(|h| {
                let (temporal, network) = boost(h);
                (h, eig::eig(h, temporal, network))
            })
            .collect();

        candidates.sort_by(|(ha, ea), (hb, eb)| {
            eb.partial_cmp(ea)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| ha.iterations_attempted.cmp(&hb.iterations_attempted))
                .then_with(|| ha.hypothesis_id.cmp(&hb.hypothesis_id))
        });

        candidates.into_iter().next().map(|(h, _)| h.clone())
    }

    pub fn hypotheses_for_pass(&self, entity_id: &str, pass_number: u8) -> Vec<&Hypothesis> {
        self.by_id
            .values()
            .filter(|h| h.entity_id == entity_id && h.pass_number == pass_number)
            .collect()
    }

    pub fn all(&self) -> impl Iterator<Item = &Hypothesis> {
        self.by_id.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_boost(_: &Hypothesis) -> (f64, f64) {
        (1.0, 1.0)
    }

    #[test]
    fn add_is_idempotent_for_same_key() {
        let mut store = HypothesisStore::new();
        let a = Hypothesis::seed("e", SignalCategory::Crm, "same statement", 1);
        let b = Hypothesis::seed("e", SignalCategory::Crm, "same statement", 1);
        let id1 = store.add(a);
        let id2 = store.add(b);
        assert_eq!(id1, id2);
        assert_eq!(store.hypotheses_for_pass("e", 1).len(), 1);
    }

    #[test]
    fn pick_next_prefers_highest_eig() {
        let mut store = HypothesisStore::new();
        let low = Hypothesis::seed("e", SignalCategory::Other, "low value", 1);
        let high = Hypothesis::seed("e", SignalCategory::Crm, "high value", 1);
        store.add(low);
        store.add(high.clone());
        let picked = store.pick_next("e", 1, flat_boost).unwrap();
        assert_eq!(picked.hypothesis_id, high.hypothesis_id);
    }

    #[test]
    fn frozen_hypotheses_are_never_picked() {
        let mut store = HypothesisStore::new();
        let h = Hypothesis::seed("e", SignalCategory::Crm, "stmt", 1);
        let id = store.add(h);
        store.freeze(&id, "SATURATED");
        assert!(store.pick_next("e", 1, flat_boost).is_none());
    }

    #[test]
    fn scenario_s6_confidence_saturates_over_ten_iterations() {
        use crate::entity::{Decision, ModelTier};
        use crate::validator::confidence;
        use crate::validator::types::{SaturationFlags, Signal};

        let mut store = HypothesisStore::new();
        let h = Hypothesis::seed("arsenal-fc", SignalCategory::Crm, "stmt", 1);
        let id = store.add(h);

        // Ten tiny deltas summing to 0.008, each below the per-iteration
        // detection window's epsilon threshold when taken together.
        let per_iteration_delta = 0.0008;
        let mut confidence_saturated = false;
        for i in 0..10u32 {
            let h = store.get(&id).unwrap();
            let pre = h.confidence;
            let post = confidence::post_confidence(pre, per_iteration_delta);
            let mut recent_deltas = h.recent_deltas.clone();
            recent_deltas.push(per_iteration_delta);
            confidence_saturated = confidence::is_confidence_saturated(&recent_deltas, 10, 0.01);

            let signal = Signal::new(
                format!("e{i}"), id.clone(), Decision::WeakAccept, "tiny signal",
                per_iteration_delta, 1.0, per_iteration_delta, pre, post,
                SaturationFlags { category_saturated: false, confidence_saturated },
                ModelTier::Small, 1, format!("hash{i}"), "https://example.com",
            );
            store.update_after_signal(&signal).unwrap();
            if signal.saturation_flags.confidence_saturated {
                store.freeze_confidence_saturated(&id);
            }
        }

        assert!(confidence_saturated, "ten 0.0008 deltas should sum under the 0.01 epsilon");
        let h = store.get(&id).unwrap();
        assert!(h.frozen);
        assert_eq!(h.last_decision, Some(Decision::Saturated));
        assert!(store.pick_next("arsenal-fc", 1, flat_boost).is_none());
    }

    #[test]
    fn pick_next_ties_break_by_iterations_then_id() {
        let mut store = HypothesisStore::new();
        let mut a = Hypothesis::seed("e", SignalCategory::Crm, "a", 1);
        a.hypothesis_id = "b-id".into();
        a.iterations_attempted = 0;
        let mut b = Hypothesis::seed("e", SignalCategory::Crm, "b", 1);
        b.hypothesis_id = "a-id".into();
        b.iterations_attempted = 0;
        store.by_id.insert(a.hypothesis_id.clone(), a.clone());
        store.by_id.insert(b.hypothesis_id.clone(), b.clone());
        let picked = store.pick_next("e", 1, flat_boost).unwrap();
        assert_eq!(picked.hypothesis_id, "a-id");
    }
}
