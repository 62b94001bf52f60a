//! Adaptive Hop Selector (§4.4).

use super::types::{roi, HopChoice, ALL_HOPS};
use crate::entity::SourceType;
use crate::hypothesis::Hypothesis;
use crate::state::DiscoveryState;

const FAILURE_EXCLUSION_THRESHOLD: u32 = 2;
const BLACKLIST_PENALTY: f64 = 0.05;

pub struct AdaptiveHopSelector;

impl AdaptiveHopSelector {
    pub fn new() -> Self {
        Self
    }

    fn hop_name(hop: SourceType) -> String {
        hop.to_string()
    }

    /// Picks the next hop for `hypothesis`, excluding hops already tried
    /// this iteration and hops with `consecutive_failures >= 2`. If all
    /// hops are excluded, failure counters are reset once and selection
    /// proceeds. Returns `None` when no hop remains (exhausted this
    /// iteration).
    pub fn pick(
        &self,
        hypothesis: &Hypothesis,
        eig: f64,
        state: &mut DiscoveryState,
        hops_tried_this_iteration: &[SourceType],
        blacklist_hit_count: impl Fn(SourceType) -> u32,
    ) -> Option<HopChoice> {
        let candidates = self.score_candidates(hypothesis, eig, state, hops_tried_this_iteration, &blacklist_hit_count);

        if candidates.is_empty() {
            let any_excluded_by_failures = ALL_HOPS
                .iter()
                .any(|h| state.hop_failures(&Self::hop_name(*h)) >= FAILURE_EXCLUSION_THRESHOLD);
            if any_excluded_by_failures {
                state.reset_hop_failures();
                let retried = self.score_candidates(hypothesis, eig, state, hops_tried_this_iteration, &blacklist_hit_count);
                return self.best(retried, hypothesis);
            }
            return None;
        }

        self.best(candidates, hypothesis)
    }

    fn score_candidates(
        &self,
        _hypothesis: &Hypothesis,
        eig: f64,
        state: &DiscoveryState,
        hops_tried_this_iteration: &[SourceType],
        blacklist_hit_count: &impl Fn(SourceType) -> u32,
    ) -> Vec<(SourceType, f64)> {
        ALL_HOPS
            .iter()
            .copied()
            .filter(|h| !hops_tried_this_iteration.contains(h))
            .filter(|h| state.hop_failures(&Self::hop_name(*h)) < FAILURE_EXCLUSION_THRESHOLD)
            .map(|h| {
                let score = roi(h) * eig - BLACKLIST_PENALTY * blacklist_hit_count(h) as f64;
                (h, score)
            })
            .collect()
    }

    fn best(&self, mut candidates: Vec<(SourceType, f64)>, hypothesis: &Hypothesis) -> Option<HopChoice> {
        candidates.sort_by(|(ha, sa), (hb, sb)| {
            sb.partial_cmp(sa)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| roi(*hb).partial_cmp(&roi(*ha)).unwrap_or(std::cmp::Ordering::Equal))
                .then_with(|| Self::hop_name(*ha).cmp(&Self::hop_name(*hb)))
        });
        candidates.into_iter().next().map(|(hop, _)| HopChoice {
            hop,
            resolver_keywords: resolver_hint(hypothesis),
        })
    }
}

impl Default for AdaptiveHopSelector {
    fn default() -> Self {
        Self::new()
    }
}

fn resolver_hint(hypothesis: &Hypothesis) -> Vec<String> {
    hypothesis
        .statement
        .split_whitespace()
        .filter(|w| w.len() > 3)
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}
