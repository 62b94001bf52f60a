//! `DiscoveryState` — per-`(entity_id, pass_number)` working set (§3).
//!
//! Rehydrated by replaying the Signal log (testable property 3). All
//! mutation happens through the explicit methods below so that replay and
//! live execution share one code path.

use crate::entity::{Decision, SignalCategory};
use crate::validator::types::Signal;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct DiscoveryState {
    pub entity_id: String,
    pub pass_number: u8,
    pub accepted_count: HashMap<SignalCategory, u32>,
    pub consecutive_rejects: HashMap<SignalCategory, u32>,
    pub saturated_categories: HashSet<SignalCategory>,
    pub hop_consecutive_failures: HashMap<String, u32>,
    pub hop_blacklist_patterns: Vec<String>,
    pub seen_content_hashes: HashSet<String>,
    /// Bounded ring of the most recent decisions, newest last.
    pub recent_decisions: Vec<Decision>,
    pub iterations_this_pass: u32,
}

const RECENT_DECISIONS_CAP: usize = 50;

impl DiscoveryState {
    pub fn new(entity_id: impl Into<String>, pass_number: u8) -> Self {
        Self {
            entity_id: entity_id.into(),
            pass_number,
            ..Default::default()
        }
    }

    /// Applies one Signal's effect to this state. Used both by the live
    /// orchestrator loop and by Signal-log replay, so the two paths can
    /// never diverge (testable property 3).
    pub fn apply_signal(&mut self, signal: &Signal, category: SignalCategory) {
        self.iterations_this_pass += 1;
        self.seen_content_hashes.insert(signal.content_hash.clone());

        match signal.decision {
            Decision::Accept => {
                *self.accepted_count.entry(category).or_insert(0) += 1;
                self.consecutive_rejects.insert(category, 0);
            }
            Decision::WeakAccept => {
                self.consecutive_rejects.insert(category, 0);
            }
            Decision::Reject => {
                let count = self.consecutive_rejects.entry(category).or_insert(0);
                *count += 1;
                if *count >= 3 {
                    self.saturated_categories.insert(category);
                }
            }
            Decision::NoProgress | Decision::Saturated => {}
        }

        self.recent_decisions.push(signal.decision);
        if self.recent_decisions.len() > RECENT_DECISIONS_CAP {
            self.recent_decisions.remove(0);
        }
    }

    pub fn accepted_in_category(&self, category: SignalCategory) -> u32 {
        self.accepted_count.get(&category).copied().unwrap_or(0)
    }

    pub fn is_category_saturated(&self, category: SignalCategory) -> bool {
        self.saturated_categories.contains(&category)
    }

    pub fn record_hop_failure(&mut self, hop: &str) {
        *self.hop_consecutive_failures.entry(hop.to_string()).or_insert(0) += 1;
    }

    pub fn record_hop_success(&mut self, hop: &str) {
        self.hop_consecutive_failures.insert(hop.to_string(), 0);
    }

    pub fn hop_failures(&self, hop: &str) -> u32 {
        self.hop_consecutive_failures.get(hop).copied().unwrap_or(0)
    }

    pub fn reset_hop_failures(&mut self) {
        self.hop_consecutive_failures.clear();
    }

    /// Rebuild a `DiscoveryState` by replaying an ordered Signal slice for
    /// one `(entity_id, pass_number)`. Requires a category lookup since
    /// Signal itself doesn't carry the category (the hypothesis does).
    pub fn replay(
        entity_id: &str,
        pass_number: u8,
        signals: &[Signal],
        category_of: impl Fn(&str) -> Option<SignalCategory>,
    ) -> Self {
        let mut state = Self::new(entity_id, pass_number);
        for signal in signals {
            if let Some(category) = category_of(&signal.hypothesis_id) {
                state.apply_signal(signal, category);
            }
        }
        state
    }
}
