//! OpportunityReport — the engine's final output per entity run (§4.5, §6.6).

use crate::entity::SignalCategory;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendedAction {
    Immediate,
    Monitor,
    Nurture,
}

impl RecommendedAction {
    /// `IMMEDIATE ⇔ confidence ≥ 0.80; MONITOR ⇔ 0.50 ≤ confidence < 0.80;
    /// NURTURE ⇔ confidence < 0.50` (§6.6).
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.80 {
            RecommendedAction::Immediate
        } else if confidence >= 0.50 {
            RecommendedAction::Monitor
        } else {
            RecommendedAction::Nurture
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityLine {
    pub category: SignalCategory,
    pub top_hypothesis_id: String,
    pub top_hypothesis_statement: String,
    pub confidence: f64,
    pub supporting_evidence_urls: Vec<String>,
    pub recommended_action: RecommendedAction,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SkippedHypothesis {
    pub hypothesis_id: String,
    pub reason: String,
}

/// Diagnostics accompanying a report — never silently swallows data loss
/// (§7 user-visible failure guarantee).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Diagnostics {
    pub skipped: Vec<SkippedHypothesis>,
    pub passes_completed: u8,
    pub cancelled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpportunityReport {
    pub entity_id: String,
    pub opportunities: Vec<OpportunityLine>,
    pub diagnostics: Diagnostics,
}
