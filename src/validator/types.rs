use crate::entity::{Decision, ModelTier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SaturationFlags {
    pub category_saturated: bool,
    pub confidence_saturated: bool,
}

/// Textual context assembled per pass and injected into the pass-2/pass-3
/// prompts (§4.5's pass-sequence table: network context at pass 2, top-k
/// pass-2 hypotheses plus temporal narrative at pass 3+). Bounded the same
/// way evidence content is, since it shares the same prompt token budget
/// (§5 backpressure: narratives truncated before injection).
#[derive(Debug, Clone, Default)]
pub struct PassContext {
    /// Named peer adoptions relevant to the hypothesis category, e.g.
    /// `"chelsea-fc adopted CRM"`.
    pub peer_notes: Vec<String>,
    /// Statements of the highest-confidence hypotheses from the prior
    /// pass, highest first.
    pub prior_pass_top_hypotheses: Vec<String>,
    /// Human-readable summary of the temporal prior lookup backing this
    /// hypothesis's `temporal_multiplier`.
    pub temporal_narrative: String,
}

/// Prompt-injected narratives are bounded to this many bytes (§5: "narratives
/// are truncated at 1,500 tokens before injection"; ~4 bytes/token).
pub const MAX_CONTEXT_BYTES: usize = 6_000;

impl PassContext {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Renders this context as a prompt block, bounded to
    /// `MAX_CONTEXT_BYTES` on a UTF-8 char boundary. Empty when nothing was
    /// assembled, so pass-1 prompts gain no spurious section.
    pub fn as_prompt_block(&self) -> String {
        if self.peer_notes.is_empty() && self.prior_pass_top_hypotheses.is_empty() && self.temporal_narrative.is_empty() {
            return String::new();
        }
        let mut block = String::from("Context:\n");
        if !self.peer_notes.is_empty() {
            block.push_str("Peer technology adoptions:\n");
            for note in &self.peer_notes {
                block.push_str("- ");
                block.push_str(note);
                block.push('\n');
            }
        }
        if !self.prior_pass_top_hypotheses.is_empty() {
            block.push_str("Top hypotheses from the prior pass:\n");
            for statement in &self.prior_pass_top_hypotheses {
                block.push_str("- ");
                block.push_str(statement);
                block.push('\n');
            }
        }
        if !self.temporal_narrative.is_empty() {
            block.push_str("Temporal signal: ");
            block.push_str(&self.temporal_narrative);
            block.push('\n');
        }
        if block.len() > MAX_CONTEXT_BYTES {
            let mut boundary = MAX_CONTEXT_BYTES;
            while !block.is_char_boundary(boundary) {
                boundary -= 1;
            }
            block.truncate(boundary);
        }
        block
    }
}

/// The validator's output for one (hypothesis, evidence) pair. Append-only;
/// this is the sole artifact persisted per iteration — everything else is
/// reconstructible from a sequence of these (§3, testable property 3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub signal_id: String,
    pub evidence_id: String,
    pub hypothesis_id: String,
    pub decision: Decision,
    pub reasoning: String,
    pub confidence_delta_raw: f64,
    pub category_multiplier: f64,
    pub applied_delta: f64,
    pub pre_confidence: f64,
    pub post_confidence: f64,
    pub saturation_flags: SaturationFlags,
    pub model_used: ModelTier,
    pub pass_number: u8,
    pub created_at: DateTime<Utc>,
    /// Content hash of the evidence this signal was derived from; carried
    /// on the signal itself so replay can reconstruct per-hypothesis
    /// novelty state without a side lookup.
    pub content_hash: String,
    /// Source URL of the evidence this signal was derived from, empty for
    /// synthetic NO_PROGRESS signals with no evidence. Carried here so the
    /// Hypothesis Store can accumulate `OpportunityLine.supporting_evidence_urls`
    /// without a side lookup (§6.6).
    pub evidence_url: String,
}

impl Signal {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        evidence_id: impl Into<String>,
        hypothesis_id: impl Into<String>,
        decision: Decision,
        reasoning: impl Into<String>,
        confidence_delta_raw: f64,
        category_multiplier: f64,
        applied_delta: f64,
        pre_confidence: f64,
        post_confidence: f64,
        saturation_flags: SaturationFlags,
        model_used: ModelTier,
        pass_number: u8,
        content_hash: impl Into<String>,
        evidence_url: impl Into<String>,
    ) -> Self {
        Self {
            signal_id: Uuid::new_v4().to_string(),
            evidence_id: evidence_id.into(),
            hypothesis_id: hypothesis_id.into(),
            decision,
            reasoning: reasoning.into(),
            confidence_delta_raw,
            category_multiplier,
            applied_delta,
            pre_confidence,
            post_confidence,
            saturation_flags,
            model_used,
            pass_number,
            created_at: Utc::now(),
            content_hash: content_hash.into(),
            evidence_url: evidence_url.into(),
        }
    }

    /// Action derived from the signal (§4.2): LOCK_IN, STOP_CATEGORY, or
    /// CONTINUE.
    pub fn action(&self) -> SignalAction {
        if self.post_confidence >= 0.85 {
            SignalAction::LockIn
        } else if self.saturation_flags.category_saturated {
            SignalAction::StopCategory
        } else {
            SignalAction::Continue
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    LockIn,
    StopCategory,
    Continue,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(post_confidence: f64, category_saturated: bool) -> Signal {
        Signal::new(
            "e",
            "h",
            Decision::Accept,
            "r",
            0.06,
            1.0,
            0.06,
            0.20,
            post_confidence,
            SaturationFlags {
                category_saturated,
                confidence_saturated: false,
            },
            ModelTier::Small,
            1,
            "hash",
            "https://example.com",
        )
    }

    #[test]
    fn high_confidence_locks_in() {
        assert_eq!(signal(0.90, false).action(), SignalAction::LockIn);
    }

    #[test]
    fn saturated_category_stops() {
        assert_eq!(signal(0.5, true).action(), SignalAction::StopCategory);
    }

    #[test]
    fn otherwise_continues() {
        assert_eq!(signal(0.5, false).action(), SignalAction::Continue);
    }

    #[test]
    fn empty_pass_context_renders_to_empty_block() {
        assert_eq!(PassContext::empty().as_prompt_block(), "");
    }

    #[test]
    fn pass_context_renders_peer_and_temporal_sections() {
        let ctx = PassContext {
            peer_notes: vec!["chelsea-fc adopted CRM".to_string()],
            prior_pass_top_hypotheses: vec!["arsenal-fc will modernize CRM".to_string()],
            temporal_narrative: "exact_entity_category multiplier=1.30".to_string(),
        };
        let block = ctx.as_prompt_block();
        assert!(block.contains("chelsea-fc adopted CRM"));
        assert!(block.contains("arsenal-fc will modernize CRM"));
        assert!(block.contains("multiplier=1.30"));
    }

    #[test]
    fn pass_context_block_never_splits_a_multibyte_char_on_truncation() {
        let padding = "x".repeat(MAX_CONTEXT_BYTES);
        let ctx = PassContext {
            peer_notes: vec![format!("{padding}\u{e9}\u{e9}\u{e9}\u{e9}")],
            prior_pass_top_hypotheses: vec![],
            temporal_narrative: String::new(),
        };
        let block = ctx.as_prompt_block();
        assert!(block.len() <= MAX_CONTEXT_BYTES);
        assert!(block.is_char_boundary(block.len()));
    }
}
