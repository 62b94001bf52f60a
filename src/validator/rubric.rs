//! Decision rubric: pass-1 deterministic filter and pass-2/3 ACCEPT
//! criteria checklist (§4.2).

use crate::entity::{Decision, SourceType};
use crate::evidence::Evidence;
use crate::hypothesis::Hypothesis;
use chrono::{Duration, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pass1Outcome {
    Reject(String),
    NoProgress(String),
    Pass,
}

/// Deterministic rule filter, evaluated before any LLM call. REJECTs if any
/// rule matches; NO_PROGRESS if the content doesn't mention the entity or
/// any hypothesis keyword; otherwise falls through to pass 2.
pub fn pass1_filter(
    hypothesis: &Hypothesis,
    evidence: &Evidence,
    entity_domain_blacklist: &[String],
    blacklisted_phrases: &[(SourceType, String)],
    entity_display_name: &str,
) -> Pass1Outcome {
    if hypothesis.seen_content_hashes.contains(&evidence.content_hash) {
        return Pass1Outcome::Reject("duplicate content_hash for this hypothesis".to_string());
    }

    if Utc::now() - evidence.fetched_at > Duration::days(548) {
        return Pass1Outcome::Reject("evidence older than 18 months".to_string());
    }

    if let Some(domain) = extract_domain(&evidence.source_url) {
        if entity_domain_blacklist.iter().any(|d| d == &domain) {
            return Pass1Outcome::Reject(format!("source domain {domain} is blacklisted"));
        }
    }

    for (source_type, phrase) in blacklisted_phrases {
        if *source_type == evidence.source_type
            && evidence.content.to_lowercase().contains(&phrase.to_lowercase())
        {
            return Pass1Outcome::Reject(format!(
                "content matches blacklisted phrase '{phrase}' for {source_type:?}"
            ));
        }
    }

    let content_lower = evidence.content.to_lowercase();
    let mentions_entity = content_lower.contains(&entity_display_name.to_lowercase());
    let mentions_keyword = hypothesis_keywords(hypothesis)
        .iter()
        .any(|kw| content_lower.contains(&kw.to_lowercase()));
    if !mentions_entity && !mentions_keyword {
        return Pass1Outcome::NoProgress("content mentions neither entity nor hypothesis keywords".to_string());
    }

    Pass1Outcome::Pass
}

fn extract_domain(url: &str) -> Option<String> {
    let without_scheme = url.split("://").nth(1).unwrap_or(url);
    without_scheme.split('/').next().map(|s| s.to_string())
}

/// Crude keyword extraction from the hypothesis statement: significant
/// words (length > 3) are treated as keywords for the mention check.
fn hypothesis_keywords(hypothesis: &Hypothesis) -> Vec<String> {
    hypothesis
        .statement
        .split_whitespace()
        .filter(|w| w.len() > 3)
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

/// The four ACCEPT criteria evaluated by the pass-2 LLM call. WEAK_ACCEPT
/// is ACCEPT missing exactly one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcceptCriteria {
    pub is_new: bool,
    pub entity_specific: bool,
    pub implies_future_procurement: bool,
    pub credible_source: bool,
}

impl AcceptCriteria {
    pub fn met_count(&self) -> u8 {
        [
            self.is_new,
            self.entity_specific,
            self.implies_future_procurement,
            self.credible_source,
        ]
        .iter()
        .filter(|b| **b)
        .count() as u8
    }

    pub fn derive_decision(&self) -> Decision {
        match self.met_count() {
            4 => Decision::Accept,
            3 => Decision::WeakAccept,
            _ => Decision::Reject,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::SignalCategory;

    fn sample_evidence(content: &str, fetched_days_ago: i64) -> Evidence {
        let mut ev = Evidence::new(
            "h",
            "https://example.com/news",
            SourceType::TechNews,
            content,
            Utc::now() - Duration::days(fetched_days_ago),
        );
        ev.content_hash = Evidence::hash(content);
        ev
    }

    #[test]
    fn rejects_duplicate_content_hash() {
        let mut h = Hypothesis::seed("arsenal-fc", SignalCategory::Crm, "modernize CRM", 1);
        let ev = sample_evidence("hiring a salesforce admin", 1);
        h.seen_content_hashes.push(ev.content_hash.clone());
        let outcome = pass1_filter(&h, &ev, &[], &[], "Arsenal");
        assert_eq!(outcome, Pass1Outcome::Reject("duplicate content_hash for this hypothesis".into()));
    }

    #[test]
    fn rejects_stale_evidence() {
        let h = Hypothesis::seed("arsenal-fc", SignalCategory::Crm, "modernize CRM", 1);
        let ev = sample_evidence("Arsenal hiring a salesforce admin", 600);
        let outcome = pass1_filter(&h, &ev, &[], &[], "Arsenal");
        assert!(matches!(outcome, Pass1Outcome::Reject(_)));
    }

    #[test]
    fn no_progress_when_no_mention() {
        let h = Hypothesis::seed("arsenal-fc", SignalCategory::Crm, "modernize systems", 1);
        let ev = sample_evidence("completely unrelated weather report", 1);
        let outcome = pass1_filter(&h, &ev, &[], &[], "Arsenal");
        assert!(matches!(outcome, Pass1Outcome::NoProgress(_)));
    }

    #[test]
    fn passes_when_entity_mentioned() {
        let h = Hypothesis::seed("arsenal-fc", SignalCategory::Crm, "modernize systems", 1);
        let ev = sample_evidence("Arsenal announces new partnership", 1);
        assert_eq!(pass1_filter(&h, &ev, &[], &[], "Arsenal"), Pass1Outcome::Pass);
    }

    #[test]
    fn accept_criteria_all_four_met_is_accept() {
        let criteria = AcceptCriteria {
            is_new: true,
            entity_specific: true,
            implies_future_procurement: true,
            credible_source: true,
        };
        assert_eq!(criteria.derive_decision(), Decision::Accept);
    }

    #[test]
    fn accept_criteria_missing_one_is_weak_accept() {
        let criteria = AcceptCriteria {
            is_new: true,
            entity_specific: true,
            implies_future_procurement: true,
            credible_source: false,
        };
        assert_eq!(criteria.derive_decision(), Decision::WeakAccept);
    }
}
