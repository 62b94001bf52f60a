//! Hypothesis evolution between passes (§4.5).
//!
//! For every ACCEPT signal whose evidence names a specific technology,
//! spawn a child hypothesis for the next pass. Technology extraction uses
//! a small static vendor-keyword table — the source's own lookup tables
//! vary file to file (§9 open question), so this crate fixes one explicit
//! table rather than guessing at NLP.

use crate::entity::{Decision, SignalCategory};
use crate::evidence::Evidence;
use crate::hypothesis::Hypothesis;
use crate::validator::types::Signal;

struct VendorEntry {
    keyword: &'static str,
    category: SignalCategory,
}

const VENDOR_TABLE: &[VendorEntry] = &[
    VendorEntry { keyword: "salesforce", category: SignalCategory::Crm },
    VendorEntry { keyword: "hubspot", category: SignalCategory::Crm },
    VendorEntry { keyword: "dynamics 365", category: SignalCategory::Crm },
    VendorEntry { keyword: "ticketmaster", category: SignalCategory::Ticketing },
    VendorEntry { keyword: "seatgeek", category: SignalCategory::Ticketing },
    VendorEntry { keyword: "tableau", category: SignalCategory::Analytics },
    VendorEntry { keyword: "snowflake", category: SignalCategory::DataPlatform },
    VendorEntry { keyword: "databricks", category: SignalCategory::DataPlatform },
    VendorEntry { keyword: "aws", category: SignalCategory::Cloud },
    VendorEntry { keyword: "azure", category: SignalCategory::Cloud },
    VendorEntry { keyword: "shopify", category: SignalCategory::Commerce },
    VendorEntry { keyword: "sap", category: SignalCategory::Operations },
    VendorEntry { keyword: "workday", category: SignalCategory::Operations },
];

/// Finds the first vendor-keyword match in evidence content, returning
/// `(technology_name, category)`.
fn detect_technology(content: &str) -> Option<(&'static str, SignalCategory)> {
    let lower = content.to_lowercase();
    VENDOR_TABLE
        .iter()
        .find(|entry| lower.contains(entry.keyword))
        .map(|entry| (entry.keyword, entry.category))
}

/// Spawns a child hypothesis for `parent` if `signal` is an ACCEPT and its
/// evidence names a known technology (S5). Category defaults to the
/// detected technology's category, or the parent's own category when the
/// technology maps to the same domain.
pub fn evolve(parent: &Hypothesis, signal: &Signal, evidence: &Evidence, next_pass: u8) -> Option<Hypothesis> {
    if signal.decision != Decision::Accept {
        return None;
    }
    let (technology, category) = detect_technology(&evidence.content)?;
    let statement = format!(
        "{} will procure {} services around {}",
        parent.entity_id, category_service_noun(category), technology
    );
    Some(Hypothesis::child(
        parent.entity_id.clone(),
        category,
        statement,
        parent.confidence,
        parent.hypothesis_id.clone(),
        next_pass,
    ))
}

fn category_service_noun(category: SignalCategory) -> &'static str {
    match category {
        SignalCategory::Crm => "CRM migration",
        SignalCategory::Ticketing => "ticketing integration",
        SignalCategory::Analytics => "analytics",
        SignalCategory::DataPlatform => "data platform",
        SignalCategory::Cloud => "cloud migration",
        SignalCategory::Commerce => "e-commerce",
        SignalCategory::Operations => "operations tooling",
        _ => "technology",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ModelTier, SourceType};
    use crate::validator::types::SaturationFlags;
    use chrono::Utc;

    fn accept_signal() -> Signal {
        Signal::new(
            "e", "parent-h", Decision::Accept, "r", 0.06, 1.0, 0.06, 0.20, 0.26,
            SaturationFlags::default(), ModelTier::Small, 1, "hash", "https://example.com",
        )
    }

    #[test]
    fn scenario_s5_spawns_child_with_point_nine_prior() {
        let mut parent = Hypothesis::seed("arsenal-fc", SignalCategory::Crm, "entity will modernize CRM", 1);
        parent.confidence = 0.06;
        parent.hypothesis_id = "parent-h".to_string();
        let evidence = Evidence::new(
            "parent-h",
            "https://example.com",
            SourceType::LinkedinOperationalJob,
            "Arsenal is hiring a Salesforce administrator",
            Utc::now(),
        );
        let child = evolve(&parent, &accept_signal(), &evidence, 2).unwrap();
        assert_eq!(child.category, SignalCategory::Crm);
        assert!((child.prior_probability - 0.054).abs() < 1e-9);
        assert_eq!(child.derived_from.as_deref(), Some("parent-h"));
        assert_eq!(child.pass_number, 2);
    }

    #[test]
    fn non_accept_signals_do_not_spawn_children() {
        let parent = Hypothesis::seed("arsenal-fc", SignalCategory::Crm, "stmt", 1);
        let mut signal = accept_signal();
        signal.decision = Decision::Reject;
        let evidence = Evidence::new(
            "h", "u", SourceType::TechNews, "Salesforce administrator hiring", Utc::now(),
        );
        assert!(evolve(&parent, &signal, &evidence, 2).is_none());
    }

    #[test]
    fn no_known_technology_means_no_child() {
        let parent = Hypothesis::seed("arsenal-fc", SignalCategory::Crm, "stmt", 1);
        let evidence = Evidence::new("h", "u", SourceType::TechNews, "generic announcement", Utc::now());
        assert!(evolve(&parent, &accept_signal(), &evidence, 2).is_none());
    }
}
