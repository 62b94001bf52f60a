//! Hypothesis seeding strategy (§9 Open Questions, SPEC_FULL §15).
//!
//! The dossier-hypothesis generator is modeled as an injected strategy:
//! given `(entity, tier)`, return a list of seed hypotheses. Templates are
//! a read-only static table accessed by concrete field, never an
//! arbitrary attribute bag.

use crate::config::Tier;
use crate::entity::{Entity, SignalCategory};
use crate::hypothesis::Hypothesis;

pub trait HypothesisSeeder: Send + Sync {
    fn seed(&self, entity: &Entity, tier: Tier) -> Vec<Hypothesis>;
}

pub struct TemplateEntry {
    pub category: SignalCategory,
    pub statement_template: &'static str,
    /// Minimum tier this template is offered at.
    pub min_tier: Tier,
}

const TEMPLATES: &[TemplateEntry] = &[
    TemplateEntry {
        category: SignalCategory::Crm,
        statement_template: "{entity} will modernize its CRM platform",
        min_tier: Tier::Basic,
    },
    TemplateEntry {
        category: SignalCategory::Ticketing,
        statement_template: "{entity} will replace its ticketing system",
        min_tier: Tier::Basic,
    },
    TemplateEntry {
        category: SignalCategory::Analytics,
        statement_template: "{entity} will invest in fan/performance analytics",
        min_tier: Tier::Basic,
    },
    TemplateEntry {
        category: SignalCategory::DataPlatform,
        statement_template: "{entity} will consolidate its data platform",
        min_tier: Tier::Standard,
    },
    TemplateEntry {
        category: SignalCategory::Commerce,
        statement_template: "{entity} will overhaul its e-commerce stack",
        min_tier: Tier::Standard,
    },
    TemplateEntry {
        category: SignalCategory::FanEngagement,
        statement_template: "{entity} will procure a fan engagement platform",
        min_tier: Tier::Standard,
    },
    TemplateEntry {
        category: SignalCategory::Security,
        statement_template: "{entity} will invest in cybersecurity infrastructure",
        min_tier: Tier::Premium,
    },
    TemplateEntry {
        category: SignalCategory::Cloud,
        statement_template: "{entity} will migrate infrastructure to the cloud",
        min_tier: Tier::Premium,
    },
];

fn tier_rank(tier: Tier) -> u8 {
    match tier {
        Tier::Basic => 0,
        Tier::Standard => 1,
        Tier::Premium => 2,
    }
}

/// Seeds pass-1 hypotheses from the static template table, filtered by
/// tier (higher tiers unlock more templates).
pub struct TemplateHypothesisSeeder;

impl HypothesisSeeder for TemplateHypothesisSeeder {
    fn seed(&self, entity: &Entity, tier: Tier) -> Vec<Hypothesis> {
        TEMPLATES
            .iter()
            .filter(|t| tier_rank(t.min_tier) <= tier_rank(tier))
            .map(|t| {
                let statement = t.statement_template.replace("{entity}", &entity.display_name);
                Hypothesis::seed(entity.entity_id.clone(), t.category, statement, 1)
            })
            .collect()
    }
}
