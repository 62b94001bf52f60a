//! Core entity and closed-set category/type vocabulary.
//!
//! These are the identifiers and tags every other module keys its state by.
//! All persisted variants are tagged enums with named fields — never
//! accessed by string key — per the engine's data-model invariant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A sports entity (club, league, federation, ...) the engine discovers
/// procurement opportunities for. Immutable to the engine; the engine
/// reads it by id and caches only the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_id: String,
    pub display_name: String,
    pub entity_type: Option<EntityType>,
}

impl Entity {
    pub fn new(entity_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            display_name: display_name.into(),
            entity_type: None,
        }
    }

    pub fn with_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = Some(entity_type);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Club,
    League,
    Federation,
    Tournament,
    Organization,
}

/// The closed set of 14 canonical signal categories. Every hypothesis and
/// signal carries exactly one. An LLM collaborator proposing anything
/// outside this set is coerced to `Other` (see `Error::unknown_category`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalCategory {
    Crm,
    Ticketing,
    Analytics,
    Operations,
    Mobile,
    Web,
    Commerce,
    FanEngagement,
    Content,
    DataPlatform,
    Security,
    Cloud,
    Integration,
    Other,
}

impl SignalCategory {
    pub const ALL: [SignalCategory; 14] = [
        SignalCategory::Crm,
        SignalCategory::Ticketing,
        SignalCategory::Analytics,
        SignalCategory::Operations,
        SignalCategory::Mobile,
        SignalCategory::Web,
        SignalCategory::Commerce,
        SignalCategory::FanEngagement,
        SignalCategory::Content,
        SignalCategory::DataPlatform,
        SignalCategory::Security,
        SignalCategory::Cloud,
        SignalCategory::Integration,
        SignalCategory::Other,
    ];

    /// Coerce an arbitrary LLM-proposed tag to a canonical category,
    /// falling back to `Other` when it doesn't match (case-insensitive).
    pub fn coerce(raw: &str) -> Self {
        let normalized = raw.trim().to_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "CRM" => SignalCategory::Crm,
            "TICKETING" => SignalCategory::Ticketing,
            "ANALYTICS" => SignalCategory::Analytics,
            "OPERATIONS" => SignalCategory::Operations,
            "MOBILE" => SignalCategory::Mobile,
            "WEB" => SignalCategory::Web,
            "COMMERCE" => SignalCategory::Commerce,
            "FAN_ENGAGEMENT" => SignalCategory::FanEngagement,
            "CONTENT" => SignalCategory::Content,
            "DATA_PLATFORM" => SignalCategory::DataPlatform,
            "SECURITY" => SignalCategory::Security,
            "CLOUD" => SignalCategory::Cloud,
            "INTEGRATION" => SignalCategory::Integration,
            other => {
                tracing::warn!(raw = other, "unknown category tag, coercing to OTHER");
                SignalCategory::Other
            }
        }
    }

    /// `info_value` constant from the EIG formula's category-dependent table.
    pub fn info_value(self) -> f64 {
        match self {
            SignalCategory::Crm => 1.00,
            SignalCategory::Ticketing => 0.90,
            SignalCategory::Analytics => 0.85,
            SignalCategory::DataPlatform => 0.85,
            SignalCategory::Commerce => 0.80,
            SignalCategory::FanEngagement => 0.75,
            SignalCategory::Mobile => 0.70,
            SignalCategory::Web => 0.65,
            SignalCategory::Security => 0.65,
            SignalCategory::Cloud => 0.60,
            SignalCategory::Operations => 0.60,
            SignalCategory::Integration => 0.55,
            SignalCategory::Content => 0.55,
            SignalCategory::Other => 0.50,
        }
    }
}

impl fmt::Display for SignalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalCategory::Crm => "CRM",
            SignalCategory::Ticketing => "TICKETING",
            SignalCategory::Analytics => "ANALYTICS",
            SignalCategory::Operations => "OPERATIONS",
            SignalCategory::Mobile => "MOBILE",
            SignalCategory::Web => "WEB",
            SignalCategory::Commerce => "COMMERCE",
            SignalCategory::FanEngagement => "FAN_ENGAGEMENT",
            SignalCategory::Content => "CONTENT",
            SignalCategory::DataPlatform => "DATA_PLATFORM",
            SignalCategory::Security => "SECURITY",
            SignalCategory::Cloud => "CLOUD",
            SignalCategory::Integration => "INTEGRATION",
            SignalCategory::Other => "OTHER",
        };
        f.write_str(s)
    }
}

/// Evidence source type, ordered roughly by the channel ROI table in the
/// hop selector (highest ROI first is not enforced here, just declared).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    PartnershipAnnouncement,
    TechNews,
    PressRelease,
    LeadershipJobPosting,
    AnnualReport,
    LinkedinOperationalJob,
    OfficialSite,
    CareersPage,
    Other,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EpisodeType {
    RfpDetected,
    RfpResponded,
    PartnershipFormed,
    TechnologyAdopted,
    ExecutiveChange,
    Sponsorship,
}

/// The validator's decision for one (hypothesis, evidence) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Accept,
    WeakAccept,
    Reject,
    NoProgress,
    Saturated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Small,
    Medium,
    Large,
}
