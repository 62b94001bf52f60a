use crate::entity::SourceType;

/// Fixed channel ROI table, derived from historical ACCEPT-rate (§4.4).
pub fn roi(source_type: SourceType) -> f64 {
    match source_type {
        SourceType::PartnershipAnnouncement => 0.35,
        SourceType::TechNews => 0.25,
        SourceType::PressRelease => 0.10,
        SourceType::LeadershipJobPosting => 0.08,
        SourceType::AnnualReport => 0.06,
        SourceType::CareersPage => 0.04,
        SourceType::OfficialSite => 0.02,
        SourceType::LinkedinOperationalJob => 0.01,
        SourceType::Other => 0.0,
    }
}

/// All hop candidates in a fixed order, used as the iteration base for
/// scoring and for the ROI/name tie-break.
pub const ALL_HOPS: [SourceType; 8] = [
    SourceType::PartnershipAnnouncement,
    SourceType::TechNews,
    SourceType::PressRelease,
    SourceType::LeadershipJobPosting,
    SourceType::AnnualReport,
    SourceType::CareersPage,
    SourceType::OfficialSite,
    SourceType::LinkedinOperationalJob,
];

#[derive(Debug, Clone, PartialEq)]
pub struct HopChoice {
    pub hop: SourceType,
    pub resolver_keywords: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roi_table_matches_spec_values() {
        assert_eq!(roi(SourceType::PartnershipAnnouncement), 0.35);
        assert_eq!(roi(SourceType::LinkedinOperationalJob), 0.01);
    }
}
