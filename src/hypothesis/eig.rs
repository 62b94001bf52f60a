//! Expected Information Gain scoring (§4.1).

use super::types::Hypothesis;

/// `novelty(h) = 1 / (1 + h.iterations_attempted)`.
pub fn novelty(h: &Hypothesis) -> f64 {
    1.0 / (1.0 + h.iterations_attempted as f64)
}

/// `network_boost ∈ [1.00, 1.30]`: +0.10 per known peer adoption, capped.
pub fn network_boost(peer_adoptions: u32) -> f64 {
    (1.0 + 0.10 * peer_adoptions as f64).min(1.30)
}

/// `EIG(h) = (1 − confidence) × novelty × info_value × temporal_boost × network_boost`.
pub fn eig(h: &Hypothesis, temporal_boost: f64, network_boost: f64) -> f64 {
    (1.0 - h.confidence) * novelty(h) * h.category.info_value() * temporal_boost * network_boost
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::SignalCategory;

    #[test]
    fn novelty_decays_with_iterations() {
        let mut h = Hypothesis::seed("e", SignalCategory::Crm, "s", 1);
        let n0 = novelty(&h);
        h.iterations_attempted = 3;
        let n3 = novelty(&h);
        assert!(n3 < n0);
    }

    #[test]
    fn network_boost_caps_at_one_point_three() {
        assert!((network_boost(10) - 1.30).abs() < 1e-9);
        assert!((network_boost(0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn eig_is_zero_when_confidence_is_max() {
        let mut h = Hypothesis::seed("e", SignalCategory::Crm, "s", 1);
        h.confidence = 1.0;
        assert_eq!(eig(&h, 1.0, 1.0), 0.0);
    }
}
