use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorConfidence {
    High,
    Medium,
    Low,
}

impl PriorConfidence {
    pub fn from_sample_size(sample_size: u32) -> Self {
        if sample_size >= 5 {
            PriorConfidence::High
        } else if sample_size >= 3 {
            PriorConfidence::Medium
        } else {
            PriorConfidence::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
    pub q4: f64,
}

impl Seasonality {
    pub fn share_for_quarter(&self, quarter: u8) -> f64 {
        match quarter {
            1 => self.q1,
            2 => self.q2,
            3 => self.q3,
            4 => self.q4,
            _ => 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Recurrence {
    pub mean_interval_days: f64,
    pub stdev_days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalPrior {
    pub seasonality: Seasonality,
    pub recurrence: Recurrence,
    pub momentum_30d: u32,
    pub multiplier: f64,
    pub confidence: PriorConfidence,
    pub sample_size: u32,
}

/// Outcome of a `get_multiplier` lookup, including which aggregation level
/// resolved the query (§4.3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorLookup {
    pub multiplier: f64,
    pub confidence: PriorConfidence,
    pub backoff_level_used: BackoffLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffLevel {
    ExactEntityCategory,
    EntityWide,
    GlobalCategory,
    GlobalDefault,
}

impl PriorLookup {
    pub fn global_default() -> Self {
        Self {
            multiplier: 1.00,
            confidence: PriorConfidence::Low,
            backoff_level_used: BackoffLevel::GlobalDefault,
        }
    }
}
