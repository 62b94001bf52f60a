//! Immutable engine configuration, consumed once at engine start.
//!
//! Mirrors the orchestrator-config builder pattern used elsewhere in this
//! crate: a plain serializable struct plus a fluent builder, handed by
//! reference to every component constructor. No global statics.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Basic,
    Standard,
    Premium,
}

impl Tier {
    /// Tier affects only pass count and reporting depth, never the validator.
    pub fn default_max_passes(self) -> u8 {
        match self {
            Tier::Basic => 2,
            Tier::Standard => 4,
            Tier::Premium => 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub max_passes: u8,
    pub target_confidence: f64,
    pub per_category_budget: u32,
    pub max_token_budget_per_iteration: u32,
    pub accept_delta: f64,
    pub weak_accept_delta: f64,
    pub reject_delta: f64,
    pub no_progress_delta: f64,
    pub saturation_threshold: u32,
    pub confidence_saturation_window: u32,
    pub confidence_saturation_epsilon: f64,
    pub temporal_multiplier_bounds: (f64, f64),
    pub tier: Tier,
    pub external_call_timeout_secs: u64,
    pub retry_backoff_secs: [u64; 3],
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_passes: 4,
            target_confidence: 0.85,
            per_category_budget: 20,
            max_token_budget_per_iteration: 1_500,
            accept_delta: 0.06,
            weak_accept_delta: 0.02,
            reject_delta: -0.02,
            no_progress_delta: 0.0,
            saturation_threshold: 3,
            confidence_saturation_window: 10,
            confidence_saturation_epsilon: 0.01,
            temporal_multiplier_bounds: (0.75, 1.40),
            tier: Tier::Standard,
            external_call_timeout_secs: 60,
            retry_backoff_secs: [1, 4, 16],
        }
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    pub fn validate(&self) -> crate::Result<()> {
        if !(1..=8).contains(&self.max_passes) {
            return Err(crate::Error::Config(format!(
                "max_passes must be in 1..=8, got {}",
                self.max_passes
            )));
        }
        if !(0.50..=0.95).contains(&self.target_confidence) {
            return Err(crate::Error::Config(format!(
                "target_confidence must be in 0.50..=0.95, got {}",
                self.target_confidence
            )));
        }
        if !(5..=50).contains(&self.per_category_budget) {
            return Err(crate::Error::Config(format!(
                "per_category_budget must be in 5..=50, got {}",
                self.per_category_budget
            )));
        }
        if !(500..=4000).contains(&self.max_token_budget_per_iteration) {
            return Err(crate::Error::Config(format!(
                "max_token_budget_per_iteration must be in 500..=4000, got {}",
                self.max_token_budget_per_iteration
            )));
        }
        let (lo, hi) = self.temporal_multiplier_bounds;
        if lo != 0.75 || hi != 1.40 {
            return Err(crate::Error::Config(
                "temporal_multiplier_bounds are fixed at (0.75, 1.40)".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    inner: EngineConfigOverrides,
}

#[derive(Debug, Default)]
struct EngineConfigOverrides {
    max_passes: Option<u8>,
    target_confidence: Option<f64>,
    per_category_budget: Option<u32>,
    max_token_budget_per_iteration: Option<u32>,
    tier: Option<Tier>,
}

impl EngineConfigBuilder {
    pub fn max_passes(mut self, v: u8) -> Self {
        self.inner.max_passes = Some(v);
        self
    }

    pub fn target_confidence(mut self, v: f64) -> Self {
        self.inner.target_confidence = Some(v);
        self
    }

    pub fn per_category_budget(mut self, v: u32) -> Self {
        self.inner.per_category_budget = Some(v);
        self
    }

    pub fn max_token_budget_per_iteration(mut self, v: u32) -> Self {
        self.inner.max_token_budget_per_iteration = Some(v);
        self
    }

    pub fn tier(mut self, v: Tier) -> Self {
        self.inner.tier = Some(v);
        self
    }

    pub fn build(self) -> crate::Result<EngineConfig> {
        let mut cfg = EngineConfig::default();
        if let Some(v) = self.inner.max_passes {
            cfg.max_passes = v;
        }
        if let Some(v) = self.inner.target_confidence {
            cfg.target_confidence = v;
        }
        if let Some(v) = self.inner.per_category_budget {
            cfg.per_category_budget = v;
        }
        if let Some(v) = self.inner.max_token_budget_per_iteration {
            cfg.max_token_budget_per_iteration = v;
        }
        if let Some(v) = self.inner.tier {
            cfg.tier = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}
