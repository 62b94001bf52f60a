//! # discovery-engine
//!
//! An iterative procurement-opportunity discovery and validation engine for
//! sports entities. Given an entity, the engine seeds hypotheses about
//! upcoming technology procurement, gathers web evidence, runs it through a
//! deterministic/LLM validation cascade, and accumulates confidence over
//! several passes until it can recommend where to act.
//!
//! ## Core Components
//!
//! - **Hypothesis Store**: EIG-ranked scheduling over live hypotheses
//! - **Ralph Validator**: the 3-pass deterministic/LLM/confirmation cascade
//! - **Adaptive Hop Selector**: ROI-weighted evidence-channel selection
//! - **Temporal Prior Service**: seasonality/recurrence/momentum multipliers
//! - **Multi-Pass Orchestrator**: ties the above into a per-entity run
//!
//! ## Example
//!
//! ```rust,ignore
//! use discovery_engine::entity::Entity;
//! use discovery_engine::orchestrator::MultiPassOrchestrator;
//!
//! let orchestrator = MultiPassOrchestrator::builder()
//!     // .scraper(...) .llm(...) .episode_store(...) .signal_log(...)
//!     // .temporal(...) .seeder(...)
//!     .build()?;
//! let entity = Entity::new("arsenal-fc", "Arsenal");
//! let report = orchestrator.run(&entity, &std::sync::atomic::AtomicBool::new(false)).await?;
//! # Ok::<(), discovery_engine::Error>(())
//! ```

pub mod collaborators;
pub mod config;
pub mod entity;
pub mod episode;
pub mod error;
pub mod evidence;
pub mod hop;
pub mod hypothesis;
pub mod orchestrator;
pub mod seeder;
pub mod signal_log;
pub mod state;
pub mod telemetry;
pub mod temporal;
pub mod validator;

pub use config::{EngineConfig, EngineConfigBuilder, Tier};
pub use entity::{Decision, Entity, EntityType, EpisodeType, ModelTier, SignalCategory, SourceType};
pub use error::{Error, Result};
pub use evidence::Evidence;
pub use hypothesis::Hypothesis;
pub use orchestrator::report::{Diagnostics, OpportunityReport, RecommendedAction};
pub use orchestrator::MultiPassOrchestrator;
pub use state::DiscoveryState;
pub use validator::types::Signal;
pub use validator::RalphValidator;
