//! Temporal Prior Service (§4.3).

pub mod service;
pub mod types;

pub use service::{compute_priors, InMemoryPriorStore, JsonFilePriorStore, PriorStore, TemporalPriorService};
pub use types::{BackoffLevel, PriorConfidence, PriorLookup, Recurrence, Seasonality, TemporalPrior};
