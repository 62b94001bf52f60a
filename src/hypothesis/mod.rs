//! Hypothesis Store & EIG Scheduler (§4.1).

pub mod eig;
pub mod store;
pub mod types;

pub use eig::{eig as compute_eig, network_boost, novelty};
pub use store::HypothesisStore;
pub use types::Hypothesis;
