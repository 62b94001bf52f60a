//! Adaptive Hop Selector (§4.4).

pub mod selector;
pub mod types;

pub use selector::AdaptiveHopSelector;
pub use types::{roi, HopChoice, ALL_HOPS};
