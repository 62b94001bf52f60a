//! Signal log (§6.4): the append-only store that is the sole persisted
//! artifact per iteration. Writes must be durable before
//! `update_after_signal` returns.

pub mod memory;
pub mod sqlite;

use crate::validator::types::Signal;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait SignalLog: Send + Sync {
    /// `entity_id` is carried alongside the signal purely for the
    /// `(entity_id, pass_number)` secondary index (§6.4) — Signal itself
    /// only references its hypothesis.
    async fn append(&self, entity_id: &str, signal: &Signal) -> Result<()>;

    /// Replays the log for `(entity_id, pass_number)` in append order —
    /// the authoritative timeline (§5 ordering guarantees).
    async fn replay(&self, entity_id: &str, pass_number: u8) -> Result<Vec<Signal>>;
}

pub use memory::InMemorySignalLog;
pub use sqlite::SqliteSignalLog;
