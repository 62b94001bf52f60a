//! SQLite-backed Signal log, grounded on this workspace's embedded-storage
//! conventions (WAL mode, versioned schema, `Arc<Mutex<Connection>>`).

use super::SignalLog;
use crate::entity::{Decision, ModelTier};
use crate::validator::types::{SaturationFlags, Signal};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

const SCHEMA_VERSION: i64 = 1;

pub struct SqliteSignalLog {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSignalLog {
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> Result<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| Error::storage("signal log connection mutex poisoned"))?;
        f(&conn).map_err(Error::from)
    }

    fn initialize_schema(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);",
            )?;
            let current: i64 = conn
                .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
                .unwrap_or(0);
            if current < 1 {
                conn.execute_batch(
                    "CREATE TABLE IF NOT EXISTS signals (
                        rowid_order  INTEGER PRIMARY KEY AUTOINCREMENT,
                        signal_id    TEXT NOT NULL UNIQUE,
                        entity_id    TEXT NOT NULL,
                        pass_number  INTEGER NOT NULL,
                        evidence_id  TEXT NOT NULL,
                        hypothesis_id TEXT NOT NULL,
                        decision     TEXT NOT NULL,
                        reasoning    TEXT NOT NULL,
                        confidence_delta_raw REAL NOT NULL,
                        category_multiplier  REAL NOT NULL,
                        applied_delta REAL NOT NULL,
                        pre_confidence REAL NOT NULL,
                        post_confidence REAL NOT NULL,
                        category_saturated INTEGER NOT NULL,
                        confidence_saturated INTEGER NOT NULL,
                        model_used TEXT NOT NULL,
                        content_hash TEXT NOT NULL,
                        created_at TEXT NOT NULL,
                        evidence_url TEXT NOT NULL DEFAULT ''
                    );
                    CREATE INDEX IF NOT EXISTS idx_signals_entity_pass
                        ON signals(entity_id, pass_number, rowid_order);",
                )?;
                conn.execute("DELETE FROM schema_version", [])?;
                conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [SCHEMA_VERSION])?;
            }
            Ok(())
        })
    }
}

fn decision_to_str(decision: Decision) -> &'static str {
    match decision {
        Decision::Accept => "ACCEPT",
        Decision::WeakAccept => "WEAK_ACCEPT",
        Decision::Reject => "REJECT",
        Decision::NoProgress => "NO_PROGRESS",
        Decision::Saturated => "SATURATED",
    }
}

fn decision_from_str(s: &str) -> Result<Decision> {
    match s {
        "ACCEPT" => Ok(Decision::Accept),
        "WEAK_ACCEPT" => Ok(Decision::WeakAccept),
        "REJECT" => Ok(Decision::Reject),
        "NO_PROGRESS" => Ok(Decision::NoProgress),
        "SATURATED" => Ok(Decision::Saturated),
        other => Err(Error::storage(format!("unknown decision in signal log: {other}"))),
    }
}

fn tier_to_str(tier: ModelTier) -> &'static str {
    match tier {
        ModelTier::Small => "small",
        ModelTier::Medium => "medium",
        ModelTier::Large => "large",
    }
}

fn tier_from_str(s: &str) -> Result<ModelTier> {
    match s {
        "small" => Ok(ModelTier::Small),
        "medium" => Ok(ModelTier::Medium),
        "large" => Ok(ModelTier::Large),
        other => Err(Error::storage(format!("unknown model tier in signal log: {other}"))),
    }
}

#[async_trait]
impl SignalLog for SqliteSignalLog {
    async fn append(&self, entity_id: &str, signal: &Signal) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO signals (
                    signal_id, entity_id, pass_number, evidence_id, hypothesis_id,
                    decision, reasoning, confidence_delta_raw, category_multiplier,
                    applied_delta, pre_confidence, post_confidence,
                    category_saturated, confidence_saturated, model_used,
                    content_hash, created_at, evidence_url
                ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18)",
                rusqlite::params![
                    signal.signal_id,
                    entity_id,
                    signal.pass_number,
                    signal.evidence_id,
                    signal.hypothesis_id,
                    decision_to_str(signal.decision),
                    signal.reasoning,
                    signal.confidence_delta_raw,
                    signal.category_multiplier,
                    signal.applied_delta,
                    signal.pre_confidence,
                    signal.post_confidence,
                    signal.saturation_flags.category_saturated as i64,
                    signal.saturation_flags.confidence_saturated as i64,
                    tier_to_str(signal.model_used),
                    signal.content_hash,
                    signal.created_at.to_rfc3339(),
                    signal.evidence_url,
                ],
            )?;
            Ok(())
        })
    }

    async fn replay(&self, entity_id: &str, pass_number: u8) -> Result<Vec<Signal>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT signal_id, evidence_id, hypothesis_id, decision, reasoning,
                        confidence_delta_raw, category_multiplier, applied_delta,
                        pre_confidence, post_confidence, category_saturated,
                        confidence_saturated, model_used, content_hash, created_at,
                        evidence_url
                 FROM signals
                 WHERE entity_id = ?1 AND pass_number = ?2
                 ORDER BY rowid_order ASC",
            )?;
            let rows = stmt.query_map(rusqlite::params![entity_id, pass_number], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, f64>(5)?,
                    row.get::<_, f64>(6)?,
                    row.get::<_, f64>(7)?,
                    row.get::<_, f64>(8)?,
                    row.get::<_, f64>(9)?,
                    row.get::<_, i64>(10)?,
                    row.get::<_, i64>(11)?,
                    row.get::<_, String>(12)?,
                    row.get::<_, String>(13)?,
                    row.get::<_, String>(14)?,
                    row.get::<_, String>(15)?,
                ))
            })?;

            let mut signals = Vec::new();
            for row in rows {
                let (
                    signal_id, evidence_id, hypothesis_id, decision, reasoning,
                    confidence_delta_raw, category_multiplier, applied_delta,
                    pre_confidence, post_confidence, category_saturated,
                    confidence_saturated, model_used, content_hash, created_at,
                    evidence_url,
                ) = row?;
                signals.push(Signal {
                    signal_id,
                    evidence_id,
                    hypothesis_id,
                    decision: decision_from_str(&decision)
                        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?,
                    reasoning,
                    confidence_delta_raw,
                    category_multiplier,
                    applied_delta,
                    pre_confidence,
                    post_confidence,
                    saturation_flags: SaturationFlags {
                        category_saturated: category_saturated != 0,
                        confidence_saturated: confidence_saturated != 0,
                    },
                    model_used: tier_from_str(&model_used)
                        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?,
                    pass_number: pass_number as u8,
                    created_at: DateTime::parse_from_rfc3339(&created_at)
                        .map(|dt| dt.with_timezone(&Utc))
                        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?,
                    content_hash,
                    evidence_url,
                });
            }
            Ok(signals)
        })
    }
}
