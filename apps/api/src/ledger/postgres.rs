//! PostgreSQL ledger backend.
//!
//! CRITICAL: append-only. Runs are INSERTed inside one transaction and rows
//! are never UPDATEd or DELETEd. Each row keeps the full ledger line as JSONB
//! so reads return exactly what was written.
//!
//! Appends are serialized across every process sharing the database by a
//! transaction-scoped advisory lock, so one run's BIGSERIAL ids are
//! contiguous and `ORDER BY id` returns runs unmixed.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;

use crate::ledger::{AssignmentLedger, LedgerError};
use crate::models::assignment::LedgerEntry;
use crate::models::exam::ExamTime;
use crate::models::ledger::LedgerEntryRow;

/// Advisory lock key held by every ledger append ("SEATLDGR" in ASCII).
pub const LEDGER_APPEND_LOCK_KEY: i64 = 0x5345_4154_4C44_4752;

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLSTATE `lock_not_available`, raised when `lock_timeout` expires.
const LOCK_NOT_AVAILABLE: &str = "55P03";

#[derive(Clone)]
pub struct PgLedger {
    pool: PgPool,
    lock_timeout: Duration,
}

impl PgLedger {
    pub fn new(pool: PgPool) -> Self {
        PgLedger {
            pool,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Bounds the wait for the append lock.
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }
}

/// Column values of one ledger row, ready to bind.
#[derive(Debug, Clone, PartialEq)]
struct LedgerRowValues {
    exam_time: DateTime<Utc>,
    room: String,
    record: Value,
}

fn encode_rows(entries: &[LedgerEntry]) -> Result<Vec<LedgerRowValues>, LedgerError> {
    entries
        .iter()
        .map(|entry| {
            Ok(LedgerRowValues {
                exam_time: entry.time.instant(),
                room: entry.room.clone(),
                record: serde_json::to_value(entry).map_err(LedgerError::Encode)?,
            })
        })
        .collect()
}

fn entry_from_row(row: LedgerEntryRow) -> Result<LedgerEntry, LedgerError> {
    serde_json::from_value(row.record).map_err(|source| LedgerError::Parse {
        location: format!("ledger_entries row {}", row.id),
        source,
    })
}

/// `SET` takes no bind parameters. A zero `lock_timeout` would mean "wait
/// forever", so the floor is one millisecond.
fn lock_timeout_statement(limit: Duration) -> String {
    format!("SET LOCAL lock_timeout = '{}ms'", limit.as_millis().max(1))
}

fn is_lock_timeout(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == LOCK_NOT_AVAILABLE)
}

async fn insert_run(
    pool: PgPool,
    lock_timeout: Duration,
    rows: Vec<LedgerRowValues>,
) -> Result<(), LedgerError> {
    let mut tx = pool.begin().await?;

    sqlx::query(&lock_timeout_statement(lock_timeout))
        .execute(&mut *tx)
        .await?;
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(LEDGER_APPEND_LOCK_KEY)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_lock_timeout(&e) {
                LedgerError::Timeout(lock_timeout)
            } else {
                e.into()
            }
        })?;

    for row in rows {
        sqlx::query("INSERT INTO ledger_entries (exam_time, room, record) VALUES ($1, $2, $3)")
            .bind(row.exam_time)
            .bind(row.room)
            .bind(row.record)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}

#[async_trait]
impl AssignmentLedger for PgLedger {
    async fn append_all(&self, entries: &[LedgerEntry]) -> Result<(), LedgerError> {
        if entries.is_empty() {
            return Ok(());
        }

        let rows = encode_rows(entries)?;
        // Detached so a dropped caller cannot abandon a COMMIT in flight.
        let insert = tokio::spawn(insert_run(self.pool.clone(), self.lock_timeout, rows));
        insert
            .await
            .map_err(|e| LedgerError::Io(std::io::Error::other(e)))??;

        info!("Inserted {} ledger entries", entries.len());
        Ok(())
    }

    async fn scan(&self, time: &ExamTime) -> Result<Vec<LedgerEntry>, LedgerError> {
        let rows = sqlx::query_as::<_, LedgerEntryRow>(
            "SELECT * FROM ledger_entries WHERE exam_time = $1 ORDER BY id ASC",
        )
        .bind(time.instant())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(entry_from_row).collect()
    }
}
