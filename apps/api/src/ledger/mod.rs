// Append-only assignment ledger.
// Entries are written once per completed allocation run and never updated or removed.
// Backends: JSON-lines file (default) and PostgreSQL.

pub mod handlers;
pub mod jsonl;
pub mod postgres;
pub mod query;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::assignment::LedgerEntry;
use crate::models::exam::ExamTime;

pub use jsonl::JsonlLedger;
pub use postgres::PgLedger;
pub use query::{AssignmentQuery, QueryError};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("ledger operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("ledger database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("malformed ledger record at {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode ledger record: {0}")]
    Encode(#[source] serde_json::Error),
}

impl LedgerError {
    /// Parse failures are data problems; everything else is a storage failure.
    pub fn is_parse(&self) -> bool {
        matches!(self, LedgerError::Parse { .. })
    }
}

/// Durable, time-keyed log of allocation runs.
///
/// Appends must be serialized by the implementation; reads may run
/// concurrently with them and are allowed to miss an in-flight append.
#[async_trait]
pub trait AssignmentLedger: Send + Sync {
    /// Appends all entries of one run, in order, without interleaving other runs.
    ///
    /// Implementations bound their own wait for exclusive access and report
    /// [`LedgerError::Timeout`] only when nothing was written. Once writing has
    /// begun it completes or is undone even if the returned future is dropped,
    /// so callers must not wrap this in their own timeout.
    async fn append_all(&self, entries: &[LedgerEntry]) -> Result<(), LedgerError>;

    /// Every entry whose exam time equals `time`, in insertion order.
    async fn scan(&self, time: &ExamTime) -> Result<Vec<LedgerEntry>, LedgerError>;

    async fn append(&self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        self.append_all(std::slice::from_ref(entry)).await
    }
}

/// Runs a read-only ledger operation under `limit`; elapse is reported as
/// [`LedgerError::Timeout`].
pub async fn bounded<T, F>(limit: Duration, operation: F) -> Result<T, LedgerError>
where
    F: Future<Output = Result<T, LedgerError>>,
{
    tokio::time::timeout(limit, operation)
        .await
        .map_err(|_| LedgerError::Timeout(limit))?
}
