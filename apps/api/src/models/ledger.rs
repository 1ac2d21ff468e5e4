use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Row of the `ledger_entries` table. `record` holds the full ledger line as JSONB.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LedgerEntryRow {
    pub id: i64,
    pub exam_time: DateTime<Utc>,
    pub room: String,
    pub record: Value,
    pub created_at: DateTime<Utc>,
}
