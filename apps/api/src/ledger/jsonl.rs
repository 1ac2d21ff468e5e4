//! JSON-lines ledger file: one ledger entry per line, appended in run order.
//!
//! A run is written by a detached task that owns the write lock, so dropping
//! the caller cannot stop a write halfway. Only taking the lock and opening
//! the file are bounded by the timeout; a failed write truncates the file back
//! to its length before the run.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::ledger::{AssignmentLedger, LedgerError};
use crate::models::assignment::LedgerEntry;
use crate::models::exam::ExamTime;

const DEFAULT_OPEN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct JsonlLedger {
    path: PathBuf,
    /// Single-writer guard; readers never take it.
    write_lock: Arc<Mutex<()>>,
    open_timeout: Duration,
}

impl JsonlLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonlLedger {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
            open_timeout: DEFAULT_OPEN_TIMEOUT,
        }
    }

    /// Bounds the wait for the write lock plus opening the file.
    pub fn with_open_timeout(mut self, open_timeout: Duration) -> Self {
        self.open_timeout = open_timeout;
        self
    }
}

fn encode_lines(entries: &[LedgerEntry]) -> Result<Vec<u8>, LedgerError> {
    let mut buffer = Vec::new();
    for entry in entries {
        serde_json::to_writer(&mut buffer, entry).map_err(LedgerError::Encode)?;
        buffer.push(b'\n');
    }
    Ok(buffer)
}

fn task_failed(e: JoinError) -> LedgerError {
    LedgerError::Io(std::io::Error::other(e))
}

/// Takes the lock and opens the file within `open_timeout`, then writes
/// `buffer` to completion on the blocking pool. A timeout means nothing was
/// written.
async fn append_locked(
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
    open_timeout: Duration,
    buffer: Vec<u8>,
) -> Result<(), LedgerError> {
    let (guard, file) = tokio::time::timeout(open_timeout, async {
        let guard = write_lock.lock_owned().await;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        Ok::<_, std::io::Error>((guard, file))
    })
    .await
    .map_err(|_| LedgerError::Timeout(open_timeout))??;

    let mut file = file.into_std().await;
    tokio::task::spawn_blocking(move || {
        let _guard = guard;
        write_or_roll_back(&mut file, &buffer, &path)
    })
    .await
    .map_err(task_failed)??;
    Ok(())
}

/// Appends `buffer` and syncs it. On failure the file is cut back to the
/// length it had before, so a run lands whole or not at all.
fn write_or_roll_back(file: &mut std::fs::File, buffer: &[u8], path: &Path) -> std::io::Result<()> {
    let start = file.metadata()?.len();
    let written = file.write_all(buffer).and_then(|()| file.sync_data());
    if let Err(e) = written {
        if let Err(rollback) = file.set_len(start).and_then(|()| file.sync_data()) {
            warn!(
                "Could not truncate {} back to {start} bytes after a failed append: {rollback}",
                path.display()
            );
        }
        return Err(e);
    }
    Ok(())
}

#[async_trait]
impl AssignmentLedger for JsonlLedger {
    async fn append_all(&self, entries: &[LedgerEntry]) -> Result<(), LedgerError> {
        if entries.is_empty() {
            return Ok(());
        }

        let buffer = encode_lines(entries)?;
        let write = tokio::spawn(append_locked(
            self.path.clone(),
            Arc::clone(&self.write_lock),
            self.open_timeout,
            buffer,
        ));
        write.await.map_err(task_failed)??;

        info!(
            "Appended {} ledger entries to {}",
            entries.len(),
            self.path.display()
        );
        Ok(())
    }

    async fn scan(&self, time: &ExamTime) -> Result<Vec<LedgerEntry>, LedgerError> {
        let file = match File::open(&self.path).await {
            Ok(file) => file,
            // Nothing has been appended yet.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = BufReader::new(file);
        let mut line = String::new();
        let mut matches = Vec::new();
        let mut line_number = 0usize;
        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                break;
            }
            line_number += 1;
            if !line.ends_with('\n') {
                // Tail of an append still in flight.
                debug!("Skipping unterminated line {line_number} of {}", self.path.display());
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            let entry: LedgerEntry =
                serde_json::from_str(&line).map_err(|source| LedgerError::Parse {
                    location: format!("{} line {line_number}", self.path.display()),
                    source,
                })?;
            if entry.time == *time {
                matches.push(entry);
            }
        }
        Ok(matches)
    }
}
