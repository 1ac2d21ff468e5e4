//! Read path over the ledger.
//!
//! Both queries are full scans filtered by exam time. Fine for one
//! institution's exam calendar; a time→offset index would remove the linear
//! cost without changing these signatures.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::ledger::{bounded, AssignmentLedger, LedgerError};
use crate::models::assignment::{RoomAssignments, StudentSeat};
use crate::models::exam::ExamTime;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("no assignment found for student {student_id} at time {time}")]
    NotFound { student_id: String, time: String },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

#[derive(Clone)]
pub struct AssignmentQuery {
    ledger: Arc<dyn AssignmentLedger>,
    timeout: Duration,
}

impl AssignmentQuery {
    pub fn new(ledger: Arc<dyn AssignmentLedger>, timeout: Duration) -> Self {
        AssignmentQuery { ledger, timeout }
    }

    /// All seats for exam time `time`, one group per ledger entry, in ledger order.
    /// Empty when nothing was allocated for that time.
    pub async fn find_by_time(&self, time: &ExamTime) -> Result<Vec<RoomAssignments>, LedgerError> {
        let entries = bounded(self.timeout, self.ledger.scan(time)).await?;
        Ok(entries.into_iter().map(RoomAssignments::from).collect())
    }

    /// The seat of `student_id` at `time`. When repeated runs seated the
    /// student more than once, the earliest appended seat wins.
    pub async fn find_student(
        &self,
        student_id: &str,
        time: &ExamTime,
    ) -> Result<StudentSeat, QueryError> {
        let entries = bounded(self.timeout, self.ledger.scan(time)).await?;
        entries
            .into_iter()
            .find_map(|entry| {
                let room_number = entry.room;
                entry
                    .assignments
                    .into_iter()
                    .find(|a| a.student_id == student_id)
                    .map(|assignment| StudentSeat {
                        room_number,
                        assignment,
                    })
            })
            .ok_or_else(|| QueryError::NotFound {
                student_id: student_id.to_string(),
                time: time.to_rfc3339(),
            })
    }
}
