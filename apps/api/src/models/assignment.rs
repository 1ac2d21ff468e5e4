use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::exam::{ExamDuration, ExamTime};

/// Half of a bench. `Left` is always filled before `Right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One student's seat for one exam sitting. Rows and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatAssignment {
    pub student_id: String,
    pub row: u32,
    pub column: u32,
    pub side: Side,
    pub toe: ExamTime,
    pub doe: ExamDuration,
}

/// One room's worth of a completed allocation run — a single ledger line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub time: ExamTime,
    pub room: String,
    pub assignments: Vec<SeatAssignment>,
}

/// Query-side view of a ledger entry: the room and its seats, without the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomAssignments {
    pub room: String,
    pub assignments: Vec<SeatAssignment>,
}

impl From<LedgerEntry> for RoomAssignments {
    fn from(entry: LedgerEntry) -> Self {
        RoomAssignments {
            room: entry.room,
            assignments: entry.assignments,
        }
    }
}

/// Where a single student sits, as returned by a point query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentSeat {
    pub room_number: String,
    #[serde(flatten)]
    pub assignment: SeatAssignment,
}

impl StudentSeat {
    /// Human-readable seat description, e.g. `left - Row: 3`.
    pub fn details(&self) -> String {
        format!("{} - Row: {}", self.assignment.side, self.assignment.row)
    }
}
