use serde::{Deserialize, Serialize};

use crate::allocation::AllocationError;
use crate::models::catalog::{Room, SEATS_PER_BENCH};

/// Switches controlling one allocation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub blocks: Vec<String>,
    /// Branch order is significant: it decides which cohort is seated first.
    #[serde(default)]
    pub branches: Vec<String>,
    #[serde(default)]
    pub years: Vec<u32>,
    /// Empty means every room type.
    #[serde(default)]
    pub room_types: Vec<String>,
    #[serde(rename = "number_of_branches")]
    pub branches_per_room: u32,
    #[serde(default)]
    pub row_wise: bool,
    #[serde(default)]
    pub single_child: bool,
    #[serde(default)]
    pub internal_shuffle: bool,
}

/// The supported (branches per room, single child) combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatingMode {
    /// One branch fills each room; `seats_per_bench` is 1 under single-child seating.
    SingleBranch { seats_per_bench: u32 },
    /// Left and right halves of every bench come from different branches.
    PairedBranches,
}

impl Policy {
    pub fn seating_mode(&self) -> Result<SeatingMode, AllocationError> {
        match (self.branches_per_room, self.single_child) {
            (1, false) => Ok(SeatingMode::SingleBranch {
                seats_per_bench: SEATS_PER_BENCH,
            }),
            (1, true) => Ok(SeatingMode::SingleBranch { seats_per_bench: 1 }),
            (2, false) => Ok(SeatingMode::PairedBranches),
            (2, true) => Err(AllocationError::SingleChildWithPairedBranches),
            (n, _) => Err(AllocationError::UnsupportedBranchesPerRoom(n)),
        }
    }

    pub fn bench_order(&self) -> BenchOrder {
        if self.row_wise {
            BenchOrder::RowMajor
        } else {
            BenchOrder::ColumnMajor
        }
    }
}

/// How bench indices map onto the room grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchOrder {
    RowMajor,
    ColumnMajor,
}

impl BenchOrder {
    /// 1-based `(row, column)` of bench `index` in `room`.
    pub fn position(&self, index: u32, room: &Room) -> (u32, u32) {
        match self {
            BenchOrder::RowMajor => (index / room.columns + 1, index % room.columns + 1),
            BenchOrder::ColumnMajor => (index % room.rows + 1, index / room.rows + 1),
        }
    }
}
