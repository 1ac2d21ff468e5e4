use serde::{Deserialize, Serialize};

/// Every bench seats two students side by side.
pub const SEATS_PER_BENCH: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: u32,
    pub room_type: String,
    pub capacity: u32,
    pub room_number: String,
    pub rows: u32,
    pub columns: u32,
}

impl Room {
    pub fn bench_count(&self) -> u32 {
        self.rows.saturating_mul(self.columns)
    }

    /// Seats implied by the grid, or `None` when the product does not fit a `u32`.
    pub fn seat_count(&self) -> Option<u32> {
        self.rows
            .checked_mul(self.columns)
            .and_then(|benches| benches.checked_mul(SEATS_PER_BENCH))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub name: String,
    pub rooms: Vec<Room>,
}

/// A class (one section of one year) and its roll, in roll order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub class_name: String,
    pub year: u32,
    pub branch: String,
    pub student_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub classes: Vec<Class>,
}

/// Room and class catalog. Both lists are ordered; selection preserves that order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub blocks: Vec<Block>,
    pub branches: Vec<Branch>,
}

impl Catalog {
    pub fn block(&self, name: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.name == name)
    }

    pub fn branch(&self, name: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.name == name)
    }

    /// Name of the block that holds `room_number`, if the catalog knows the room.
    pub fn block_of_room(&self, room_number: &str) -> Option<&str> {
        self.blocks
            .iter()
            .find(|b| b.rooms.iter().any(|r| r.room_number == room_number))
            .map(|b| b.name.as_str())
    }
}
