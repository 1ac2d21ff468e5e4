//! Seating chart rendering.
//!
//! The renderer sits behind a trait so the chart endpoint does not care what
//! document format comes out. Two are bundled: a printable PDF with one A4
//! page per room, and a markdown chart drawing each bench as a `left | right`
//! cell.

pub mod pdf;
pub mod text;

use std::collections::HashMap;

use thiserror::Error;

use crate::models::assignment::{RoomAssignments, Side};

pub use pdf::PdfChartRenderer;
pub use text::TextChartRenderer;

#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("room {room}: seat row {row}, column {column}, {side} is assigned twice")]
    DuplicateSeat {
        room: String,
        row: u32,
        column: u32,
        side: Side,
    },

    #[error("room {room}: student {student_id} has no valid bench position (row {row}, column {column})")]
    InvalidPosition {
        room: String,
        student_id: String,
        row: u32,
        column: u32,
    },

    #[error("chart document could not be written: {0}")]
    Document(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedChart {
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

pub trait SeatingChartRenderer: Send + Sync {
    fn render(&self, rooms: &[RoomAssignments]) -> Result<RenderedChart, RenderError>;
}

/// Occupied seats of one room, keyed by bench and side.
pub(crate) struct SeatGrid<'a> {
    seats: HashMap<(u32, u32, Side), &'a str>,
    /// Furthest occupied row and column; both 0 for an empty room.
    pub rows: u32,
    pub columns: u32,
}

impl<'a> SeatGrid<'a> {
    /// Rejects seats with a zero coordinate and seats assigned twice.
    pub fn build(room: &'a RoomAssignments) -> Result<Self, RenderError> {
        let mut grid = SeatGrid {
            seats: HashMap::new(),
            rows: 0,
            columns: 0,
        };

        for a in &room.assignments {
            if a.row == 0 || a.column == 0 {
                return Err(RenderError::InvalidPosition {
                    room: room.room.clone(),
                    student_id: a.student_id.clone(),
                    row: a.row,
                    column: a.column,
                });
            }
            if grid
                .seats
                .insert((a.row, a.column, a.side), a.student_id.as_str())
                .is_some()
            {
                return Err(RenderError::DuplicateSeat {
                    room: room.room.clone(),
                    row: a.row,
                    column: a.column,
                    side: a.side,
                });
            }
            grid.rows = grid.rows.max(a.row);
            grid.columns = grid.columns.max(a.column);
        }
        Ok(grid)
    }

    pub fn occupant(&self, row: u32, column: u32, side: Side) -> Option<&'a str> {
        self.seats.get(&(row, column, side)).copied()
    }

    pub fn bench_occupied(&self, row: u32, column: u32) -> bool {
        self.occupant(row, column, Side::Left).is_some()
            || self.occupant(row, column, Side::Right).is_some()
    }
}
