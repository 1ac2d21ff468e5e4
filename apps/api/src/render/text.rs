//! Markdown seating chart.

use crate::models::assignment::{RoomAssignments, Side};
use crate::render::{RenderError, RenderedChart, SeatGrid, SeatingChartRenderer};

/// Separates room pages in the text chart.
pub const PAGE_BREAK: char = '\u{c}';

pub struct TextChartRenderer;

impl SeatingChartRenderer for TextChartRenderer {
    fn render(&self, rooms: &[RoomAssignments]) -> Result<RenderedChart, RenderError> {
        let pages = rooms
            .iter()
            .map(render_room_page)
            .collect::<Result<Vec<_>, _>>()?;

        let separator = format!("{PAGE_BREAK}\n");
        let mut document = pages.join(separator.as_str());
        if document.is_empty() {
            document.push_str("# Seating Chart\n\nNo assignments.\n");
        }

        Ok(RenderedChart {
            content_type: "text/markdown; charset=utf-8",
            body: document.into_bytes(),
        })
    }
}

/// Renders one room as a grid sized to the furthest occupied bench.
fn render_room_page(room: &RoomAssignments) -> Result<String, RenderError> {
    let grid = SeatGrid::build(room)?;

    let mut page = format!("# Room {}\n\n", room.room);
    if let Some(first) = room.assignments.first() {
        page.push_str(&format!("- **Exam:** {} ({})\n", first.toe, first.doe));
    }
    page.push_str(&format!("- **Seated:** {}\n\n", room.assignments.len()));

    if grid.rows == 0 {
        return Ok(page);
    }

    page.push_str("| |");
    for column in 1..=grid.columns {
        page.push_str(&format!(" Column {column} |"));
    }
    page.push_str("\n|---|");
    page.push_str(&"---|".repeat(grid.columns as usize));
    page.push('\n');

    let occupant = |row, column, side| grid.occupant(row, column, side).unwrap_or("—");
    for row in 1..=grid.rows {
        page.push_str(&format!("| Row {row} |"));
        for column in 1..=grid.columns {
            page.push_str(&format!(
                " {} \\| {} |",
                occupant(row, column, Side::Left),
                occupant(row, column, Side::Right)
            ));
        }
        page.push('\n');
    }
    Ok(page)
}
