//! Printable PDF seating chart.
//!
//! One A4 portrait page per room, titled `Room: <number>`. Every occupied
//! bench is drawn as a 60×15 mm box with the left occupant's id in its left
//! half and the right occupant's id in its right half. Rooms too tall for one
//! page continue on further pages; grids wider than three benches shrink the
//! bench width to fit the page.
//!
//! Layout is computed in millimetres from the top-left corner of the page and
//! flipped into PDF coordinates only when drawing.

use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};

use crate::models::assignment::{RoomAssignments, Side};
use crate::render::{RenderError, RenderedChart, SeatGrid, SeatingChartRenderer};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 8.0;
const BOTTOM_MARGIN: f32 = 10.0;

const BENCH_WIDTH: f32 = 60.0;
const BENCH_HEIGHT: f32 = 15.0;
const BENCH_GAP: f32 = 5.0;
const ROW_PITCH: f32 = 20.0;
/// Offset of an occupant's id from the left edge of its half and from the bench top.
const LABEL_INSET_X: f32 = 5.0;
const LABEL_INSET_Y: f32 = 10.0;

const TITLE_SIZE: f32 = 16.0;
const TITLE_BASELINE: f32 = 17.0;
const LABEL_SIZE: f32 = 10.0;

/// Bench rows that fit between the title and the bottom margin.
const ROWS_PER_PAGE: u32 = ((PAGE_HEIGHT - BOTTOM_MARGIN - BENCH_HEIGHT) / ROW_PITCH) as u32;

/// Average Helvetica-Bold advance as a fraction of the font size; builtin
/// fonts carry no metrics, so centring uses this estimate.
const AVERAGE_GLYPH_WIDTH: f32 = 0.56;
const MM_PER_POINT: f32 = 25.4 / 72.0;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BenchBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Label {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PageLayout {
    pub title: Label,
    pub benches: Vec<BenchBox>,
    pub labels: Vec<Label>,
}

pub struct PdfChartRenderer;

impl SeatingChartRenderer for PdfChartRenderer {
    fn render(&self, rooms: &[RoomAssignments]) -> Result<RenderedChart, RenderError> {
        let mut pages = Vec::new();
        for room in rooms {
            pages.extend(layout_room(room)?);
        }
        if pages.is_empty() {
            pages.push(PageLayout {
                title: title_label("Seating Chart"),
                benches: Vec::new(),
                labels: vec![Label {
                    x: MARGIN,
                    y: TITLE_BASELINE + ROW_PITCH,
                    size: LABEL_SIZE,
                    text: "No assignments.".to_string(),
                }],
            });
        }

        Ok(RenderedChart {
            content_type: "application/pdf",
            body: write_document(&pages)?,
        })
    }
}

/// Lays out one room, splitting its rows across as many pages as needed.
pub(crate) fn layout_room(room: &RoomAssignments) -> Result<Vec<PageLayout>, RenderError> {
    let grid = SeatGrid::build(room)?;
    let width = bench_width(grid.columns);
    let page_count = grid.rows.max(1).div_ceil(ROWS_PER_PAGE);

    let mut pages: Vec<PageLayout> = (0..page_count)
        .map(|page| {
            let title = if page == 0 {
                format!("Room: {}", room.room)
            } else {
                format!("Room: {} (continued)", room.room)
            };
            PageLayout {
                title: title_label(&title),
                benches: Vec::new(),
                labels: Vec::new(),
            }
        })
        .collect();

    for row in 1..=grid.rows {
        let page = &mut pages[((row - 1) / ROWS_PER_PAGE) as usize];
        let y = ((row - 1) % ROWS_PER_PAGE + 1) as f32 * ROW_PITCH;

        for column in 1..=grid.columns {
            if !grid.bench_occupied(row, column) {
                continue;
            }
            let x = MARGIN + (width + BENCH_GAP) * (column - 1) as f32;
            page.benches.push(BenchBox { x, y, width });

            for (side, half) in [(Side::Left, 0.0), (Side::Right, width / 2.0)] {
                if let Some(student) = grid.occupant(row, column, side) {
                    page.labels.push(Label {
                        x: x + half + LABEL_INSET_X,
                        y: y + LABEL_INSET_Y,
                        size: LABEL_SIZE,
                        text: student.to_string(),
                    });
                }
            }
        }
    }
    Ok(pages)
}

fn bench_width(columns: u32) -> f32 {
    if columns == 0 {
        return BENCH_WIDTH;
    }
    let usable = PAGE_WIDTH - 2.0 * MARGIN - BENCH_GAP * (columns - 1) as f32;
    BENCH_WIDTH.min(usable / columns as f32)
}

fn title_label(text: &str) -> Label {
    let estimated = text.chars().count() as f32 * TITLE_SIZE * AVERAGE_GLYPH_WIDTH * MM_PER_POINT;
    Label {
        x: ((PAGE_WIDTH - estimated) / 2.0).max(MARGIN),
        y: TITLE_BASELINE,
        size: TITLE_SIZE,
        text: text.to_string(),
    }
}

fn write_document(pages: &[PageLayout]) -> Result<Vec<u8>, RenderError> {
    let document_error = |e: printpdf::Error| RenderError::Document(e.to_string());

    let (doc, first_page, first_layer) =
        PdfDocument::new("Seating Chart", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Benches");
    let font = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(document_error)?;

    for (index, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Benches")
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);
        draw_page(&layer, &font, page);
    }

    doc.save_to_bytes().map_err(document_error)
}

fn draw_page(layer: &PdfLayerReference, font: &IndirectFontRef, page: &PageLayout) {
    draw_label(layer, font, &page.title);

    for bench in &page.benches {
        let (left, right) = (bench.x, bench.x + bench.width);
        let (top, bottom) = (flip(bench.y), flip(bench.y + BENCH_HEIGHT));
        layer.add_line(Line {
            points: vec![
                (Point::new(Mm(left), Mm(top)), false),
                (Point::new(Mm(right), Mm(top)), false),
                (Point::new(Mm(right), Mm(bottom)), false),
                (Point::new(Mm(left), Mm(bottom)), false),
            ],
            is_closed: true,
        });
    }

    for label in &page.labels {
        draw_label(layer, font, label);
    }
}

fn draw_label(layer: &PdfLayerReference, font: &IndirectFontRef, label: &Label) {
    layer.use_text(label.text.as_str(), label.size, Mm(label.x), Mm(flip(label.y)), font);
}

/// Top-origin millimetres to PDF's bottom-origin.
fn flip(y: f32) -> f32 {
    PAGE_HEIGHT - y
}
