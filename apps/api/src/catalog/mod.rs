//! Room and class catalog: loading, validation, and the synthetic default.

pub mod handlers;
pub mod synthetic;

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::info;

use crate::models::catalog::{Catalog, SEATS_PER_BENCH};

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("room {room}: rows and columns must be at least 1 (got {rows}x{columns})")]
    EmptyGrid { room: String, rows: u32, columns: u32 },

    #[error("room {room}: capacity {capacity} does not match {rows} rows x {columns} columns x {per_bench} seats")]
    CapacityMismatch {
        room: String,
        capacity: u32,
        rows: u32,
        columns: u32,
        per_bench: u32,
    },

    #[error("room number {0} appears more than once")]
    DuplicateRoom(String),

    #[error("class {class}: filed under branch {filed_under} but declares branch {declared}")]
    BranchMismatch {
        class: String,
        filed_under: String,
        declared: String,
    },
}

/// Checks the room layout invariant and basic catalog consistency.
pub fn validate_catalog(catalog: &Catalog) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for room in catalog.blocks.iter().flat_map(|b| b.rooms.iter()) {
        if room.rows == 0 || room.columns == 0 {
            return Err(CatalogError::EmptyGrid {
                room: room.room_number.clone(),
                rows: room.rows,
                columns: room.columns,
            });
        }
        if room.seat_count() != Some(room.capacity) {
            return Err(CatalogError::CapacityMismatch {
                room: room.room_number.clone(),
                capacity: room.capacity,
                rows: room.rows,
                columns: room.columns,
                per_bench: SEATS_PER_BENCH,
            });
        }
        if !seen.insert(room.room_number.as_str()) {
            return Err(CatalogError::DuplicateRoom(room.room_number.clone()));
        }
    }

    for branch in &catalog.branches {
        if let Some(class) = branch.classes.iter().find(|c| c.branch != branch.name) {
            return Err(CatalogError::BranchMismatch {
                class: class.class_name.clone(),
                filed_under: branch.name.clone(),
                declared: class.branch.clone(),
            });
        }
    }

    Ok(())
}

/// Reads and validates a JSON catalog file.
pub async fn load_catalog(path: &Path) -> Result<Catalog> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
    let catalog: Catalog = serde_json::from_str(&raw)
        .with_context(|| format!("Catalog file {} is not valid JSON", path.display()))?;
    validate_catalog(&catalog)
        .with_context(|| format!("Catalog file {} failed validation", path.display()))?;

    info!(
        "Loaded catalog from {}: {} blocks, {} branches",
        path.display(),
        catalog.blocks.len(),
        catalog.branches.len()
    );
    Ok(catalog)
}
