use std::collections::BTreeSet;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BlockSummary {
    pub name: String,
    pub rooms: Vec<String>,
    pub capacity: u64,
}

#[derive(Debug, Serialize)]
pub struct BranchSummary {
    pub name: String,
    pub years: Vec<u32>,
    pub students: usize,
}

#[derive(Debug, Serialize)]
pub struct CatalogSummary {
    pub blocks: Vec<BlockSummary>,
    pub branches: Vec<BranchSummary>,
}

/// GET /api/v1/catalog
pub async fn handle_catalog_summary(State(state): State<AppState>) -> Json<CatalogSummary> {
    let catalog = &state.catalog;
    let blocks = catalog
        .blocks
        .iter()
        .map(|b| BlockSummary {
            name: b.name.clone(),
            rooms: b.rooms.iter().map(|r| r.room_number.clone()).collect(),
            capacity: b.rooms.iter().map(|r| u64::from(r.capacity)).sum(),
        })
        .collect();
    let branches = catalog
        .branches
        .iter()
        .map(|b| BranchSummary {
            name: b.name.clone(),
            years: b
                .classes
                .iter()
                .map(|c| c.year)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            students: b.classes.iter().map(|c| c.student_ids.len()).sum(),
        })
        .collect();

    Json(CatalogSummary { blocks, branches })
}
