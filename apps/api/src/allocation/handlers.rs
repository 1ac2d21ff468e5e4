//! Axum route handlers for the Allocation API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::allocation::{run_allocation, AllocationTotals, Policy};
use crate::errors::AppError;
use crate::models::assignment::LedgerEntry;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AllocateRequest {
    #[serde(flatten)]
    pub policy: Policy,
    pub toe: String,
    pub doe: String,
    /// Makes `internal_shuffle` reproducible; a fresh entropy seed is used when absent.
    #[serde(default)]
    pub shuffle_seed: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct AllocateResponse {
    pub message: String,
    pub assignments: Vec<LedgerEntry>,
    pub totals: AllocationTotals,
}

/// POST /api/v1/exams/assignments
///
/// Seats the selected cohort, appends the run to the ledger, and returns it.
/// Nothing is appended unless the whole run succeeded.
pub async fn handle_allocate(
    State(state): State<AppState>,
    payload: Result<Json<AllocateRequest>, JsonRejection>,
) -> Result<Json<AllocateResponse>, AppError> {
    let Json(request) = payload?;
    let mut rng = match request.shuffle_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let plan = run_allocation(
        &state.catalog,
        &request.policy,
        &request.toe,
        &request.doe,
        &mut rng,
    )?;

    // Not wrapped in a timeout: the ledger bounds its own wait for exclusive
    // access, and once writing starts the run lands whole or not at all.
    state.ledger.append_all(&plan.entries).await?;

    Ok(Json(AllocateResponse {
        message: "Exam Room Assignments".to_string(),
        assignments: plan.entries,
        totals: plan.totals,
    }))
}
