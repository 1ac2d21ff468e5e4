pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::allocation::handlers as allocation;
use crate::catalog::handlers as catalog;
use crate::ledger::handlers as ledger;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/catalog", get(catalog::handle_catalog_summary))
        .route(
            "/api/v1/exams/assignments",
            post(allocation::handle_allocate).get(ledger::handle_assignments_by_time),
        )
        .route(
            "/api/v1/exams/students/:student_id",
            get(ledger::handle_student_assignment),
        )
        .route("/api/v1/exams/chart", get(ledger::handle_seating_chart))
        .with_state(state)
}
