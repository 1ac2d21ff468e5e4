use std::sync::Arc;

use crate::config::Config;
use crate::ledger::{AssignmentLedger, AssignmentQuery};
use crate::models::catalog::Catalog;
use crate::render::SeatingChartRenderer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Read-only for the life of the process; runs work on copies.
    pub catalog: Arc<Catalog>,
    /// The one shared mutable resource. Backends serialize their own appends.
    pub ledger: Arc<dyn AssignmentLedger>,
    pub renderer: Arc<dyn SeatingChartRenderer>,
    pub config: Config,
}

impl AppState {
    pub fn query(&self) -> AssignmentQuery {
        AssignmentQuery::new(Arc::clone(&self.ledger), self.config.ledger_timeout)
    }
}
