mod allocation;
mod catalog;
mod config;
mod db;
mod errors;
mod ledger;
mod models;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::{load_catalog, synthetic::synthetic_catalog};
use crate::config::{ChartFormat, Config, LedgerBackend};
use crate::db::create_ledger_pool;
use crate::ledger::{AssignmentLedger, JsonlLedger, PgLedger};
use crate::render::{PdfChartRenderer, SeatingChartRenderer, TextChartRenderer};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing or invalid env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Seatplan API v{}", env!("CARGO_PKG_VERSION"));

    // Load the room and class catalog
    let catalog = match &config.catalog_path {
        Some(path) => load_catalog(path).await?,
        None => {
            info!("No CATALOG_PATH set; using synthetic catalog (seed {})", config.catalog_seed);
            synthetic_catalog(config.catalog_seed)
        }
    };

    // Initialize the assignment ledger
    let ledger: Arc<dyn AssignmentLedger> = match config.ledger_backend {
        LedgerBackend::File => {
            info!("Ledger: JSON lines at {}", config.ledger_path.display());
            Arc::new(
                JsonlLedger::new(config.ledger_path.clone())
                    .with_open_timeout(config.ledger_timeout),
            )
        }
        LedgerBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for the postgres ledger"))?;
            Arc::new(
                PgLedger::new(create_ledger_pool(database_url, config.ledger_timeout).await?)
                    .with_lock_timeout(config.ledger_timeout),
            )
        }
    };
    info!("Ledger I/O timeout: {:?}", config.ledger_timeout);

    info!("Seating charts: {:?}", config.chart_format);
    let renderer: Arc<dyn SeatingChartRenderer> = match config.chart_format {
        ChartFormat::Pdf => Arc::new(PdfChartRenderer),
        ChartFormat::Markdown => Arc::new(TextChartRenderer),
    };

    // Build app state
    let state = AppState {
        catalog: Arc::new(catalog),
        ledger,
        renderer,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
